use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Divvy API",
        version = "0.1.0",
        description = "Record shared expenses and split them between users."
    ),
    paths(
        crate::routes::create_expense,
        crate::routes::list_expenses,
        crate::routes::get_expense,
        crate::routes::register,
        crate::routes::login,
        crate::routes::profile,
        crate::routes::rename,
        crate::routes::root,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::CreateExpenseRequest,
        crate::dto::SplitRequest,
        crate::dto::ExpenseResponse,
        crate::dto::SplitResponse,
        crate::dto::RegisterRequest,
        crate::dto::LoginRequest,
        crate::dto::AuthResponse,
        crate::dto::ProfileResponse,
        crate::dto::RenameRequest,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "expenses", description = "Shared expenses"),
        (name = "auth", description = "Registration, login and profile"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds Bearer token security scheme to the OpenAPI document.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Token returned by /api/auth/register or /api/auth/login.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

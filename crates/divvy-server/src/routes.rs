use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use divvy_core::{AppError, ProposedExpense, User};

use crate::auth::require_user;
use crate::dto::{
    AuthResponse, CreateExpenseRequest, ExpenseResponse, HealthResponse, LoginRequest,
    ProfileResponse, RegisterRequest, RenameRequest,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/expenses", post(create_expense).get(list_expenses))
        .route("/api/expenses/{id}", get(get_expense))
        .route("/api/auth/me", get(profile).patch(rename))
        .layer(middleware::from_fn_with_state(state.clone(), require_user));

    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public.merge(api).with_state(state)
}

/// Unwrap a JSON body, reporting malformed input with our own error shape.
///
/// Parser output is logged, never echoed to the client.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        let message = match rejection {
            JsonRejection::JsonDataError(_) => "Please provide all required fields",
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
            JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
            _ => "Invalid request body",
        };
        ApiError(AppError::InvalidInput(message.to_string()))
    })
}

// ---------------------------------------------------------------------------
// Expenses
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/expenses",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense created", body = ExpenseResponse),
        (status = 400, description = "Missing fields, no valid splits or shares not matching the amount", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "expenses"
)]
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    payload: Result<Json<CreateExpenseRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(payload)?;
    let view = state
        .expenses
        .create(&user, ProposedExpense::from(body))
        .await?;

    Ok((StatusCode::CREATED, Json(ExpenseResponse::from(view))))
}

#[utoipa::path(
    get,
    path = "/api/expenses",
    responses(
        (status = 200, description = "Expenses paid by or split with the caller", body = Vec<ExpenseResponse>),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "expenses"
)]
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let views = state.expenses.list_for(&user).await?;
    let response: Vec<ExpenseResponse> = views.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/expenses/{id}",
    params(("id" = Uuid, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense details", body = ExpenseResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 404, description = "Expense not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "expenses"
)]
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // An id that cannot exist is reported like one that does not.
    let id = Uuid::parse_str(&id).map_err(|_| AppError::expense_not_found())?;
    let view = state.expenses.get(&user, id).await?;
    Ok(Json(ExpenseResponse::from(view)))
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Invalid name or password", body = crate::dto::ErrorResponse),
        (status = 409, description = "Name already taken", body = crate::dto::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(payload)?;
    let session = state.accounts.register(&body.name, &body.password).await?;

    let response = AuthResponse {
        id: session.user.id,
        name: session.user.name,
        token: session.token,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::dto::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(payload)?;
    let session = state.accounts.login(&body.name, &body.password).await?;

    Ok(Json(AuthResponse {
        id: session.user.id,
        name: session.user.name,
        token: session.token,
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The authenticated user", body = ProfileResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn profile(Extension(user): Extension<User>) -> impl IntoResponse {
    Json(ProfileResponse::from(user))
}

#[utoipa::path(
    patch,
    path = "/api/auth/me",
    request_body = RenameRequest,
    responses(
        (status = 200, description = "User renamed", body = ProfileResponse),
        (status = 400, description = "Invalid name", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 409, description = "Name already taken", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn rename(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    payload: Result<Json<RenameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(payload)?;
    let renamed = state.accounts.rename(&user, &body.name).await?;
    Ok(Json(ProfileResponse::from(renamed)))
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Liveness banner", body = String)),
    tag = "system"
)]
pub async fn root() -> &'static str {
    "Expense Splitter API is running"
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let healthy = match state.store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Storage health check failed");
            false
        }
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        storage: state.storage,
    };

    (status, Json(response))
}

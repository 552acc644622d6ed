use std::sync::Arc;

use axum::extract::State;
use axum::http::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

/// Middleware that resolves `Authorization: Bearer <token>` to a user and
/// stores it in the request extensions for `Extension<User>` extractors.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let verified = state.verifier.verify_header(header).await;

    match verified {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => {
            tracing::debug!(error = %err, "Rejected unauthenticated request");
            ApiError(err).into_response()
        }
    }
}

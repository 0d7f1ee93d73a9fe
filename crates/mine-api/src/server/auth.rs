use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use super::error::AppError;
use super::SharedState;

/// Axum middleware rejecting requests whose `Authorization` header is not
/// exactly `Bearer <api token>`.
pub(super) async fn require_bearer(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if token != Some(state.api_token.as_str()) {
        tracing::warn!(uri = %request.uri(), "rejected request without a valid bearer token");
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}

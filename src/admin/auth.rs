use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::http::server::AppState;

/// Rejects requests whose bearer token does not match `admin.api_key`.
///
/// The key is read from the live config on every request, so a reload
/// rotates it without a restart.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let api_key = state.config.load().admin.api_key.clone();
    if api_key.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == api_key);

    if !authorized {
        tracing::warn!(path = %request.uri().path(), "Admin request rejected");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

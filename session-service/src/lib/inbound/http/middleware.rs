use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::inbound::http::router::AppState;

pub const INTERNAL_API_KEY_HEADER: &str = "x-internal-api-key";

/// Raw bearer token taken from the Authorization header. Not validated.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Middleware that requires an `Authorization: Bearer <token>` header and stores the token in
/// request extensions. Validation is left to the handler, since logout accepts expired tokens.
pub async fn require_bearer(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let token = extract_token_from_header(req.headers())?.to_string();
    req.extensions_mut().insert(BearerToken(token));

    Ok(next.run(req).await)
}

/// Middleware that admits only callers whose access token carries the elevated flag.
pub async fn require_elevated(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(req.headers())?;

    let principal = state
        .auth_service
        .check_elevated(token)
        .await
        .map_err(ApiError::from)?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Middleware guarding service-to-service routes with the shared internal API key.
pub async fn require_internal_caller(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = req
        .headers()
        .get(INTERNAL_API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if presented != Some(state.internal_api_key.as_ref()) {
        tracing::warn!(uri = %req.uri(), "Rejected call without a valid internal API key");
        return Err(ApiError::Unauthorized("Invalid internal API key".to_string()));
    }

    Ok(next.run(req).await)
}

fn extract_token_from_header(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )
    })
}

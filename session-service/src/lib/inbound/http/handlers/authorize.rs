use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use super::TokenPairData;
use crate::domain::identity::models::IdentityId;
use crate::domain::token::models::Principal;
use crate::inbound::http::router::AppState;

/// Issue a token pair for an identity another service has already authenticated.
pub async fn authorize(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<AuthorizeRequest>,
) -> Result<ApiSuccess<TokenPairData>, ApiError> {
    let identity_id = IdentityId::from_string(&body.identity_id)
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    state
        .auth_service
        .authorize(Principal::new(identity_id, body.elevated))
        .await
        .map_err(ApiError::from)
        .map(|pair| ApiSuccess::new(StatusCode::OK, pair.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorizeRequest {
    identity_id: String,
    elevated: bool,
}

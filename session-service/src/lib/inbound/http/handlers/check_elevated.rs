use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::PrincipalData;
use crate::inbound::http::middleware::BearerToken;
use crate::inbound::http::router::AppState;

pub async fn check_elevated(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<ApiSuccess<PrincipalData>, ApiError> {
    state
        .auth_service
        .check_elevated(&token)
        .await
        .map_err(ApiError::from)
        .map(|ref principal| ApiSuccess::new(StatusCode::OK, principal.into()))
}

use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::errors::AuthError;
use crate::domain::identity::models::Login;
use crate::domain::token::models::Principal;
use crate::inbound::http::router::AppState;

pub async fn elevate_identity(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(login): Path<String>,
) -> Result<ApiSuccess<ElevateIdentityResponseData>, ApiError> {
    let login = Login::new(login).map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    let identity_id = state
        .auth_service
        .promote_to_elevated(&login)
        .await
        .map_err(|e| match e {
            AuthError::LoginNotFound(_) => ApiError::NotFound(e.to_string()),
            _ => ApiError::from(e),
        })?;

    tracing::info!(
        promoted_by = %caller.identity_id,
        identity_id = %identity_id,
        "Elevated flag granted"
    );

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ElevateIdentityResponseData {
            identity_id: identity_id.to_string(),
            login: login.to_string(),
            elevated: true,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElevateIdentityResponseData {
    pub identity_id: String,
    pub login: String,
    pub elevated: bool,
}

use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use super::PrincipalData;
use crate::domain::errors::LoginError;
use crate::domain::errors::PasswordPolicyError;
use crate::domain::identity::models::Login;
use crate::domain::identity::models::Password;
use crate::domain::identity::models::RegisterCommand;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<ApiSuccess<PrincipalData>, ApiError> {
    state
        .auth_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref principal| ApiSuccess::new(StatusCode::CREATED, principal.into()))
}

/// HTTP request body for registering an identity (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    login: String,
    password: String,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid login: {0}")]
    Login(#[from] LoginError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordPolicyError),
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ParseRegisterRequestError> {
        let login = Login::new(self.login)?;
        let password = Password::new(self.password)?;
        Ok(RegisterCommand::new(login, password))
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(login: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            login: login.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_request_converts() {
        let command = request("alice", "s3cr3t!!").try_into_command().unwrap();
        assert_eq!(command.login.as_str(), "alice");
    }

    #[test]
    fn test_invalid_fields_are_rejected() {
        assert!(matches!(
            request("a b", "s3cr3t!!").try_into_command(),
            Err(ParseRegisterRequestError::Login(LoginError::InvalidCharacters))
        ));
        assert!(matches!(
            request("alice", "short").try_into_command(),
            Err(ParseRegisterRequestError::Password(_))
        ));
    }
}

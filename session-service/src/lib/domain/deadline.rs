use std::future::Future;
use std::time::Duration;

use crate::domain::errors::AuthError;

/// Run a store call under a hard deadline.
///
/// A stalled persistence layer fails the request with `Timeout` instead of hanging it.
/// The call is not retried.
pub async fn bounded<T, F>(limit: Duration, operation: &'static str, future: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, AuthError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Store operation timed out"
            );
            Err(AuthError::Timeout(operation.to_string()))
        }
    }
}

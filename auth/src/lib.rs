//! Authentication primitives shared by the session service and its consumers.
//!
//! Provides:
//! - Slow salted hashing for passwords and refresh secrets (Argon2id)
//! - Access-token claims and HS512 signing/verification
//! - High-entropy refresh secret generation
//!
//! Services that only need to *read* access tokens depend on [`AccessClaims`] and
//! [`JwtHandler`]; they never see password hashes or refresh secrets.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::{AccessClaims, JwtHandler};
//! use chrono::Duration;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = AccessClaims::new("5f0c3a9e-8d2b-4a51-9a8e-3f3cfbd0e6b1", false, Duration::minutes(15));
//! let token = handler.encode(&claims).unwrap();
//! let decoded: AccessClaims = handler.decode(&token).unwrap();
//! assert_eq!(decoded.sub, claims.sub);
//! ```
//!
//! ## Refresh Secrets
//! ```
//! use auth::SecretGenerator;
//!
//! let secret = SecretGenerator::new().generate();
//! assert_eq!(secret.len(), 44);
//! ```

pub mod jwt;
pub mod password;
pub mod secret;

// Re-export commonly used items
pub use jwt::AccessClaims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use secret::SecretGenerator;

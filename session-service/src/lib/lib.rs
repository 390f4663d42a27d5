pub mod app;
pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

// Re-export commonly used types
pub use domain::errors::AuthError;
pub use domain::rotation::ports::AuthServicePort;
pub use outbound::repositories;

pub mod crypto;
pub mod deadline;
pub mod errors;
pub mod identity;
pub mod refresh;
pub mod rotation;
pub mod session;
pub mod token;

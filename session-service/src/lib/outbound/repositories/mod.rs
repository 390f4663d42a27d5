pub mod identity;
pub mod memory;
pub mod refresh;
pub mod session;

pub use identity::PostgresIdentityRepository;
pub use memory::InMemoryIdentityRepository;
pub use memory::InMemoryRefreshRepository;
pub use memory::InMemorySessionRepository;
pub use refresh::PostgresRefreshRepository;
pub use session::PostgresSessionRepository;

// Library crate for the todo server
// This file exposes the public API for integration tests

pub mod config;
pub mod routes;
pub mod session;
pub mod shared;
pub mod todo;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use routes::build_router;
pub use session::{AuthenticatedUser, Claims, TokenPair};
pub use shared::{AppError, AppState};

// Public API - what other modules can use
pub use handlers::{fetch_access_token, signout};
pub use middleware::{require_access_token, ACCESS_TOKEN_HEADER};
pub use types::{AuthenticatedUser, Claims, TokenPair};

// Internal modules
pub mod cookies;
mod handlers;
mod middleware;
pub mod models;
pub mod repository;
pub mod service;
pub mod token;
pub mod types;

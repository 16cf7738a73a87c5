// Public API - what other modules can use
pub use handlers::{get_current_user, signin, signup};
pub use models::{UserModel, UserResponse};
pub use password::PasswordHasher;

// Internal modules
mod handlers;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod types;
pub mod validation;

use axum::{
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::session::cookies;
use crate::session::repository::ClaimRepository;
use crate::session::service::SessionService;
use crate::session::token::TokenConfig;
use crate::todo::repository::TodoRepository;
use crate::todo::service::TodoService;
use crate::user::password::PasswordHasher;
use crate::user::repository::UserRepository;
use crate::user::service::UserService;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub todo_repository: Arc<dyn TodoRepository + Send + Sync>,
    pub claim_repository: Arc<dyn ClaimRepository + Send + Sync>,
    pub token_config: TokenConfig,
    pub password_hasher: PasswordHasher,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        todo_repository: Arc<dyn TodoRepository + Send + Sync>,
        claim_repository: Arc<dyn ClaimRepository + Send + Sync>,
        token_config: TokenConfig,
        password_hasher: PasswordHasher,
        cookie_secure: bool,
    ) -> Self {
        Self {
            user_repository,
            todo_repository,
            claim_repository,
            token_config,
            password_hasher,
            cookie_secure,
        }
    }

    pub fn session_service(&self) -> SessionService {
        SessionService::new(
            Arc::clone(&self.claim_repository),
            self.token_config.clone(),
        )
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(
            Arc::clone(&self.user_repository),
            self.password_hasher.clone(),
        )
    }

    pub fn todo_service(&self) -> TodoService {
        TodoService::new(
            Arc::clone(&self.todo_repository),
            Arc::clone(&self.user_repository),
        )
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rejected credential; the response also clears both auth cookies.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::JwtError(_) | AppError::DatabaseError(_) | AppError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::JwtError(msg) | AppError::DatabaseError(msg) => {
                tracing::error!(error = %msg, "Request failed with a server error");
                "Something went wrong, please try again later".to_string()
            }
            AppError::Internal => "Internal server error".to_string(),
        };

        let body = Json(json!({
            "status": "error",
            "message": message,
            "data": null
        }));

        if matches!(self, AppError::Forbidden(_)) {
            return (status, AppendHeaders(cookies::cleared_cookies()), body).into_response();
        }

        (status, body).into_response()
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::session::repository::InMemoryClaimRepository;
    use crate::todo::repository::InMemoryTodoRepository;
    use crate::user::repository::InMemoryUserRepository;

    pub const TEST_SECRET: &str = "test-secret";

    /// Builder for creating AppState with overrides for testing.
    /// Every repository defaults to a fresh in-memory implementation.
    pub struct AppStateBuilder {
        user_repository: Option<Arc<dyn UserRepository + Send + Sync>>,
        todo_repository: Option<Arc<dyn TodoRepository + Send + Sync>>,
        claim_repository: Option<Arc<dyn ClaimRepository + Send + Sync>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                user_repository: None,
                todo_repository: None,
                claim_repository: None,
            }
        }

        pub fn with_user_repository(
            mut self,
            repo: Arc<dyn UserRepository + Send + Sync>,
        ) -> Self {
            self.user_repository = Some(repo);
            self
        }

        pub fn with_todo_repository(
            mut self,
            repo: Arc<dyn TodoRepository + Send + Sync>,
        ) -> Self {
            self.todo_repository = Some(repo);
            self
        }

        pub fn with_claim_repository(
            mut self,
            repo: Arc<dyn ClaimRepository + Send + Sync>,
        ) -> Self {
            self.claim_repository = Some(repo);
            self
        }

        pub fn build(self) -> AppState {
            AppState {
                user_repository: self
                    .user_repository
                    .unwrap_or_else(|| Arc::new(InMemoryUserRepository::new())),
                todo_repository: self
                    .todo_repository
                    .unwrap_or_else(|| Arc::new(InMemoryTodoRepository::new())),
                claim_repository: self
                    .claim_repository
                    .unwrap_or_else(|| Arc::new(InMemoryClaimRepository::new())),
                token_config: TokenConfig::new(TEST_SECRET),
                // Minimum bcrypt cost keeps hashing fast in tests
                password_hasher: PasswordHasher::new(4, 4),
                cookie_secure: false,
            }
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}

use axum::Router;
use std::sync::Arc;

use todo_server::{
    build_router,
    session::{repository::InMemoryClaimRepository, token::TokenConfig},
    todo::repository::InMemoryTodoRepository,
    user::{repository::InMemoryUserRepository, PasswordHasher},
    AppState,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_SECRET: &str = "integration-test-secret";

/// Full router wired to in-memory repositories the test can inspect
pub struct TestSetup {
    pub app: Router,
    pub users: Arc<InMemoryUserRepository>,
    pub todos: Arc<InMemoryTodoRepository>,
    pub claims: Arc<InMemoryClaimRepository>,
    pub token_config: TokenConfig,
}

pub struct TestSetupBuilder {
    secret: String,
    cookie_secure: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            secret: TEST_SECRET.to_string(),
            cookie_secure: false,
        }
    }

    pub fn with_secure_cookies(mut self) -> Self {
        self.cookie_secure = true;
        self
    }

    pub fn build(self) -> TestSetup {
        let users = Arc::new(InMemoryUserRepository::new());
        let todos = Arc::new(InMemoryTodoRepository::new());
        let claims = Arc::new(InMemoryClaimRepository::new());
        let token_config = TokenConfig::new(self.secret);

        let state = AppState::new(
            users.clone(),
            todos.clone(),
            claims.clone(),
            token_config.clone(),
            // Lowest bcrypt cost keeps the suite fast
            PasswordHasher::new(4, 4),
            self.cookie_secure,
        );

        TestSetup {
            app: build_router(state),
            users,
            todos,
            claims,
            token_config,
        }
    }
}

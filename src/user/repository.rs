use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::UserModel;
use crate::shared::AppError;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<UserModel>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError>;

    /// Finds a user whose email or username equals `identity`. An email
    /// match always wins over another account's username.
    async fn find_by_identity(&self, identity: &str) -> Result<Option<UserModel>, AppError> {
        match self.find_by_email(identity).await? {
            Some(user) => Ok(Some(user)),
            None => self.find_by_username(identity).await,
        }
    }
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Uuid, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the current number of users in the repository
    pub fn user_count(&self) -> usize {
        self.users.lock().map(|users| users.len()).unwrap_or(0)
    }

    fn find_first<F>(&self, predicate: F) -> Result<Option<UserModel>, AppError>
    where
        F: Fn(&UserModel) -> bool,
    {
        let users = self.users.lock().map_err(|_| AppError::Internal)?;
        Ok(users.values().find(|user| predicate(user)).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        let mut users = self.users.lock().map_err(|_| AppError::Internal)?;

        // Mirror the unique constraints of the users table
        if users
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            warn!("User with same email or username already exists in memory");
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        users.insert(user.id, user.clone());

        debug!("User created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: Uuid) -> Result<Option<UserModel>, AppError> {
        let users = self.users.lock().map_err(|_| AppError::Internal)?;
        Ok(users.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        self.find_first(|user| user.email == email)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        self.find_first(|user| user.username == username)
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        value: &str,
    ) -> Result<Option<UserModel>, AppError> {
        let sql = format!(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE {} LIMIT 1",
            clause
        );
        sqlx::query_as::<_, UserModel>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to fetch user from database");
                AppError::DatabaseError(e.to_string())
            })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let unique_violation = e
                .as_database_error()
                .map(|db| db.is_unique_violation())
                .unwrap_or(false);
            if unique_violation {
                warn!("User insert hit a unique constraint");
                return AppError::Conflict("User already exists".to_string());
            }
            warn!(error = %e, "Failed to create user in database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!("User created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: Uuid) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user from database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        self.fetch_one_where("email = $1", email).await
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        self.fetch_one_where("username = $1", username).await
    }
}

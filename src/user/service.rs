use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{
    models::UserModel,
    password::PasswordHasher,
    repository::UserRepository,
    types::{RegisterErrors, SigninRequest, SignupRequest},
    validation::validate_register,
};
use crate::shared::AppError;

pub const EMAIL_TAKEN_MESSAGE: &str = "Email is already registered";
pub const USERNAME_TAKEN_MESSAGE: &str = "Username is already registered";

/// Result of a registration attempt
#[derive(Debug)]
pub enum RegisterOutcome {
    Registered(UserModel),
    Rejected(RegisterErrors),
}

/// Service for registering and authenticating users
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>, hasher: PasswordHasher) -> Self {
        Self { repository, hasher }
    }

    /// Validates and stores a new user. Field errors and uniqueness clashes
    /// are collected into a single rejection.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: SignupRequest) -> Result<RegisterOutcome, AppError> {
        let mut errors = validate_register(&request);
        let username = request.username.trim().to_string();

        if !request.email.is_empty()
            && self.repository.find_by_email(&request.email).await?.is_some()
        {
            errors.set_email(EMAIL_TAKEN_MESSAGE);
        }
        if !username.is_empty() && self.repository.find_by_username(&username).await?.is_some() {
            errors.set_username(USERNAME_TAKEN_MESSAGE);
        }

        if errors.error {
            debug!(?errors, "Registration rejected");
            return Ok(RegisterOutcome::Rejected(errors));
        }

        let password_hash = self.hasher.hash(&request.password).await?;
        let user = UserModel::new(username, request.email, password_hash);

        // A concurrent signup that wins the unique constraint surfaces as Conflict
        self.repository.create_user(&user).await?;

        info!(user_id = %user.id, "User registered");
        Ok(RegisterOutcome::Registered(user))
    }

    /// Looks the identity up as email or username and checks the password.
    /// Unknown identities and wrong passwords are indistinguishable to callers.
    #[instrument(skip(self, request), fields(identity = %request.identity))]
    pub async fn authenticate(&self, request: &SigninRequest) -> Result<Option<UserModel>, AppError> {
        if request.identity.is_empty() || request.password.is_empty() {
            return Ok(None);
        }

        let Some(user) = self.repository.find_by_identity(&request.identity).await? else {
            debug!("No user for identity");
            return Ok(None);
        };

        if self
            .hasher
            .verify(&request.password, &user.password_hash)
            .await?
        {
            info!(user_id = %user.id, "User authenticated");
            Ok(Some(user))
        } else {
            debug!(user_id = %user.id, "Password mismatch");
            Ok(None)
        }
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserModel>, AppError> {
        self.repository.get_user(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::repository::InMemoryUserRepository;
    use crate::user::validation::WEAK_PASSWORD_MESSAGE;

    fn service() -> (UserService, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let service = UserService::new(repo.clone(), PasswordHasher::new(4, 4));
        (service, repo)
    }

    fn signup(username: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn signin(identity: &str, password: &str) -> SigninRequest {
        SigninRequest {
            identity: identity.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hashed_password() {
        let (service, repo) = service();

        let outcome = service
            .register(signup("alice", "alice@example.com", "Abcdef12"))
            .await
            .unwrap();

        let RegisterOutcome::Registered(user) = outcome else {
            panic!("expected registration to succeed");
        };
        assert_ne!(user.password_hash, "Abcdef12");
        assert!(user.password_hash.starts_with("$2"));
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn test_register_reports_email_and_username_clashes_together() {
        let (service, repo) = service();
        service
            .register(signup("alice", "alice@example.com", "Abcdef12"))
            .await
            .unwrap();

        let outcome = service
            .register(signup("alice", "alice@example.com", "Abcdef12"))
            .await
            .unwrap();

        let RegisterOutcome::Rejected(errors) = outcome else {
            panic!("expected duplicate registration to be rejected");
        };
        assert!(errors.error);
        assert_eq!(errors.email, EMAIL_TAKEN_MESSAGE);
        assert_eq!(errors.username, USERNAME_TAKEN_MESSAGE);
        assert!(errors.password.is_empty());
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password_without_storing() {
        let (service, repo) = service();

        let outcome = service
            .register(signup("bob", "bob@example.com", "abcdefgh"))
            .await
            .unwrap();

        let RegisterOutcome::Rejected(errors) = outcome else {
            panic!("expected weak password to be rejected");
        };
        assert_eq!(errors.password, WEAK_PASSWORD_MESSAGE);
        assert_eq!(repo.user_count(), 0);
    }

    #[tokio::test]
    async fn test_authenticate_by_username_or_email() {
        let (service, _) = service();
        service
            .register(signup("alice", "alice@example.com", "Abcdef12"))
            .await
            .unwrap();

        let by_name = service.authenticate(&signin("alice", "Abcdef12")).await.unwrap();
        let by_email = service
            .authenticate(&signin("alice@example.com", "Abcdef12"))
            .await
            .unwrap();

        assert!(by_name.is_some());
        assert_eq!(by_name.map(|u| u.id), by_email.map(|u| u.id));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_bad_credentials() {
        let (service, _) = service();
        service
            .register(signup("alice", "alice@example.com", "Abcdef12"))
            .await
            .unwrap();

        assert!(service
            .authenticate(&signin("alice", "Abcdef13"))
            .await
            .unwrap()
            .is_none());
        assert!(service
            .authenticate(&signin("nobody", "Abcdef12"))
            .await
            .unwrap()
            .is_none());
        assert!(service
            .authenticate(&signin("", ""))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_register_trims_username_before_uniqueness_check() {
        let (service, repo) = service();
        let RegisterOutcome::Registered(user) = service
            .register(signup("  alice ", "alice@example.com", "Abcdef12"))
            .await
            .unwrap()
        else {
            panic!("expected registration to succeed");
        };
        assert_eq!(user.username, "alice");

        let outcome = service
            .register(signup(" alice", "other@example.com", "Abcdef12"))
            .await
            .unwrap();

        let RegisterOutcome::Rejected(errors) = outcome else {
            panic!("expected padded duplicate username to be rejected");
        };
        assert_eq!(errors.username, USERNAME_TAKEN_MESSAGE);
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn test_email_login_is_not_shadowed_by_matching_username() {
        let (service, _) = service();
        let RegisterOutcome::Registered(alice) = service
            .register(signup("alice", "alice@example.com", "Abcdef12"))
            .await
            .unwrap()
        else {
            panic!("expected registration to succeed");
        };
        service
            .register(signup("alice@example.com", "mallory@example.com", "Zyxwvu98"))
            .await
            .unwrap();

        for _ in 0..20 {
            let user = service
                .authenticate(&signin("alice@example.com", "Abcdef12"))
                .await
                .unwrap();
            assert_eq!(user.map(|u| u.id), Some(alice.id));
        }
    }
}

use rand::Rng;
use tracing::{debug, error};

use crate::shared::AppError;

const BCRYPT_MIN_COST: u32 = 4;
const BCRYPT_MAX_COST: u32 = 31;

/// bcrypt hashing with a cost drawn per password from a configured range
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    min_cost: u32,
    max_cost: u32,
}

impl PasswordHasher {
    /// Bounds are clamped into bcrypt's own valid cost range
    pub fn new(min_cost: u32, max_cost: u32) -> Self {
        let lower = min_cost.clamp(BCRYPT_MIN_COST, BCRYPT_MAX_COST);
        let upper = max_cost.clamp(lower, BCRYPT_MAX_COST);
        Self {
            min_cost: lower,
            max_cost: upper,
        }
    }

    pub fn cost_range(&self) -> (u32, u32) {
        (self.min_cost, self.max_cost)
    }

    fn pick_cost(&self) -> u32 {
        rand::rng().random_range(self.min_cost..=self.max_cost)
    }

    /// Hashes on the blocking pool; bcrypt is CPU-bound
    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let cost = self.pick_cost();
        let password = password.to_string();
        debug!(cost, "Hashing password");

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| {
                error!(error = %e, "Password hashing task failed");
                AppError::Internal
            })?
            .map_err(|e| {
                error!(error = %e, "Failed to hash password");
                AppError::Internal
            })
    }

    /// Compares a password against a stored hash. A malformed hash counts as a mismatch.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| {
                error!(error = %e, "Password verification task failed");
                AppError::Internal
            })?
            .or_else(|e| {
                error!(error = %e, "Stored password hash could not be verified");
                Ok(false)
            })
    }
}

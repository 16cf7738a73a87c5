use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{NewRefreshClaim, RefreshClaimModel};
use crate::shared::AppError;

/// Trait for persisted refresh claim operations
#[async_trait]
pub trait ClaimRepository {
    async fn create_claim(&self, claim: &NewRefreshClaim) -> Result<RefreshClaimModel, AppError>;
    async fn count_by_issuer(&self, issuer: &str) -> Result<u64, AppError>;
    async fn delete_by_issuer(&self, issuer: &str) -> Result<u64, AppError>;

    /// Finds the row persisted for a token by exact issuer and timestamps
    async fn find_claim(
        &self,
        issuer: &str,
        issued_at: i64,
        expires_at: i64,
    ) -> Result<Option<RefreshClaimModel>, AppError>;
}

/// In-memory implementation of ClaimRepository for development and testing
pub struct InMemoryClaimRepository {
    state: Mutex<InMemoryClaims>,
}

#[derive(Default)]
struct InMemoryClaims {
    next_id: i64,
    rows: BTreeMap<i64, RefreshClaimModel>,
}

impl Default for InMemoryClaimRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryClaimRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InMemoryClaims {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    /// All rows persisted for an issuer, in insertion order
    pub fn claims_for(&self, issuer: &str) -> Vec<RefreshClaimModel> {
        self.lock()
            .map(|state| {
                state
                    .rows
                    .values()
                    .filter(|row| row.issuer == issuer)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryClaims>, AppError> {
        self.state.lock().map_err(|_| {
            warn!("In-memory claim store lock poisoned");
            AppError::Internal
        })
    }
}

#[async_trait]
impl ClaimRepository for InMemoryClaimRepository {
    #[instrument(skip(self, claim), fields(issuer = %claim.issuer))]
    async fn create_claim(&self, claim: &NewRefreshClaim) -> Result<RefreshClaimModel, AppError> {
        let mut state = self.lock()?;
        let id = state.next_id;
        state.next_id += 1;

        let row = RefreshClaimModel {
            id,
            issuer: claim.issuer.clone(),
            issued_at: claim.issued_at,
            expires_at: claim.expires_at,
            subject: claim.subject.clone(),
        };
        state.rows.insert(id, row.clone());

        debug!(claim_id = id, "Refresh claim stored in memory");
        Ok(row)
    }

    #[instrument(skip(self))]
    async fn count_by_issuer(&self, issuer: &str) -> Result<u64, AppError> {
        let state = self.lock()?;
        let count = state.rows.values().filter(|row| row.issuer == issuer).count();
        Ok(count as u64)
    }

    #[instrument(skip(self))]
    async fn delete_by_issuer(&self, issuer: &str) -> Result<u64, AppError> {
        let mut state = self.lock()?;
        let before = state.rows.len();
        state.rows.retain(|_, row| row.issuer != issuer);
        let removed = before - state.rows.len();

        debug!(removed_claims = removed, "Refresh claims deleted from memory");
        Ok(removed as u64)
    }

    #[instrument(skip(self))]
    async fn find_claim(
        &self,
        issuer: &str,
        issued_at: i64,
        expires_at: i64,
    ) -> Result<Option<RefreshClaimModel>, AppError> {
        let state = self.lock()?;
        Ok(state
            .rows
            .values()
            .find(|row| {
                row.issuer == issuer && row.issued_at == issued_at && row.expires_at == expires_at
            })
            .cloned())
    }
}

/// PostgreSQL implementation of claim repository
pub struct PostgresClaimRepository {
    pool: PgPool,
}

impl PostgresClaimRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClaimRepository for PostgresClaimRepository {
    #[instrument(skip(self, claim), fields(issuer = %claim.issuer))]
    async fn create_claim(&self, claim: &NewRefreshClaim) -> Result<RefreshClaimModel, AppError> {
        let row = sqlx::query(
            "INSERT INTO refresh_claims (issuer, issued_at, expires_at, subject) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&claim.issuer)
        .bind(claim.issued_at)
        .bind(claim.expires_at)
        .bind(&claim.subject)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to store refresh claim");
            AppError::DatabaseError(e.to_string())
        })?;

        let id: i64 = row.get("id");
        debug!(claim_id = id, "Refresh claim stored in database");

        Ok(RefreshClaimModel {
            id,
            issuer: claim.issuer.clone(),
            issued_at: claim.issued_at,
            expires_at: claim.expires_at,
            subject: claim.subject.clone(),
        })
    }

    #[instrument(skip(self))]
    async fn count_by_issuer(&self, issuer: &str) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM refresh_claims WHERE issuer = $1")
            .bind(issuer)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to count refresh claims");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(count as u64)
    }

    #[instrument(skip(self))]
    async fn delete_by_issuer(&self, issuer: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM refresh_claims WHERE issuer = $1")
            .bind(issuer)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete refresh claims");
                AppError::DatabaseError(e.to_string())
            })?;

        debug!(
            removed_claims = result.rows_affected(),
            "Refresh claims deleted from database"
        );
        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn find_claim(
        &self,
        issuer: &str,
        issued_at: i64,
        expires_at: i64,
    ) -> Result<Option<RefreshClaimModel>, AppError> {
        sqlx::query_as::<_, RefreshClaimModel>(
            "SELECT id, issuer, issued_at, expires_at, subject FROM refresh_claims WHERE issuer = $1 AND issued_at = $2 AND expires_at = $3 LIMIT 1",
        )
        .bind(issuer)
        .bind(issued_at)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to look up refresh claim");
            AppError::DatabaseError(e.to_string())
        })
    }
}

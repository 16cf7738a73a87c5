use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::NewRefreshClaim,
    repository::ClaimRepository,
    token::{TokenConfig, TokenError},
    types::{Claims, TokenPair},
};
use crate::shared::AppError;

/// Once an issuer has this many refresh claims, the next issuance wipes them all
pub const MAX_REFRESH_CLAIMS: u64 = 3;

/// Service for issuing, refreshing and revoking session tokens
pub struct SessionService {
    repository: Arc<dyn ClaimRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn ClaimRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            repository,
            token_config,
        }
    }

    /// Issues an access token and a persisted refresh token for a user
    #[instrument(skip(self))]
    pub async fn issue_tokens(&self, user_id: &str) -> Result<TokenPair, AppError> {
        let access_token = self.issue_access_token(user_id)?;
        let refresh_token = self.issue_refresh_token(user_id).await?;

        info!(user_id = %user_id, "Issued token pair");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Signs a stateless access token; nothing is persisted
    pub fn issue_access_token(&self, user_id: &str) -> Result<String, AppError> {
        let claims = Claims::access(user_id, Utc::now());
        self.token_config.create_token(&claims).map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to sign access token");
            e
        })
    }

    /// Persists and signs a refresh token. When the issuer already holds the
    /// maximum number of claims, all of them are deleted before the insert.
    #[instrument(skip(self))]
    pub async fn issue_refresh_token(&self, user_id: &str) -> Result<String, AppError> {
        let existing = self.repository.count_by_issuer(user_id).await?;
        if existing >= MAX_REFRESH_CLAIMS {
            let removed = self.repository.delete_by_issuer(user_id).await?;
            info!(user_id = %user_id, removed_claims = removed, "Refresh claim limit reached, cleared previous claims");
        }

        let claims = Claims::refresh(user_id, Utc::now());
        let stored = self
            .repository
            .create_claim(&NewRefreshClaim::from(&claims))
            .await?;

        let token = self.token_config.create_token(&claims).map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to sign refresh token");
            e
        })?;

        info!(user_id = %user_id, claim_id = stored.id, "Refresh token issued");
        Ok(token)
    }

    /// Checks an access token for the request gate. Expired tokens are
    /// `Unauthorized`; everything else that fails is `Forbidden`.
    #[instrument(skip(self, token))]
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        self.token_config
            .validate_access_token(token)
            .map_err(|e| match e {
                TokenError::Expired => {
                    warn!("Access token expired");
                    AppError::Unauthorized("Token Expired".to_string())
                }
                TokenError::Malformed => {
                    warn!("Access token malformed");
                    AppError::Forbidden("Malformed token".to_string())
                }
                TokenError::Invalid(reason) => {
                    warn!(reason = %reason, "Access token rejected");
                    AppError::Forbidden("Invalid token".to_string())
                }
            })
    }

    /// Exchanges a refresh token for a new access token. The refresh token must
    /// still be persisted and unexpired; it is not rotated.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, AppError> {
        let claims = self
            .token_config
            .decode_refresh_token(refresh_token)
            .map_err(|e| {
                warn!(error = ?e, "Refresh token rejected");
                AppError::Forbidden("Invalid refresh token".to_string())
            })?;

        let persisted = self
            .repository
            .find_claim(&claims.iss, claims.iat, claims.exp)
            .await?;
        if persisted.is_none() {
            warn!(user_id = %claims.iss, "Refresh token revoked or superseded");
            return Err(AppError::Forbidden(
                "Refresh token has been revoked".to_string(),
            ));
        }

        if claims.is_expired() {
            warn!(user_id = %claims.iss, "Refresh token expired");
            return Err(AppError::Forbidden("Refresh token expired".to_string()));
        }

        let access_token = self.issue_access_token(&claims.iss)?;
        info!(user_id = %claims.iss, "Access token refreshed");
        Ok(access_token)
    }

    /// Deletes every persisted refresh claim for a user
    #[instrument(skip(self))]
    pub async fn revoke_all(&self, user_id: &str) -> Result<u64, AppError> {
        let removed = self.repository.delete_by_issuer(user_id).await?;
        info!(user_id = %user_id, removed_claims = removed, "Revoked refresh claims");
        Ok(removed)
    }
}

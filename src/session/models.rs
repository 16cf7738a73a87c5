use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::types::Claims;

/// Database model for the refresh_claims table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct RefreshClaimModel {
    pub id: i64, // Assigned by the store on insert
    pub issuer: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub subject: String,
}

/// Refresh claim that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewRefreshClaim {
    pub issuer: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub subject: String,
}

impl From<&Claims> for NewRefreshClaim {
    fn from(claims: &Claims) -> Self {
        Self {
            issuer: claims.iss.clone(),
            issued_at: claims.iat,
            expires_at: claims.exp,
            subject: claims.sub.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_new_refresh_claim_from_claims() {
        let claims = Claims::refresh("user-1", Utc::now());
        let new_claim = NewRefreshClaim::from(&claims);

        assert_eq!(new_claim.issuer, "user-1");
        assert_eq!(new_claim.issued_at, claims.iat);
        assert_eq!(new_claim.expires_at, claims.exp);
        assert_eq!(new_claim.subject, "refresh_token");
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ACCESS_TOKEN_SUBJECT: &str = "access_token";
pub const REFRESH_TOKEN_SUBJECT: &str = "refresh_token";

/// Access tokens are valid for one hour
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 60;
/// Refresh tokens are valid for thirty days
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 30;

/// JWT claims carried by both access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub iss: String, // User ID
    pub iat: i64,
    pub exp: i64,
    pub sub: String, // "access_token" or "refresh_token"
}

impl Claims {
    pub fn access(issuer: &str, now: DateTime<Utc>) -> Self {
        Self {
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ACCESS_TOKEN_TTL_MINUTES)).timestamp(),
            sub: ACCESS_TOKEN_SUBJECT.to_string(),
        }
    }

    pub fn refresh(issuer: &str, now: DateTime<Utc>) -> Self {
        Self {
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(REFRESH_TOKEN_TTL_DAYS)).timestamp(),
            sub: REFRESH_TOKEN_SUBJECT.to_string(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }
}

/// Identity attached to request extensions by the access token gate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Response body for signup and signin
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Response body for the refresh endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

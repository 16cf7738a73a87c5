use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::{debug, instrument};

use super::types::{Claims, ACCESS_TOKEN_SUBJECT, REFRESH_TOKEN_SUBJECT};
use crate::shared::AppError;

/// Why a presented token was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signature checked out but the token is expired or not yet valid
    Expired,
    /// Not a decodable JWT at all
    Malformed,
    /// Bad signature, wrong subject, wrong algorithm or missing claims
    Invalid(String),
}

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Signs the given claims with HS256
    #[instrument(skip(self, claims), fields(sub = %claims.sub))]
    pub fn create_token(&self, claims: &Claims) -> Result<String, AppError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Validates signature, expiry and subject of an access token
    #[instrument(skip(self, token))]
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_with(token, ACCESS_TOKEN_SUBJECT, true)
    }

    /// Validates signature and subject of a refresh token. Expiry is left to the
    /// caller, which must first match the token against the persisted claims.
    #[instrument(skip(self, token))]
    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_with(token, REFRESH_TOKEN_SUBJECT, false)
    }

    fn decode_with(
        &self,
        token: &str,
        subject: &str,
        validate_exp: bool,
    ) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = validate_exp;
        validation.sub = Some(subject.to_string());
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| {
            debug!(iss = %data.claims.iss, exp = data.claims.exp, "JWT token decoded successfully");
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            classify(e.kind())
        })
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => TokenError::Expired,
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            TokenError::Malformed
        }
        other => TokenError::Invalid(format!("{:?}", other)),
    }
}

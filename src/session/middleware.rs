use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{cookies, types::AuthenticatedUser};
use crate::shared::{AppError, AppState};

/// Request header carrying the access token on protected calls
pub const ACCESS_TOKEN_HEADER: &str = "access_token";

/// Access token gate - validates the `access_token` header (or, for browser
/// clients, the `access_token` cookie) and adds AuthenticatedUser to the request.
/// Usage: .route_layer(middleware::from_fn_with_state(state.clone(), session::require_access_token))
/// Handlers can then extract Extension(user): Extension<AuthenticatedUser>.
#[instrument(skip(state, req, next), fields(uri = %req.uri()))]
pub async fn require_access_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|header| header.to_str().ok())
        .map(str::to_string)
        .or_else(|| cookies::read_cookie(req.headers(), cookies::ACCESS_TOKEN_COOKIE))
        .unwrap_or_default();

    if token.is_empty() {
        debug!("No access token presented");
    }

    let claims = state.session_service().validate_access_token(&token)?;

    let user_id = Uuid::parse_str(&claims.iss).map_err(|e| {
        warn!(error = %e, issuer = %claims.iss, "Access token issuer is not a user id");
        AppError::Forbidden("Invalid token".to_string())
    })?;

    debug!(user_id = %user_id, "Access token accepted");
    req.extensions_mut().insert(AuthenticatedUser { user_id });

    Ok(next.run(req).await)
}

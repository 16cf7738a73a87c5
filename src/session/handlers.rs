use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Extension, Json,
};
use tracing::{info, instrument, warn};

use super::{
    cookies,
    types::{AccessTokenResponse, AuthenticatedUser},
};
use crate::shared::{AppError, AppState};

/// HTTP handler exchanging the refresh token cookie for a new access token
///
/// GET /api/user/fetch-access-token
/// Returns the new access token and sets it as the access_token cookie
#[instrument(name = "fetch_access_token", skip(state, headers))]
pub async fn fetch_access_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let refresh_token = cookies::read_cookie(&headers, cookies::REFRESH_TOKEN_COOKIE)
        .ok_or_else(|| {
            warn!("Refresh requested without a refresh_token cookie");
            AppError::Forbidden("Missing refresh token".to_string())
        })?;

    let access_token = state
        .session_service()
        .refresh_access_token(&refresh_token)
        .await?;
    let cookie = cookies::access_cookie(&access_token, state.cookie_secure)?;

    Ok((
        AppendHeaders(vec![cookie]),
        Json(AccessTokenResponse { access_token }),
    ))
}

/// HTTP handler revoking every refresh token of the caller
///
/// POST /api/user/signout
#[instrument(name = "signout", skip(state))]
pub async fn signout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state
        .session_service()
        .revoke_all(&user.user_id.to_string())
        .await?;

    info!(user_id = %user.user_id, removed_claims = removed, "User signed out");

    Ok((StatusCode::OK, AppendHeaders(cookies::cleared_cookies())))
}

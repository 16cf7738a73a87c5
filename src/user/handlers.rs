use axum::{
    extract::{rejection::JsonRejection, State},
    response::{AppendHeaders, IntoResponse, Response},
    Extension, Json,
};
use tracing::{info, instrument, warn};

use super::{
    models::{UserModel, UserResponse},
    service::RegisterOutcome,
    types::{GeneralError, SigninRequest, SignupRequest},
};
use crate::session::{cookies, AuthenticatedUser};
use crate::shared::{AppError, AppState};

pub const INVALID_INPUT_MESSAGE: &str = "Please review your input";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid Credentials.";

/// HTTP handler for registering a new user
///
/// POST /api/user/signup
/// Returns the token pair and sets both auth cookies, or the per-field errors
#[instrument(name = "signup", skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable signup body");
            return Ok(Json(GeneralError::input(INVALID_INPUT_MESSAGE)).into_response());
        }
    };

    match state.user_service().register(request).await? {
        RegisterOutcome::Registered(user) => {
            info!(user_id = %user.id, "Signup completed");
            issue_session(&state, &user).await
        }
        RegisterOutcome::Rejected(errors) => Ok(Json(errors).into_response()),
    }
}

/// HTTP handler for logging in with a username or email
///
/// POST /api/user/signin
#[instrument(name = "signin", skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable signin body");
            return Ok(Json(GeneralError::input(INVALID_INPUT_MESSAGE)).into_response());
        }
    };

    match state.user_service().authenticate(&request).await? {
        Some(user) => issue_session(&state, &user).await,
        None => {
            warn!(identity = %request.identity, "Signin rejected");
            Ok(Json(GeneralError::general(INVALID_CREDENTIALS_MESSAGE)).into_response())
        }
    }
}

/// HTTP handler returning the caller's own record
///
/// GET /api/user/user
#[instrument(name = "get_current_user", skip(state))]
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>, AppError> {
    let found = state
        .user_service()
        .get_user(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cannot find the User".to_string()))?;

    Ok(Json(UserResponse::from(found)))
}

async fn issue_session(state: &AppState, user: &UserModel) -> Result<Response, AppError> {
    let pair = state
        .session_service()
        .issue_tokens(&user.id.to_string())
        .await?;
    let headers = cookies::auth_cookies(&pair.access_token, &pair.refresh_token, state.cookie_secure)?;

    Ok((AppendHeaders(headers), Json(pair)).into_response())
}

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderName, HeaderValue,
};
use chrono::{DateTime, Duration, Utc};

use crate::shared::AppError;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

const ACCESS_COOKIE_TTL_HOURS: i64 = 24;
const REFRESH_COOKIE_TTL_DAYS: i64 = 10;

/// Set-Cookie headers for a freshly issued token pair
pub fn auth_cookies(
    access_token: &str,
    refresh_token: &str,
    secure: bool,
) -> Result<Vec<(HeaderName, HeaderValue)>, AppError> {
    Ok(vec![
        access_cookie(access_token, secure)?,
        set_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh_token,
            Utc::now() + Duration::days(REFRESH_COOKIE_TTL_DAYS),
            secure,
        )?,
    ])
}

/// Set-Cookie header for a refreshed access token
pub fn access_cookie(
    access_token: &str,
    secure: bool,
) -> Result<(HeaderName, HeaderValue), AppError> {
    set_cookie(
        ACCESS_TOKEN_COOKIE,
        access_token,
        Utc::now() + Duration::hours(ACCESS_COOKIE_TTL_HOURS),
        secure,
    )
}

/// Set-Cookie headers that expire both auth cookies immediately
pub fn cleared_cookies() -> Vec<(HeaderName, HeaderValue)> {
    vec![
        (SET_COOKIE, HeaderValue::from_static(CLEARED_ACCESS_COOKIE)),
        (SET_COOKIE, HeaderValue::from_static(CLEARED_REFRESH_COOKIE)),
    ]
}

const CLEARED_ACCESS_COOKIE: &str =
    "access_token=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly";
const CLEARED_REFRESH_COOKIE: &str =
    "refresh_token=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly";

/// Reads a cookie value from the request's Cookie headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

fn set_cookie(
    name: &str,
    value: &str,
    expires: DateTime<Utc>,
    secure: bool,
) -> Result<(HeaderName, HeaderValue), AppError> {
    let mut cookie = format!(
        "{}={}; Path=/; Expires={}; HttpOnly",
        name,
        value,
        expires.format("%a, %d %b %Y %H:%M:%S GMT")
    );
    if secure {
        cookie.push_str("; Secure");
    }

    let header = HeaderValue::from_str(&cookie).map_err(|e| {
        tracing::error!(error = %e, cookie = %name, "Cookie value is not a valid header");
        AppError::Internal
    })?;
    Ok((SET_COOKIE, header))
}

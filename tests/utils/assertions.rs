use axum::http::StatusCode;

use super::actions::TestResponse;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub fn assert_cookies_cleared(response: &TestResponse) {
    let cookies = response.set_cookies();
    for name in ["access_token", "refresh_token"] {
        let cleared = cookies
            .iter()
            .any(|c| c.starts_with(&format!("{}=;", name)) && c.contains("Max-Age=0"));
        assert!(cleared, "{} was not cleared in {:?}", name, cookies);
    }
}

pub fn assert_no_cookies(response: &TestResponse) {
    assert!(
        response.set_cookies().is_empty(),
        "unexpected Set-Cookie headers: {:?}",
        response.set_cookies()
    );
}

pub fn assert_error_envelope(response: &TestResponse, status: StatusCode, message: &str) {
    assert_eq!(response.status, status, "body: {}", response.body);
    assert_eq!(response.body["status"], "error");
    assert_eq!(response.body["message"], message);
    assert!(response.body["data"].is_null());
}

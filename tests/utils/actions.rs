use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;

use todo_server::{user::repository::UserRepository, TokenPair};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

/// Status, headers and parsed body of one response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect()
    }

    /// Value of a cookie set by this response, if any
    pub fn cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{}=", name);
        self.set_cookies().into_iter().find_map(|cookie| {
            cookie
                .split(';')
                .next()
                .and_then(|pair| pair.strip_prefix(&prefix))
                .map(str::to_string)
        })
    }
}

/// Optional credentials attached to a request
#[derive(Default)]
pub struct Auth<'a> {
    pub access_header: Option<&'a str>,
    pub cookie: Option<String>,
}

impl<'a> Auth<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn header(token: &'a str) -> Self {
        Self {
            access_header: Some(token),
            cookie: None,
        }
    }

    pub fn cookie(name: &str, value: &str) -> Self {
        Self {
            access_header: None,
            cookie: Some(format!("{}={}", name, value)),
        }
    }
}

impl TestSetup {
    /// Send a request through the full router
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>, auth: Auth<'_>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = auth.access_header {
            builder = builder.header("access_token", token);
        }
        if let Some(cookie) = auth.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn signup(&self, username: &str, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/api/user/signup",
            Some(json!({ "username": username, "email": email, "password": password })),
            Auth::none(),
        )
        .await
    }

    pub async fn signin(&self, identity: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/api/user/signin",
            Some(json!({ "identity": identity, "password": password })),
            Auth::none(),
        )
        .await
    }

    /// Register a user with a valid password and return their token pair
    pub async fn register(&self, username: &str) -> TokenPair {
        let response = self
            .signup(username, &format!("{}@example.com", username), "Abcdef12")
            .await;
        assert_eq!(response.status, StatusCode::OK);
        serde_json::from_value(response.body).unwrap()
    }

    pub async fn user_id(&self, username: &str) -> Uuid {
        self.users
            .find_by_username(username)
            .await
            .unwrap()
            .unwrap()
            .id
    }

    pub async fn create_todo(&self, access_token: &str, title: &str, due_date: i64) -> TestResponse {
        self.send(
            "POST",
            "/api/todo/create",
            Some(json!({ "title": title, "dueDate": due_date })),
            Auth::header(access_token),
        )
        .await
    }
}

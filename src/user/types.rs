use serde::{Deserialize, Serialize};

/// Request payload for POST /user/signup
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request payload for POST /user/signin
#[derive(Debug, Clone, Deserialize)]
pub struct SigninRequest {
    /// Username or email
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub password: String,
}

/// Per-field registration errors, reported together
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterErrors {
    pub error: bool,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl RegisterErrors {
    pub fn set_email(&mut self, message: &str) {
        self.error = true;
        self.email = message.to_string();
    }

    pub fn set_username(&mut self, message: &str) {
        self.error = true;
        self.username = message.to_string();
    }

    pub fn set_password(&mut self, message: &str) {
        self.error = true;
        self.password = message.to_string();
    }
}

/// Error body for credential failures and unreadable input
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GeneralError {
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

impl GeneralError {
    pub fn general(message: &str) -> Self {
        Self {
            error: true,
            general: Some(message.to_string()),
            input: None,
        }
    }

    pub fn input(message: &str) -> Self {
        Self {
            error: true,
            general: None,
            input: Some(message.to_string()),
        }
    }
}

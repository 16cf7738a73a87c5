use super::types::{RegisterErrors, SignupRequest};

pub const EMPTY_USERNAME_MESSAGE: &str = "Must not be empty";
pub const INVALID_EMAIL_MESSAGE: &str = "Must be a valid email";
pub const WEAK_PASSWORD_MESSAGE: &str = "Length of password should be atleast 8 and it must be a combination of uppercase letters, lowercase letters and numbers";

const MIN_PASSWORD_LENGTH: usize = 8;

/// Field-level checks for a signup request. Uniqueness is checked separately
/// against the store.
pub fn validate_register(request: &SignupRequest) -> RegisterErrors {
    let mut errors = RegisterErrors::default();

    if request.username.trim().is_empty() {
        errors.set_username(EMPTY_USERNAME_MESSAGE);
    }

    if !is_valid_email(&request.email) {
        errors.set_email(INVALID_EMAIL_MESSAGE);
    }

    if !is_strong_password(&request.password) {
        errors.set_password(WEAK_PASSWORD_MESSAGE);
    }

    errors
}

/// At least 8 characters with a lowercase letter, an uppercase letter and a digit
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Structural email check: `local@domain.tld` with a dotted, hostname-shaped domain
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };

    if local.is_empty() || local.len() > 64 || domain.len() > 253 {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(c));
    if !local_ok {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    let tld = labels[labels.len() - 1];
    labels_ok && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

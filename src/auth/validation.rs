use crate::error::{AppError, AppResult};

const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 50;
const MIN_PASSWORD_LENGTH: usize = 8;

pub fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    let len = name.chars().count();
    if len < MIN_NAME_LENGTH {
        return Err(AppError::BadRequest(
            "Name must be at least 2 characters".into(),
        ));
    }
    if len > MAX_NAME_LENGTH {
        return Err(AppError::BadRequest(
            "Name must be less than 50 characters".into(),
        ));
    }
    Ok(name.to_string())
}

/// Returns the trimmed, lowercased address.
pub fn validate_email(email: &str) -> AppResult<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".into()));
    }
    if !is_email_shaped(email) {
        return Err(AppError::BadRequest(
            "Please enter a valid email address".into(),
        ));
    }
    Ok(email.to_lowercase())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.is_empty() {
        return Err(AppError::BadRequest("Password is required".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".into(),
        ));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(AppError::BadRequest(
            "Password must contain at least one lowercase letter".into(),
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(AppError::BadRequest(
            "Password must contain at least one uppercase letter".into(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest(
            "Password must contain at least one number".into(),
        ));
    }
    Ok(())
}

// local@domain.tld, no whitespace, exactly one '@', a dot inside the domain
fn is_email_shaped(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

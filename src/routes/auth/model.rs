use crate::error::AppError;
use crate::models::{LoginRequest, RegisterRequest};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 6;
// bcrypt 只使用前 72 字节
const PASSWORD_MAX: usize = 72;
const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 255;

/// 校验通过并规范化后的注册数据
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

pub fn validate_login(req: &LoginRequest) -> Result<(), AppError> {
    if req.email_or_username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "emailOrUsername and password are required".into(),
        ));
    }
    Ok(())
}

pub fn validate_registration(req: RegisterRequest) -> Result<ValidRegistration, AppError> {
    let email = req.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::Validation("email must be a valid address".into()));
    }

    let username = req.username.trim().to_string();
    let username_len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&username_len) {
        return Err(AppError::Validation(format!(
            "username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    // 用户名只允许字母、数字和下划线
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::Validation(
            "username may only contain letters, digits and underscores".into(),
        ));
    }

    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&req.password.len()) {
        return Err(AppError::Validation(format!(
            "password must be between {PASSWORD_MIN} and {PASSWORD_MAX} bytes"
        )));
    }

    let first_name = required_name("firstName", &req.first_name)?;
    let last_name = required_name("lastName", &req.last_name)?;

    Ok(ValidRegistration {
        email,
        username,
        password: req.password,
        first_name,
        last_name,
    })
}

fn required_name(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > NAME_MAX {
        return Err(AppError::Validation(format!(
            "{field} must be between 1 and {NAME_MAX} characters"
        )));
    }
    Ok(value.to_string())
}

fn is_valid_email(email: &str) -> bool {
    if email.len() > EMAIL_MAX || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

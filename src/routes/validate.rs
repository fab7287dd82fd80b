use rust_decimal::Decimal;

use crate::error::AppError;

/// Boundary validation: each checker appends human-readable violations,
/// the caller gets every problem in one BadRequest instead of the first.
pub fn finish(errors: Vec<String>) -> Result<(), AppError> {
    if errors.is_empty() {
        return Ok(());
    }
    Err(AppError::bad_request(errors.join("; ")))
}

pub fn check_handle(handle: &str, errors: &mut Vec<String>) {
    if !(3..=80).contains(&handle.len()) {
        errors.push("handle must be between 3 and 80 characters".to_string());
    }
    if !handle
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        errors.push(
            "handle may only contain letters, numbers, dots and underscores".to_string(),
        );
    }
}

pub fn check_name(name: &str, errors: &mut Vec<String>) {
    let len = name.trim().len();
    if !(3..=150).contains(&len) {
        errors.push("name must be between 3 and 150 characters".to_string());
    }
}

pub fn check_email(email: &str, errors: &mut Vec<String>) {
    let looks_like_address = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if email.len() > 150 || email.contains(char::is_whitespace) || !looks_like_address {
        errors.push("email must be a valid address".to_string());
    }
}

pub fn check_phone(phone: Option<&str>, errors: &mut Vec<String>) {
    if let Some(phone) = phone {
        if phone.len() > 50 {
            errors.push("phone must be at most 50 characters".to_string());
        }
    }
}

pub fn check_strong_password(password: &str, errors: &mut Vec<String>) {
    let strong = password.len() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_ascii_alphanumeric());
    if !strong {
        errors.push(
            "password needs at least 8 characters with an uppercase letter, \
             a lowercase letter, a number and a symbol"
                .to_string(),
        );
    }
}

pub fn check_reset_code(code: &str, errors: &mut Vec<String>) {
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        errors.push("code must be a 6-digit number".to_string());
    }
}

pub fn check_required(value: &str, field: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(format!("{field} is required"));
    }
}

pub fn check_positive_amount(amount: Decimal, errors: &mut Vec<String>) {
    if amount <= Decimal::ZERO {
        errors.push("amount must be greater than zero".to_string());
    }
}

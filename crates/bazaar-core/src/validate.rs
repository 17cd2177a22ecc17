//! Field checks shared by the create/update paths.

use rust_decimal::Decimal;

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Largest amount the money columns (`NUMERIC(12, 2)`) can hold.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Decimal places kept for money.
pub const AMOUNT_SCALE: u32 = 2;

/// Trim `value` and reject it when empty.
pub fn required(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Normalize an email address to lower case and check its basic shape.
pub fn email(value: &str) -> Result<String, AppError> {
    let email = required("Email", value)?.to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::Validation(format!("Invalid email address: {email}")));
    }
    Ok(email)
}

pub fn password(value: &str) -> Result<(), AppError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn non_negative_price(value: Decimal) -> Result<Decimal, AppError> {
    if value.is_sign_negative() {
        return Err(AppError::Validation("Price cannot be negative".into()));
    }
    if value.normalize().scale() > AMOUNT_SCALE {
        return Err(AppError::Validation(format!(
            "Price cannot have more than {AMOUNT_SCALE} decimal places"
        )));
    }
    within_max_amount("Price", value)
}

/// Reject amounts the money columns cannot store.
pub fn within_max_amount(field: &str, value: Decimal) -> Result<Decimal, AppError> {
    if value > MAX_AMOUNT {
        return Err(AppError::Validation(format!(
            "{field} cannot exceed {MAX_AMOUNT}"
        )));
    }
    Ok(value)
}

pub fn non_negative_stock(value: i32) -> Result<i32, AppError> {
    if value < 0 {
        return Err(AppError::Validation("Stock cannot be negative".into()));
    }
    Ok(value)
}

pub fn percentage(field: &str, value: Decimal) -> Result<Decimal, AppError> {
    if value.is_sign_negative() || value > Decimal::ONE_HUNDRED {
        return Err(AppError::Validation(format!(
            "{field} must be between 0 and 100"
        )));
    }
    Ok(value)
}

/// Trim an optional text field, mapping blank strings to `None`.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

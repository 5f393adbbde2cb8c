//! Input validation functions
//!
//! Plain functions over primitive values so the same rules can be applied by
//! the backend and by any client that wants to pre-validate a form.

use crate::errors::FieldError;
use validator::ValidateEmail;

/// Minimum accepted password length (in bytes)
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum accepted password length (in bytes)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Maximum length for names, descriptions and emails
pub const MAX_TEXT_LEN: usize = 255;

/// Largest price representable by the `NUMERIC(12,2)` column
pub const MAX_PRICE: f64 = 9_999_999_999.99;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.is_empty() {
        return Err(FieldError::new("email", "Email cannot be empty"));
    }
    if email.len() > MAX_TEXT_LEN {
        return Err(FieldError::new("email", "Email too long"));
    }
    if !email.validate_email() {
        return Err(FieldError::new("email", "Invalid email format"));
    }
    Ok(())
}

/// Lowercase and trim an email so lookups and the unique index agree
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), FieldError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(FieldError::new(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(FieldError::new("password", "Password too long"));
    }
    Ok(())
}

/// Validate a required free-text field (name, description)
pub fn validate_required_text(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, format!("{} is required", field)));
    }
    if value.len() > MAX_TEXT_LEN && field != "description" {
        return Err(FieldError::new(field, format!("{} too long", field)));
    }
    Ok(())
}

/// Validate product price
pub fn validate_price(price: f64) -> Result<(), FieldError> {
    if price.is_nan() || price.is_infinite() {
        return Err(FieldError::new("price", "Price must be a valid number"));
    }
    if price < 0.0 {
        return Err(FieldError::new("price", "Price cannot be negative"));
    }
    if price > MAX_PRICE {
        return Err(FieldError::new("price", "Price too large"));
    }
    Ok(())
}

/// Validate stock quantity
pub fn validate_quantity(quantity: i32) -> Result<(), FieldError> {
    if quantity < 0 {
        return Err(FieldError::new("quantity", "Quantity cannot be negative"));
    }
    Ok(())
}

/// Treat a missing or blank string as "not provided"
///
/// Partial updates only touch fields the caller actually supplied; an empty
/// string is never a value a caller can set a text field to.
pub fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

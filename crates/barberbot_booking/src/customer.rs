// --- File: crates/barberbot_booking/src/customer.rs ---
use crate::error::BookingError;
use serde::{Deserialize, Serialize};

const MIN_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 15;

/// The person booking. The normalized phone number is their identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub phone: String,
    pub name: String,
    pub email: Option<String>,
    pub language: Option<String>,
}

impl Customer {
    /// Validate and normalize; the phone becomes `+<digits>`.
    pub fn validated(self) -> Result<Self, BookingError> {
        let phone = normalize_phone(&self.phone)?;
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(BookingError::invalid("customer name must not be blank"));
        }
        let email = self
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(BookingError::invalid(format!("'{email}' is not an email address")));
            }
        }
        Ok(Self {
            phone,
            name,
            email,
            language: self.language,
        })
    }
}

/// E.164-like check: optional `+`, then 10 to 15 digits once spaces, dashes, dots and
/// parentheses are stripped.
pub fn normalize_phone(raw: &str) -> Result<String, BookingError> {
    let trimmed = raw.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let mut digits = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => {
                return Err(BookingError::invalid(format!(
                    "'{raw}' is not a valid phone number"
                )))
            }
        }
    }
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(BookingError::invalid(format!(
            "'{raw}' is not a valid phone number"
        )));
    }
    Ok(format!("+{digits}"))
}

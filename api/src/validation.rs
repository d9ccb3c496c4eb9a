//! Explicit field-syntax validation for the transfer endpoints.
//!
//! Each named field is checked directly; nothing here uses runtime type
//! introspection. The engine behind this boundary assumes well-formed
//! input and only enforces account existence and balance invariants.

use chrono::{Datelike, Utc};

use crate::dto::{ConfirmDto, TransferDto};

/// Numeric code for field-syntax violations.
pub const CODE_SYNTAX: u16 = 107;
/// Numeric code for an expired card.
pub const CODE_CARD_EXPIRED: u16 = 110;

/// A rejected request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
    pub code: u16,
}

impl ValidationError {
    fn syntax(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: CODE_SYNTAX,
        }
    }
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

fn check_pan(value: &str, field: &str) -> Result<(), ValidationError> {
    if !is_digits(value, 16) {
        return Err(ValidationError::syntax(format!(
            "{field} must be a 16-digit card number"
        )));
    }
    Ok(())
}

/// Check an MMYY expiry string: syntactically valid and not in the past.
/// A card stays valid through the last day of its expiry month.
fn check_expiry(value: &str) -> Result<(), ValidationError> {
    if !is_digits(value, 4) {
        return Err(ValidationError::syntax(
            "cardFromValidTill must be in MMYY format",
        ));
    }
    let month: u32 = value[..2].parse().unwrap_or(0);
    let year: i32 = 2000 + value[2..].parse::<i32>().unwrap_or(0);
    if !(1..=12).contains(&month) {
        return Err(ValidationError::syntax(
            "cardFromValidTill must be in MMYY format",
        ));
    }

    let today = Utc::now().date_naive();
    if (year, month) < (today.year(), today.month()) {
        return Err(ValidationError {
            message: "card validity period has expired".to_string(),
            code: CODE_CARD_EXPIRED,
        });
    }
    Ok(())
}

/// Validate a transfer request body.
pub fn validate_transfer(dto: &TransferDto) -> Result<(), ValidationError> {
    check_pan(&dto.card_from_number, "cardFromNumber")?;
    check_pan(&dto.card_to_number, "cardToNumber")?;

    if !is_digits(&dto.card_from_cvv, 3) {
        return Err(ValidationError::syntax("cardFromCVV must be 3 digits"));
    }
    check_expiry(&dto.card_from_valid_till)?;

    if dto.amount.value < 0 {
        return Err(ValidationError::syntax(
            "amount.value cannot be negative",
        ));
    }
    if dto.amount.currency != "RUB" {
        return Err(ValidationError::syntax(
            "amount.currency can only be RUB",
        ));
    }
    Ok(())
}

/// Validate a confirm request body.
pub fn validate_confirm(dto: &ConfirmDto) -> Result<(), ValidationError> {
    if dto.operation_id.trim().is_empty() {
        return Err(ValidationError::syntax("operationId cannot be blank"));
    }
    if dto.action.trim().is_empty() {
        return Err(ValidationError::syntax("action cannot be blank"));
    }
    Ok(())
}

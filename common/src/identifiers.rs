//! Identifier types for card2card ledger entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A primary account number: the 16-digit numeric card number that keys
/// the balance table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pan(String);

impl Pan {
    /// Create a new PAN. The value is taken as-is; use [`Pan::is_valid`]
    /// where format guarantees are needed.
    pub fn new(pan: impl Into<String>) -> Self {
        Self(pan.into())
    }

    /// Get the PAN as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate the PAN format: exactly 16 ASCII digits.
    pub fn is_valid(&self) -> bool {
        self.0.len() == 16 && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for Pan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Pan {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Pan {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier for a registered transaction, assigned at creation
/// and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Create a fresh operation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Time utilities for the card2card ledger.

use chrono::{DateTime, Utc};

/// A timestamp with timezone (always UTC).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

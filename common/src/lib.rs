//! card2card Common Types
//!
//! This crate contains shared types used across the card2card transfer
//! service, including identifiers, monetary types, the transaction record
//! and its status state machine, and the error taxonomy.

pub mod error;
pub mod identifiers;
pub mod monetary;
pub mod time;
pub mod transaction;

pub use error::*;
pub use identifiers::*;
pub use monetary::*;
pub use time::*;
pub use transaction::*;

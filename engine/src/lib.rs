//! card2card Transfer Engine
//!
//! Orchestrates the two-phase transfer lifecycle: register a pending
//! transfer, then commit or roll it back, enforcing that no account
//! balance can be driven negative under concurrent requests.

pub mod commission;
pub mod config;
pub mod transfer;

pub use commission::{CommissionCalculator, KIND_C2C};
pub use config::EngineConfig;
pub use transfer::{TransferEngine, TransferRequest};

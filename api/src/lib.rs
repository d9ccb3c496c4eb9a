//! card2card HTTP Boundary
//!
//! Translates HTTP requests into calls on the transfer engine and maps
//! its results and errors to responses. Field-syntax validation happens
//! here, before the engine is invoked; the engine only sees well-formed
//! input.

pub mod config;
pub mod dto;
pub mod routes;
pub mod validation;

pub use config::ApiConfig;
pub use routes::router;

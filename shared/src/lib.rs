//! Storefront Shared Library
//!
//! This crate contains the API types, validation rules and error taxonomy
//! shared by the backend and its clients.

pub mod errors;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use types::*;

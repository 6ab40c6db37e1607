//! Shared domain types for the forecast client.

mod types;

pub use types::*;

//! Shared domain rules for the Palletrack inventory system
//!
//! This crate contains the pure (storage-free) pieces of the domain:
//! bin location parsing and zone grouping, input sanitization rules, and
//! the status-message taxonomy surfaced to operators.

pub mod location;
pub mod status;
pub mod validation;

pub use location::*;
pub use status::*;
pub use validation::*;

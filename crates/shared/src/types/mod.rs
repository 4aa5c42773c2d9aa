//! Common types used across the application.

pub mod amount;
pub mod id;

pub use amount::{BALANCE_TOLERANCE, AmountParseError, parse_amount, within_tolerance};
pub use id::*;

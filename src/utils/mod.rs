//! Shared utilities: duration parsing, link units, validation.

pub mod duration;
pub mod units;
pub mod validation;

pub use duration::{format_seconds, parse_duration_to_seconds};
pub use units::{DataRate, Delay, UnitParseError};
pub use validation::{validate_distinct_subnets, validate_name, validate_unique_names};

//! IP address allocation and management module.
//!
//! This module handles IPv4 planning for the links and segments of a
//! scenario: sequential per-subnet host assignment and a registry of the
//! resulting addresses.

pub mod planner;
pub mod registry;

// Re-export commonly used types
pub use planner::{host_capacity, mask_prefix_len, AddressError, AddressPlanner};
pub use registry::AddressRegistry;

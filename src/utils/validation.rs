//! Configuration validation utilities.
//!
//! This module provides validation functions for configuration
//! parameters and consistency checks.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use crate::ip::planner::mask_prefix_len;

/// Validate that every subnet is well formed and no two of them overlap
///
/// Checks for:
/// - Valid dotted network addresses and a contiguous mask
/// - Host bits set in a network address
/// - Two subnets sharing any address
///
/// # Arguments
/// * `subnets` - `(owner, network)` pairs, in planning order
/// * `mask` - The dotted mask every subnet uses
///
/// # Returns
/// * `Ok(())` if validation succeeds
/// * `Err(String)` with an error message naming the offending owners
///
/// # Examples
/// ```
/// use ns3topo::utils::validation::validate_distinct_subnets;
///
/// let subnets = vec![
///     ("link0".to_string(), "10.1.1.0".to_string()),
///     ("lan1".to_string(), "10.1.2.0".to_string()),
/// ];
/// assert!(validate_distinct_subnets(&subnets, "255.255.255.0").is_ok());
///
/// let clash = vec![
///     ("link0".to_string(), "10.1.1.0".to_string()),
///     ("lan1".to_string(), "10.1.1.0".to_string()),
/// ];
/// assert!(validate_distinct_subnets(&clash, "255.255.255.0").is_err());
/// ```
pub fn validate_distinct_subnets(subnets: &[(String, String)], mask: &str) -> Result<(), String> {
    let (mask_addr, prefix_len) = mask_prefix_len(mask).map_err(|e| e.to_string())?;
    let mask_bits = u32::from(mask_addr);

    let mut parsed: Vec<(&str, u32)> = Vec::with_capacity(subnets.len());
    for (owner, network) in subnets {
        let addr: Ipv4Addr = network
            .trim()
            .parse()
            .map_err(|_| format!("Invalid subnet '{}' for '{}'", network, owner))?;
        let bits = u32::from(addr);
        if bits & !mask_bits != 0 {
            return Err(format!(
                "Subnet '{}' for '{}' has host bits set for a /{} mask",
                network, owner, prefix_len
            ));
        }
        if let Some((other, _)) = parsed.iter().find(|(_, b)| *b == bits) {
            return Err(format!(
                "Subnet {}/{} is assigned to both '{}' and '{}'",
                addr, prefix_len, other, owner
            ));
        }
        parsed.push((owner.as_str(), bits));
    }

    log::debug!("{} subnets validated as pairwise distinct", parsed.len());
    Ok(())
}

/// Validate a scenario or segment name
///
/// Names end up in C++ identifiers and file names, so they must be non-empty
/// and made of ASCII letters, digits, '-' and '_', starting with a letter.
pub fn validate_name(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err("Name cannot be empty".to_string()),
        Some(c) if !c.is_ascii_alphabetic() => {
            return Err(format!("Name '{}' must start with a letter", name));
        }
        _ => {}
    }
    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_')) {
        return Err(format!("Name '{}' contains invalid character '{}'", name, bad));
    }
    Ok(())
}

/// Validate that names are unique and none collides with a reserved name
pub fn validate_unique_names<'a>(
    names: impl IntoIterator<Item = &'a str>,
    reserved: &[&str],
) -> Result<(), String> {
    let mut seen = HashSet::new();
    for name in names {
        if reserved.contains(&name) {
            return Err(format!("Segment name '{}' is reserved", name));
        }
        if !seen.insert(name) {
            return Err(format!("Segment name '{}' is used more than once", name));
        }
    }
    Ok(())
}

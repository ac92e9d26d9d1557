//! Duration parsing utilities.
//!
//! This module provides utilities for parsing duration strings
//! (e.g., "31s", "500ms") into simulated seconds.

/// Parse duration string (e.g., "2ms", "1.5s", "30m") to seconds
///
/// Supports various duration formats:
/// - Raw seconds: "31", "0.5"
/// - Nanoseconds: "6560ns"
/// - Microseconds: "250us"
/// - Milliseconds: "500ms"
/// - Seconds: "31s", "31sec", "31secs", "31second", "31seconds"
/// - Minutes: "2m", "2min", "2mins", "2minute", "2minutes"
/// - Hours: "1h", "1hr", "1hrs", "1hour", "1hours"
///
/// # Arguments
/// * `duration` - The duration string to parse
///
/// # Returns
/// * `Ok(f64)` - The duration in seconds if parsing succeeds
/// * `Err(String)` - An error message if parsing fails
///
/// # Examples
/// ```
/// use ns3topo::utils::duration::parse_duration_to_seconds;
///
/// assert_eq!(parse_duration_to_seconds("31"), Ok(31.0));
/// assert_eq!(parse_duration_to_seconds("500ms"), Ok(0.5));
/// assert_eq!(parse_duration_to_seconds("2m"), Ok(120.0));
/// assert!(parse_duration_to_seconds("invalid").is_err());
/// ```
pub fn parse_duration_to_seconds(duration: &str) -> Result<f64, String> {
    let duration = duration.trim();
    let (number, unit) = duration.split_at(extract_number_part(duration).len());

    if number.is_empty() {
        return Err(format!("Invalid duration format: {}", duration));
    }
    let value: f64 = number
        .parse()
        .map_err(|_| format!("Invalid duration format: {}", duration))?;

    // Suffixes are matched as whole words, so "ms" never reads as "m"
    let seconds = match unit.trim() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => value,
        "ns" => value / 1e9,
        "us" => value / 1e6,
        "ms" => value / 1e3,
        "m" | "min" | "mins" | "minute" | "minutes" => value * 60.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => value * 3600.0,
        _ => return Err(format!("Invalid duration format: {}", duration)),
    };

    Ok(seconds)
}

/// Extract the numeric part from a duration string: leading digits and at most one dot
fn extract_number_part(duration: &str) -> &str {
    let mut seen_dot = false;
    for (i, c) in duration.char_indices() {
        if c == '.' && !seen_dot {
            seen_dot = true;
            continue;
        }
        if !c.is_ascii_digit() {
            return &duration[0..i];
        }
    }
    duration // If all characters are digits
}

/// Format seconds the way ns-3's `Seconds(...)` literal expects, always with a decimal point
pub fn format_seconds(seconds: f64) -> String {
    if seconds.fract() == 0.0 {
        format!("{:.1}", seconds)
    } else {
        format!("{}", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_seconds() {
        // Raw seconds
        assert_eq!(parse_duration_to_seconds("31"), Ok(31.0));
        assert_eq!(parse_duration_to_seconds("0"), Ok(0.0));
        assert_eq!(parse_duration_to_seconds("1.5"), Ok(1.5));

        // Second formats
        assert_eq!(parse_duration_to_seconds("31s"), Ok(31.0));
        assert_eq!(parse_duration_to_seconds("31sec"), Ok(31.0));
        assert_eq!(parse_duration_to_seconds("31seconds"), Ok(31.0));
        assert_eq!(parse_duration_to_seconds("2.0s"), Ok(2.0));

        // Sub-second formats
        assert_eq!(parse_duration_to_seconds("500ms"), Ok(0.5));
        assert_eq!(parse_duration_to_seconds("250us"), Ok(0.00025));
        assert_eq!(parse_duration_to_seconds("6560ns"), Ok(6.56e-6));

        // Minute and hour formats
        assert_eq!(parse_duration_to_seconds("2m"), Ok(120.0));
        assert_eq!(parse_duration_to_seconds("2min"), Ok(120.0));
        assert_eq!(parse_duration_to_seconds("1h"), Ok(3600.0));
        assert_eq!(parse_duration_to_seconds("1hours"), Ok(3600.0));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration_to_seconds("").is_err());
        assert!(parse_duration_to_seconds("invalid").is_err());
        assert!(parse_duration_to_seconds("5x").is_err());
        assert!(parse_duration_to_seconds("5minutesx").is_err());
        assert!(parse_duration_to_seconds("1.2.3s").is_err());
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(31.0), "31.0");
        assert_eq!(format_seconds(0.0), "0.0");
        assert_eq!(format_seconds(1.5), "1.5");
    }
}

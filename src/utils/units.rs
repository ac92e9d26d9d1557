//! Link parameter units.
//!
//! Data rates and propagation delays are written in configuration files the
//! way ns-3 attribute strings are written ("5Mbps", "2ms", "6560ns"). This
//! module validates them and normalises them to integers so the rendered
//! program always carries a well-formed attribute value.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// Error parsing a data rate or delay string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitParseError {
    #[error("invalid data rate '{0}' (expected e.g. \"5Mbps\")")]
    DataRate(String),
    #[error("invalid delay '{0}' (expected e.g. \"2ms\")")]
    Delay(String),
}

fn data_rate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+(?:\.\d+)?)\s*(bps|b/s|kbps|Kbps|kb/s|Mbps|Mb/s|Gbps|Gb/s)$")
            .expect("data rate pattern is valid")
    })
}

fn delay_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+(?:\.\d+)?)\s*(ns|us|ms|s)$").expect("delay pattern is valid")
    })
}

/// Split a matched value into its numeric part and unit suffix.
fn captures<'a>(re: &Regex, s: &'a str) -> Option<(f64, &'a str)> {
    let caps = re.captures(s)?;
    let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let unit = caps.get(2)?.as_str();
    Some((value, unit))
}

/// A link data rate in bits per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataRate(u64);

impl DataRate {
    pub fn from_bps(bps: u64) -> Self {
        DataRate(bps)
    }

    pub fn bps(&self) -> u64 {
        self.0
    }

    pub fn parse(s: &str) -> Result<Self, UnitParseError> {
        let s = s.trim();
        let (value, unit) =
            captures(data_rate_regex(), s).ok_or_else(|| UnitParseError::DataRate(s.to_string()))?;
        let multiplier = match unit {
            "bps" | "b/s" => 1.0,
            "kbps" | "Kbps" | "kb/s" => 1e3,
            "Mbps" | "Mb/s" => 1e6,
            "Gbps" | "Gb/s" => 1e9,
            _ => return Err(UnitParseError::DataRate(s.to_string())),
        };
        let bps = (value * multiplier).round();
        if bps < 1.0 {
            return Err(UnitParseError::DataRate(s.to_string()));
        }
        Ok(DataRate(bps as u64))
    }
}

impl fmt::Display for DataRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bps = self.0;
        if bps % 1_000_000_000 == 0 {
            write!(f, "{}Gbps", bps / 1_000_000_000)
        } else if bps % 1_000_000 == 0 {
            write!(f, "{}Mbps", bps / 1_000_000)
        } else if bps % 1_000 == 0 {
            write!(f, "{}kbps", bps / 1_000)
        } else {
            write!(f, "{}bps", bps)
        }
    }
}

/// A propagation delay in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Delay(u64);

impl Delay {
    pub fn from_nanos(nanos: u64) -> Self {
        Delay(nanos)
    }

    pub fn nanos(&self) -> u64 {
        self.0
    }

    pub fn parse(s: &str) -> Result<Self, UnitParseError> {
        let s = s.trim();
        let (value, unit) =
            captures(delay_regex(), s).ok_or_else(|| UnitParseError::Delay(s.to_string()))?;
        let multiplier = match unit {
            "ns" => 1.0,
            "us" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            _ => return Err(UnitParseError::Delay(s.to_string())),
        };
        Ok(Delay((value * multiplier).round() as u64))
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = self.0;
        if ns != 0 && ns % 1_000_000_000 == 0 {
            write!(f, "{}s", ns / 1_000_000_000)
        } else if ns != 0 && ns % 1_000_000 == 0 {
            write!(f, "{}ms", ns / 1_000_000)
        } else if ns != 0 && ns % 1_000 == 0 {
            write!(f, "{}us", ns / 1_000)
        } else {
            write!(f, "{}ns", ns)
        }
    }
}

// Both units round-trip through configuration files as their ns-3 strings.

impl Serialize for DataRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DataRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DataRate::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Delay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Delay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Delay::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_rate() {
        assert_eq!(DataRate::parse("5Mbps").unwrap().bps(), 5_000_000);
        assert_eq!(DataRate::parse("100Mbps").unwrap().bps(), 100_000_000);
        assert_eq!(DataRate::parse("1Gbps").unwrap().bps(), 1_000_000_000);
        assert_eq!(DataRate::parse("64 kbps").unwrap().bps(), 64_000);
        assert_eq!(DataRate::parse("1.5Mbps").unwrap().bps(), 1_500_000);
        assert_eq!(DataRate::parse("9600bps").unwrap().bps(), 9_600);
    }

    #[test]
    fn test_parse_data_rate_invalid() {
        assert!(DataRate::parse("").is_err());
        assert!(DataRate::parse("fast").is_err());
        assert!(DataRate::parse("5MB").is_err());
        assert!(DataRate::parse("0bps").is_err());
        assert!(DataRate::parse("-5Mbps").is_err());
    }

    #[test]
    fn test_data_rate_display_uses_largest_exact_unit() {
        assert_eq!(DataRate::from_bps(5_000_000).to_string(), "5Mbps");
        assert_eq!(DataRate::from_bps(1_500_000).to_string(), "1500kbps");
        assert_eq!(DataRate::from_bps(2_000_000_000).to_string(), "2Gbps");
        assert_eq!(DataRate::from_bps(9_600).to_string(), "9600bps");
    }

    #[test]
    fn test_parse_delay() {
        assert_eq!(Delay::parse("2ms").unwrap().nanos(), 2_000_000);
        assert_eq!(Delay::parse("6560ns").unwrap().nanos(), 6_560);
        assert_eq!(Delay::parse("0.5ms").unwrap().nanos(), 500_000);
        assert_eq!(Delay::parse("1s").unwrap().nanos(), 1_000_000_000);
        assert!(Delay::parse("2 minutes").is_err());
        assert!(Delay::parse("ms").is_err());
    }

    #[test]
    fn test_delay_display() {
        assert_eq!(Delay::from_nanos(2_000_000).to_string(), "2ms");
        assert_eq!(Delay::from_nanos(6_560).to_string(), "6560ns");
        assert_eq!(Delay::from_nanos(0).to_string(), "0ns");
        assert_eq!(Delay::from_nanos(250_000).to_string(), "250us");
    }

    #[test]
    fn test_units_in_yaml() {
        #[derive(Serialize, Deserialize)]
        struct Link {
            data_rate: DataRate,
            delay: Delay,
        }

        let link: Link = serde_yaml::from_str("data_rate: \"5Mbps\"\ndelay: \"2ms\"\n").unwrap();
        assert_eq!(link.data_rate.bps(), 5_000_000);
        assert_eq!(link.delay.nanos(), 2_000_000);

        let bad: Result<Link, _> = serde_yaml::from_str("data_rate: \"fast\"\ndelay: \"2ms\"\n");
        assert!(bad.is_err());
    }
}

//! Chat detail level
//!
//! A 1-5 knob controlling how verbose the assistant's answers are. Any input
//! is accepted and snapped to a valid level.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Verbosity requested from the assistant, always within `1..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DetailLevel(u8);

impl DetailLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const DEFAULT: u8 = 3;

    /// Level from any integer, clamped into range
    pub fn new(level: i64) -> Self {
        Self(level.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    /// Round, then clamp; NaN gives the default
    ///
    /// # Examples
    ///
    /// ```
    /// use wellscope::chat::DetailLevel;
    ///
    /// assert_eq!(DetailLevel::from_f64(0.0).get(), 1);
    /// assert_eq!(DetailLevel::from_f64(7.0).get(), 5);
    /// assert_eq!(DetailLevel::from_f64(3.6).get(), 4);
    /// ```
    pub fn from_f64(raw: f64) -> Self {
        if raw.is_nan() {
            return Self::default();
        }
        let rounded = raw.round().clamp(Self::MIN as f64, Self::MAX as f64);
        Self(rounded as u8)
    }

    /// Parse user input; anything non-numeric gives the default
    ///
    /// # Examples
    ///
    /// ```
    /// use wellscope::chat::DetailLevel;
    ///
    /// assert_eq!(DetailLevel::parse_str("abc").get(), 3);
    /// assert_eq!(DetailLevel::parse_str(" 2 ").get(), 2);
    /// ```
    pub fn parse_str(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) => Self::from_f64(value),
            Err(_) => Self::default(),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for DetailLevel {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for DetailLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64().map(Self::from_f64).unwrap_or_default(),
            Value::String(s) => Self::parse_str(&s),
            _ => Self::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snaps_inputs_to_valid_levels() {
        assert_eq!(DetailLevel::parse_str("0").get(), 1);
        assert_eq!(DetailLevel::parse_str("7").get(), 5);
        assert_eq!(DetailLevel::parse_str("abc").get(), 3);
        assert_eq!(DetailLevel::parse_str("3.6").get(), 4);
    }

    #[test]
    fn test_non_finite_inputs() {
        assert_eq!(DetailLevel::from_f64(f64::NAN).get(), 3);
        assert_eq!(DetailLevel::from_f64(f64::INFINITY).get(), 5);
        assert_eq!(DetailLevel::from_f64(f64::NEG_INFINITY).get(), 1);
        assert_eq!(DetailLevel::parse_str("").get(), 3);
    }

    #[test]
    fn test_new_clamps() {
        assert_eq!(DetailLevel::new(-4).get(), 1);
        assert_eq!(DetailLevel::new(400).get(), 5);
    }

    #[test]
    fn test_lenient_deserialize() {
        let level: DetailLevel = serde_json::from_value(json!(4.4)).unwrap();
        assert_eq!(level.get(), 4);
        let level: DetailLevel = serde_json::from_value(json!("9")).unwrap();
        assert_eq!(level.get(), 5);
        let level: DetailLevel = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(level.get(), 3);
        assert_eq!(serde_json::to_value(DetailLevel::new(2)).unwrap(), json!(2));
    }
}

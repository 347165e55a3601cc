use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;

/// World seed.
///
/// Displays as two groups of upper-case hex, `1A2B-3C4D`, and parses either
/// that form or a plain decimal integer (negative values wrap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerrainSeed(pub u32);

impl TerrainSeed {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Fresh seed from the thread-local entropy source
    pub fn random() -> Self {
        Self(rand::thread_rng().gen())
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for TerrainSeed {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for TerrainSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}-{:04X}", self.0 >> 16, self.0 & 0xFFFF)
    }
}

impl FromStr for TerrainSeed {
    type Err = TerrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = || TerrainError::InvalidSeed {
            input: s.to_string(),
        };

        if let Some((high, low)) = input.split_once('-').filter(|(high, _)| !high.is_empty()) {
            if high.len() > 4 || low.len() > 4 || low.is_empty() {
                return Err(invalid());
            }
            let high = u32::from_str_radix(high, 16).map_err(|_| invalid())?;
            let low = u32::from_str_radix(low, 16).map_err(|_| invalid())?;
            return Ok(Self((high << 16) | low));
        }

        let value: i64 = input.parse().map_err(|_| invalid())?;
        if value < i64::from(i32::MIN) || value > i64::from(u32::MAX) {
            return Err(invalid());
        }
        Ok(Self(value as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips() {
        let seed = TerrainSeed(0x1A2B_3C4D);
        assert_eq!(seed.to_string(), "1A2B-3C4D");
        assert_eq!("1A2B-3C4D".parse::<TerrainSeed>().unwrap(), seed);
        assert_eq!("1a2b-3c4d".parse::<TerrainSeed>().unwrap(), seed);
        assert_eq!(TerrainSeed(42).to_string(), "0000-002A");
    }

    #[test]
    fn test_decimal_forms() {
        assert_eq!("42".parse::<TerrainSeed>().unwrap(), TerrainSeed(42));
        assert_eq!(" 7 ".parse::<TerrainSeed>().unwrap(), TerrainSeed(7));
        assert_eq!("-1".parse::<TerrainSeed>().unwrap(), TerrainSeed(u32::MAX));
    }

    #[test]
    fn test_rejects_garbage() {
        for input in ["", "hello", "12345-1", "1-", "99999999999", "ZZZZ-0000"] {
            assert!(input.parse::<TerrainSeed>().is_err(), "{}", input);
        }
    }
}

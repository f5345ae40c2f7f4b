//! Ordinal damage scale used by Alpha Strike damage brackets.
//!
//! Damage values live on a discrete ladder `9 8 7 6 5 4 3 2 1 0* 0` rather
//! than a continuous number line, matching tabletop rounding rules. `0*`
//! means "reduced to zero but still minimally armed"; a bracket printed as
//! `-` (or left blank) has no value at all and is a fixed point for every
//! reduction.
//!
//! # Example
//!
//! ```
//! use muster_core::ladder::DamageValue;
//!
//! let v: DamageValue = "3".parse().unwrap();
//! assert_eq!(v.reduce(1).to_string(), "2");
//! assert_eq!(v.reduce(3).to_string(), "0*");
//! assert_eq!(v.reduce(4).to_string(), "0");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One value on the ordinal damage ladder.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DamageValue {
    /// No damage capability in this bracket (`-` or blank on the card).
    Absent,
    /// Plain numeric value; `Value(0)` is the ladder floor.
    Value(u8),
    /// Reduced to zero by hits but still minimally armed (`0*`).
    ZeroStar,
}

impl DamageValue {
    /// Position on the ladder, counting up from the floor.
    ///
    /// `0` is the floor (`Value(0)`), `1` is `0*`, and `Value(n)` sits at
    /// `n + 1`. `Absent` has no position.
    #[must_use]
    pub const fn rank(self) -> Option<u8> {
        match self {
            Self::Absent => None,
            Self::Value(0) => Some(0),
            Self::ZeroStar => Some(1),
            Self::Value(n) => Some(n.saturating_add(1)),
        }
    }

    /// Returns `true` if this value can still be reduced by a weapon hit.
    #[must_use]
    pub fn above_floor(self) -> bool {
        matches!(self.rank(), Some(r) if r > 0)
    }

    /// Steps one rung down the ladder (a weapon critical hit).
    ///
    /// `Absent` and the floor are fixed points.
    #[must_use]
    pub const fn step_down(self) -> Self {
        match self {
            Self::Absent => Self::Absent,
            Self::Value(0) => Self::Value(0),
            Self::Value(1) => Self::ZeroStar,
            Self::Value(n) => Self::Value(n - 1),
            Self::ZeroStar => Self::Value(0),
        }
    }

    /// Halves the current numeric value, flooring, collapsing `0*` to `0`
    /// (a vehicle engine critical hit).
    #[must_use]
    pub const fn halve(self) -> Self {
        match self {
            Self::Absent => Self::Absent,
            Self::Value(n) => Self::Value(n / 2),
            Self::ZeroStar => Self::Value(0),
        }
    }

    /// Applies `hits` downward steps.
    #[must_use]
    pub fn reduce(self, hits: u8) -> Self {
        let mut value = self;
        for _ in 0..hits {
            if !value.above_floor() {
                break;
            }
            value = value.step_down();
        }
        value
    }
}

impl fmt::Display for DamageValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "-"),
            Self::Value(n) => write!(f, "{n}"),
            Self::ZeroStar => write!(f, "0*"),
        }
    }
}

impl FromStr for DamageValue {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "-" => Ok(Self::Absent),
            "0*" => Ok(Self::ZeroStar),
            n => n.parse::<u8>().map(Self::Value).map_err(|_| ()),
        }
    }
}

impl Serialize for DamageValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DamageValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Malformed values degrade to Absent rather than failing the load.
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(Self::Absent))
    }
}

impl Default for DamageValue {
    fn default() -> Self {
        Self::Absent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parsing_tests {
        use super::*;

        #[test]
        fn parses_card_notation() {
            assert_eq!("4".parse::<DamageValue>(), Ok(DamageValue::Value(4)));
            assert_eq!("0*".parse::<DamageValue>(), Ok(DamageValue::ZeroStar));
            assert_eq!("-".parse::<DamageValue>(), Ok(DamageValue::Absent));
            assert_eq!("".parse::<DamageValue>(), Ok(DamageValue::Absent));
        }

        #[test]
        fn rejects_garbage() {
            assert!("x".parse::<DamageValue>().is_err());
        }

        #[test]
        fn display_round_trips() {
            for v in [
                DamageValue::Absent,
                DamageValue::Value(0),
                DamageValue::Value(7),
                DamageValue::ZeroStar,
            ] {
                assert_eq!(v.to_string().parse::<DamageValue>(), Ok(v));
            }
        }

        #[test]
        fn serde_degrades_malformed_to_absent() {
            let v: DamageValue = serde_json::from_str("\"bogus\"").unwrap();
            assert_eq!(v, DamageValue::Absent);
        }
    }

    mod reduction_tests {
        use super::*;

        #[test]
        fn steps_follow_the_ladder() {
            let v = DamageValue::Value(3);
            assert_eq!(v.reduce(1), DamageValue::Value(2));
            assert_eq!(v.reduce(3), DamageValue::ZeroStar);
            assert_eq!(v.reduce(4), DamageValue::Value(0));
            assert_eq!(v.reduce(10), DamageValue::Value(0));
        }

        #[test]
        fn absent_is_a_fixed_point() {
            assert_eq!(DamageValue::Absent.reduce(5), DamageValue::Absent);
            assert_eq!(DamageValue::Absent.halve(), DamageValue::Absent);
        }

        #[test]
        fn halve_floors_and_collapses_star() {
            assert_eq!(DamageValue::Value(5).halve(), DamageValue::Value(2));
            assert_eq!(DamageValue::Value(1).halve(), DamageValue::Value(0));
            assert_eq!(DamageValue::ZeroStar.halve(), DamageValue::Value(0));
        }

        #[test]
        fn reduction_is_monotonic_in_hits() {
            let base = DamageValue::Value(9);
            let mut previous = base.rank().unwrap();
            for hits in 0..=10 {
                let rank = base.reduce(hits).rank().unwrap();
                assert!(rank <= previous, "rank rose at {hits} hits");
                previous = rank;
            }
        }
    }
}

//! Two-phase (pending/committed) accounting primitives.
//!
//! Every mutable quantity a unit carries is tracked as a committed value
//! plus a pending delta. Mutating calls only ever touch the pending side;
//! a commit merges the delta in and zeroes it, and a discard throws the
//! delta away. A pending delta of `0` always means "no change".
//!
//! The numeric side lives in [`Tracked`]; [`damage::DamageLedger`] layers
//! the armor/structure/heat conservation rules on top, and
//! [`crits::CritLedger`] applies the same two-phase discipline to ordered
//! critical-hit records.

pub mod crits;
pub mod damage;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A committed integer plus its pending delta.
///
/// Serializes as the `[committed, pendingDelta]` pair used by persisted
/// unit-state records; legacy records that stored a bare number
/// deserialize as `[value, 0]`.
///
/// # Example
///
/// ```
/// use muster_core::ledger::Tracked;
///
/// let mut heat = Tracked::new(1);
/// heat.set_pending(2);
/// assert_eq!(heat.effective(), 3);
/// heat.commit_clamped(0, 4);
/// assert_eq!(heat.committed(), 3);
/// assert_eq!(heat.pending(), 0);
/// ```
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Tracked {
    committed: i32,
    pending: i32,
}

impl Tracked {
    /// Creates a tracked value with no pending delta.
    #[must_use]
    pub const fn new(committed: i32) -> Self {
        Self {
            committed,
            pending: 0,
        }
    }

    /// Creates a tracked value from a committed/pending pair.
    #[must_use]
    pub const fn with_pending(committed: i32, pending: i32) -> Self {
        Self { committed, pending }
    }

    /// The committed value.
    #[must_use]
    pub const fn committed(self) -> i32 {
        self.committed
    }

    /// The pending delta. `0` means no change.
    #[must_use]
    pub const fn pending(self) -> i32 {
        self.pending
    }

    /// Committed value with the pending delta applied.
    #[must_use]
    pub const fn effective(self) -> i32 {
        self.committed + self.pending
    }

    /// Replaces the pending delta.
    pub fn set_pending(&mut self, delta: i32) {
        self.pending = delta;
    }

    /// Merges the pending delta into the committed value, clamping the
    /// result into `[min, max]`, and zeroes the delta.
    pub fn commit_clamped(&mut self, min: i32, max: i32) {
        self.committed = self.effective().clamp(min, max);
        self.pending = 0;
    }

    /// Drops the pending delta without merging.
    pub fn clear_pending(&mut self) {
        self.pending = 0;
    }

    /// Returns `true` if a nonzero delta is staged.
    #[must_use]
    pub const fn has_pending(self) -> bool {
        self.pending != 0
    }
}

impl Serialize for Tracked {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.committed, self.pending).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Tracked {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Pair(i32, i32),
            // Legacy records stored a bare committed value.
            Scalar(i32),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Pair(committed, pending) => Self { committed, pending },
            Repr::Scalar(committed) => Self::new(committed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_merges_and_clamps() {
        let mut t = Tracked::new(3);
        t.set_pending(5);
        t.commit_clamped(0, 6);
        assert_eq!(t, Tracked::new(6));
    }

    #[test]
    fn commit_of_zero_delta_is_a_no_op() {
        let mut t = Tracked::new(3);
        t.commit_clamped(0, 10);
        assert_eq!(t, Tracked::new(3));
    }

    #[test]
    fn clear_pending_reverts() {
        let mut t = Tracked::new(2);
        t.set_pending(-2);
        t.clear_pending();
        assert_eq!(t.effective(), 2);
    }

    #[test]
    fn serializes_as_pair() {
        let t = Tracked::with_pending(4, -1);
        assert_eq!(serde_json::to_string(&t).unwrap(), "[4,-1]");
    }

    #[test]
    fn deserializes_pair_and_legacy_scalar() {
        let pair: Tracked = serde_json::from_str("[4,-1]").unwrap();
        assert_eq!(pair, Tracked::with_pending(4, -1));

        let scalar: Tracked = serde_json::from_str("7").unwrap();
        assert_eq!(scalar, Tracked::new(7));
    }
}

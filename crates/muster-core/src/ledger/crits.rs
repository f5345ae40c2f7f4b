//! Ordered critical-hit records with a pending overlay.
//!
//! Each record is a `{key, seq}` pair. The sign of `seq` distinguishes a
//! staged damage record (positive) from a staged heal (negative); the
//! magnitude totally orders records of any key. Magnitudes come from a
//! per-ledger monotonic counter, never wall-clock time, so two records can
//! never collide.
//!
//! Ordering is semantically load-bearing: several derived effects walk the
//! committed list in `|seq|` order and are non-commutative (see the
//! `resolver` module).

use std::collections::BTreeMap;
use std::fmt;

use crate::template::{FiringArc, WeaponColumn};

/// Identity of a critical-hit category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CritKey {
    /// Engine hit.
    Engine,
    /// Fire-control hit.
    FireControl,
    /// Movement-point hit (non-vehicle ground units).
    Mp,
    /// Weapon hit against the main damage line.
    Weapon,
    /// Minor motive damage (vehicles): -2" movement.
    Motive1,
    /// Major motive damage (vehicles): halve movement.
    Motive2,
    /// Crippling motive damage (vehicles): immobilized.
    Motive3,
    /// Thruster hit (aerospace): -1 thrust.
    Thruster,
    /// Crew or cockpit hit.
    Crew,
    /// Arc-scoped weapon hit (large vessels).
    Arc {
        /// Firing arc rolled for the hit.
        arc: FiringArc,
        /// Weapon column rolled for the hit.
        column: WeaponColumn,
    },
}

impl CritKey {
    /// Parses the stable wire form produced by [`fmt::Display`].
    ///
    /// Unknown keys yield `None`; callers treat them as silent no-ops.
    #[must_use]
    pub fn from_wire(wire: &str) -> Option<Self> {
        match wire {
            "engine" => Some(Self::Engine),
            "fc" => Some(Self::FireControl),
            "mp" => Some(Self::Mp),
            "weap" => Some(Self::Weapon),
            "motive1" => Some(Self::Motive1),
            "motive2" => Some(Self::Motive2),
            "motive3" => Some(Self::Motive3),
            "thruster" => Some(Self::Thruster),
            "crew" => Some(Self::Crew),
            other => {
                let mut parts = other.splitn(3, ':');
                if parts.next() != Some("arc") {
                    return None;
                }
                let arc = FiringArc::from_code(parts.next()?)?;
                let column = WeaponColumn::from_code(parts.next()?)?;
                Some(Self::Arc { arc, column })
            }
        }
    }

    /// Keys that reduce movement, gated on some movement mode remaining.
    #[must_use]
    pub const fn affects_movement(self) -> bool {
        matches!(
            self,
            Self::Mp | Self::Motive1 | Self::Motive2 | Self::Motive3
        )
    }
}

impl fmt::Display for CritKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine => write!(f, "engine"),
            Self::FireControl => write!(f, "fc"),
            Self::Mp => write!(f, "mp"),
            Self::Weapon => write!(f, "weap"),
            Self::Motive1 => write!(f, "motive1"),
            Self::Motive2 => write!(f, "motive2"),
            Self::Motive3 => write!(f, "motive3"),
            Self::Thruster => write!(f, "thruster"),
            Self::Crew => write!(f, "crew"),
            Self::Arc { arc, column } => write!(f, "arc:{}:{}", arc.code(), column.code()),
        }
    }
}

/// One critical-hit record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CritRecord {
    /// Category of the hit.
    pub key: CritKey,
    /// Signed sequence number. Positive = damage, negative = staged heal;
    /// `|seq|` gives the total order.
    pub seq: i64,
}

impl CritRecord {
    /// Returns `true` for a staged heal record.
    #[must_use]
    pub const fn is_heal(self) -> bool {
        self.seq < 0
    }

    /// Magnitude used for total ordering.
    #[must_use]
    pub const fn order(self) -> u64 {
        self.seq.unsigned_abs()
    }
}

/// Committed critical-hit records plus the pending overlay.
#[derive(Debug, Clone, Default)]
pub struct CritLedger {
    /// Committed records, ascending by `|seq|`.
    committed: Vec<CritRecord>,
    /// Staged records, ascending by `|seq|`.
    pending: Vec<CritRecord>,
    /// Next sequence magnitude to hand out. Monotonic, never reused.
    next_seq: i64,
}

impl PartialEq for CritLedger {
    fn eq(&self, other: &Self) -> bool {
        // The counter only has to stay above every live magnitude; a
        // restored ledger resumes at max+1 and is still the same state.
        self.committed == other.committed && self.pending == other.pending
    }
}

impl Eq for CritLedger {}

impl CritLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            committed: Vec::new(),
            pending: Vec::new(),
            next_seq: 1,
        }
    }

    /// Rebuilds a ledger from persisted records.
    ///
    /// Records are re-sorted by `|seq|` and the sequence counter resumes
    /// above the largest magnitude seen, keeping future records
    /// collision-free.
    #[must_use]
    pub fn restore(mut committed: Vec<CritRecord>, mut pending: Vec<CritRecord>) -> Self {
        committed.sort_by_key(|r| r.order());
        pending.sort_by_key(|r| r.order());
        let top = committed
            .iter()
            .chain(&pending)
            .map(|r| r.order())
            .max()
            .unwrap_or(0);
        Self {
            committed,
            pending,
            next_seq: i64::try_from(top).unwrap_or(i64::MAX - 1) + 1,
        }
    }

    fn alloc(&mut self) -> i64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Replaces the staged records for `key`.
    ///
    /// `delta > 0` stages that many damage records with ascending positive
    /// sequences; `delta < 0` stages `|delta|` heals with descending
    /// negative sequences; `delta == 0` just clears the key's staging.
    /// Existing pending records for other keys are untouched.
    pub fn set_pending(&mut self, key: CritKey, delta: i32) {
        self.pending.retain(|r| r.key != key);
        if delta > 0 {
            for _ in 0..delta {
                let seq = self.alloc();
                self.pending.push(CritRecord { key, seq });
            }
        } else {
            for _ in 0..delta.unsigned_abs() {
                let seq = -self.alloc();
                self.pending.push(CritRecord { key, seq });
            }
        }
        self.pending.sort_by_key(|r| r.order());
    }

    /// Net staged change for `key`: +1 per damage record, -1 per heal.
    #[must_use]
    pub fn pending_change(&self, key: CritKey) -> i32 {
        self.pending
            .iter()
            .filter(|r| r.key == key)
            .map(|r| if r.is_heal() { -1 } else { 1 })
            .sum()
    }

    /// Count of committed records for `key`.
    #[must_use]
    pub fn committed_hits(&self, key: CritKey) -> u32 {
        u32::try_from(self.committed.iter().filter(|r| r.key == key).count()).unwrap_or(u32::MAX)
    }

    /// Committed records in ascending `|seq|` order.
    #[must_use]
    pub fn committed_ordered(&self) -> &[CritRecord] {
        &self.committed
    }

    /// Staged records in ascending `|seq|` order.
    #[must_use]
    pub fn pending_records(&self) -> &[CritRecord] {
        &self.pending
    }

    /// Returns `true` if any records are staged.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Merges the overlay into committed state.
    ///
    /// For each key with `h` staged heals, the `h` oldest committed
    /// records of that key are evicted first (earliest sustained hit
    /// repaired first); staged damage records are then appended. Appended
    /// magnitudes always exceed every committed magnitude, so the
    /// committed list stays sorted.
    pub fn commit(&mut self) {
        let mut heals: BTreeMap<CritKey, u32> = BTreeMap::new();
        let mut damage: Vec<CritRecord> = Vec::new();
        for record in self.pending.drain(..) {
            if record.is_heal() {
                *heals.entry(record.key).or_insert(0) += 1;
            } else {
                damage.push(record);
            }
        }

        for (key, mut remaining) in heals {
            self.committed.retain(|r| {
                if remaining > 0 && r.key == key {
                    remaining -= 1;
                    false
                } else {
                    true
                }
            });
        }

        damage.sort_by_key(|r| r.order());
        self.committed.extend(damage);
    }

    /// Drops all staged records. The sequence counter is not rolled back.
    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }

    /// Clears everything back to pristine.
    pub fn reset(&mut self) {
        self.committed.clear();
        self.pending.clear();
        self.next_seq = 1;
    }
}

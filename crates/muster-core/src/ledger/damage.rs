//! Armor, structure, and heat accounting with conservation clamps.
//!
//! Armor and structure are damage counters: they start at 0 and rise
//! toward the template maxima. A staged damage total fills remaining
//! armor first and overflows into structure; a staged heal drains
//! structure first and then armor. The total is clamped at the boundary
//! so no sequence of calls can push either counter out of range.
//!
//! Limited-use abilities ride along: consumed-use counters and the
//! exhausted set follow the same pending/commit discipline.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::Tracked;

/// Top of the heat scale. Committed heat lives in `0..=HEAT_SCALE_MAX`.
pub const HEAT_SCALE_MAX: i32 = 4;

/// Two-phase armor/structure/heat ledger for one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DamageLedger {
    max_armor: i32,
    max_structure: i32,
    armor: Tracked,
    structure: Tracked,
    heat: Tracked,
    consumed: BTreeMap<String, Tracked>,
    exhausted: BTreeSet<String>,
    pending_exhaust: BTreeSet<String>,
    pending_restore: BTreeSet<String>,
}

impl DamageLedger {
    /// Creates a pristine ledger for a unit with the given maxima.
    #[must_use]
    pub fn new(max_armor: u16, max_structure: u16) -> Self {
        Self {
            max_armor: i32::from(max_armor),
            max_structure: i32::from(max_structure),
            ..Self::default()
        }
    }

    /// Armor damage counter.
    #[must_use]
    pub const fn armor(&self) -> Tracked {
        self.armor
    }

    /// Structure damage counter.
    #[must_use]
    pub const fn structure(&self) -> Tracked {
        self.structure
    }

    /// Heat level.
    #[must_use]
    pub const fn heat(&self) -> Tracked {
        self.heat
    }

    /// Armor maximum.
    #[must_use]
    pub const fn max_armor(&self) -> i32 {
        self.max_armor
    }

    /// Structure maximum.
    #[must_use]
    pub const fn max_structure(&self) -> i32 {
        self.max_structure
    }

    /// Stages `total` points of damage (positive) or healing (negative).
    ///
    /// The total is clamped so that the effective counters stay within
    /// `0..=max`: it can never exceed the remaining armor+structure
    /// headroom, nor heal below the damage actually committed. Damage
    /// fills armor headroom first; healing drains structure first.
    pub fn set_pending_damage(&mut self, total: i32) {
        let headroom =
            (self.max_armor - self.armor.committed()) + (self.max_structure - self.structure.committed());
        let taken = self.armor.committed() + self.structure.committed();
        let total = total.clamp(-taken, headroom);

        if total >= 0 {
            let to_armor = total.min(self.max_armor - self.armor.committed());
            self.armor.set_pending(to_armor);
            self.structure.set_pending(total - to_armor);
        } else {
            let heal = -total;
            let from_structure = heal.min(self.structure.committed());
            self.structure.set_pending(-from_structure);
            self.armor.set_pending(-(heal - from_structure));
        }
    }

    /// Net staged damage across armor and structure.
    #[must_use]
    pub const fn pending_damage_total(&self) -> i32 {
        self.armor.pending() + self.structure.pending()
    }

    /// Stages a heat delta, clamped so the effective level stays on the
    /// `0..=4` scale.
    pub fn set_pending_heat(&mut self, delta: i32) {
        let delta = delta.clamp(
            -self.heat.committed(),
            HEAT_SCALE_MAX - self.heat.committed(),
        );
        self.heat.set_pending(delta);
    }

    /// Stages a delta to a limited-use ability counter. Unknown keys
    /// simply create a fresh counter.
    pub fn set_pending_consumed(&mut self, key: &str, delta: i32) {
        let entry = self.consumed.entry(key.to_owned()).or_insert_with(|| Tracked::new(0));
        entry.set_pending(delta.max(-entry.committed()));
    }

    /// Committed uses of a limited-use ability.
    #[must_use]
    pub fn consumed(&self, key: &str) -> i32 {
        self.consumed.get(key).map_or(0, |t| t.committed())
    }

    /// Staged delta for a limited-use ability.
    #[must_use]
    pub fn pending_consumed(&self, key: &str) -> i32 {
        self.consumed.get(key).map_or(0, |t| t.pending())
    }

    /// All consumed-use counters.
    #[must_use]
    pub const fn consumed_counters(&self) -> &BTreeMap<String, Tracked> {
        &self.consumed
    }

    /// Stages an ability as exhausted.
    pub fn exhaust(&mut self, key: &str) {
        self.pending_restore.remove(key);
        if !self.exhausted.contains(key) {
            self.pending_exhaust.insert(key.to_owned());
        }
    }

    /// Stages an exhausted ability for restoration.
    pub fn restore(&mut self, key: &str) {
        self.pending_exhaust.remove(key);
        if self.exhausted.contains(key) {
            self.pending_restore.insert(key.to_owned());
        }
    }

    /// Whether an ability reads as exhausted with the overlay applied.
    #[must_use]
    pub fn is_exhausted(&self, key: &str) -> bool {
        (self.exhausted.contains(key) || self.pending_exhaust.contains(key))
            && !self.pending_restore.contains(key)
    }

    /// Committed exhausted set and the two pending sets, for persistence.
    #[must_use]
    pub fn exhausted_sets(&self) -> (&BTreeSet<String>, &BTreeSet<String>, &BTreeSet<String>) {
        (&self.exhausted, &self.pending_exhaust, &self.pending_restore)
    }

    /// Restores persisted ability state wholesale.
    pub fn load_abilities(
        &mut self,
        consumed: BTreeMap<String, Tracked>,
        exhausted: BTreeSet<String>,
        pending_exhaust: BTreeSet<String>,
        pending_restore: BTreeSet<String>,
    ) {
        self.consumed = consumed;
        self.exhausted = exhausted;
        self.pending_exhaust = pending_exhaust;
        self.pending_restore = pending_restore;
    }

    /// Directly restores the three numeric counters from persisted state,
    /// clamping committed values into range.
    pub fn load_counters(&mut self, armor: Tracked, structure: Tracked, heat: Tracked) {
        self.armor = Tracked::with_pending(armor.committed().clamp(0, self.max_armor), armor.pending());
        self.structure = Tracked::with_pending(
            structure.committed().clamp(0, self.max_structure),
            structure.pending(),
        );
        self.heat = Tracked::with_pending(heat.committed().clamp(0, HEAT_SCALE_MAX), heat.pending());
    }

    /// Returns `true` if anything is staged.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.armor.has_pending()
            || self.structure.has_pending()
            || self.heat.has_pending()
            || self.consumed.values().any(|t| t.has_pending())
            || !self.pending_exhaust.is_empty()
            || !self.pending_restore.is_empty()
    }

    /// Merges the overlay into committed state and clears it.
    pub fn commit(&mut self) {
        if self.has_pending() {
            debug!(
                armor = self.armor.pending(),
                structure = self.structure.pending(),
                heat = self.heat.pending(),
                "committing damage ledger"
            );
        }
        self.armor.commit_clamped(0, self.max_armor);
        self.structure.commit_clamped(0, self.max_structure);
        self.heat.commit_clamped(0, HEAT_SCALE_MAX);
        for counter in self.consumed.values_mut() {
            counter.commit_clamped(0, i32::MAX);
        }
        self.exhausted.extend(self.pending_exhaust.iter().cloned());
        for key in &self.pending_restore {
            self.exhausted.remove(key);
        }
        self.pending_exhaust.clear();
        self.pending_restore.clear();
    }

    /// Drops the whole overlay without merging.
    pub fn discard_pending(&mut self) {
        self.armor.clear_pending();
        self.structure.clear_pending();
        self.heat.clear_pending();
        for counter in self.consumed.values_mut() {
            counter.clear_pending();
        }
        self.pending_exhaust.clear();
        self.pending_restore.clear();
    }

    /// Resets committed and pending state to pristine.
    pub fn reset(&mut self) {
        let (max_armor, max_structure) = (self.max_armor, self.max_structure);
        *self = Self::default();
        self.max_armor = max_armor;
        self.max_structure = max_structure;
    }
}

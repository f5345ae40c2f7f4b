//! Unit state containers and transaction control.
//!
//! A unit's mutable state is one of two closed variants behind
//! [`UnitState`]: the Alpha Strike form ([`AlphaStrikeState`]) built on
//! the numeric and critical-hit ledgers, or the Classic form
//! ([`ClassicState`](crate::classic::ClassicState)) built on location
//! slots and the piloting-risk accumulator. The variant is a tagged enum
//! with `as_*` accessors, not a trait object: the set is closed and the
//! dispatch sites want exhaustive matches.
//!
//! # Transactions
//!
//! Mutating calls only ever stage changes. `commit()` merges the overlay
//! and is the only place the cached `destroyed` flag is recomputed, so
//! the flag never fluctuates while a dialog previews pending edits.
//! `discard_pending()` reverts the overlay; `repair_all()` returns the
//! unit to pristine regardless of history.

use std::cell::RefCell;
use std::collections::BTreeMap;

use tracing::debug;

use crate::classic::ClassicState;
use crate::ladder::DamageValue;
use crate::ledger::crits::{CritKey, CritLedger};
use crate::ledger::damage::DamageLedger;
use crate::ledger::Tracked;
use crate::resolver::{self, Derived, StateView};
use crate::template::{DamageLine, MoveMode, RangeBracket, UnitTemplate};

#[derive(Debug, Clone)]
struct CachedDerived {
    version: u64,
    derived: Derived,
}

/// Alpha Strike unit state: committed snapshot plus pending overlay.
#[derive(Debug, Clone)]
pub struct AlphaStrikeState {
    template: UnitTemplate,
    damage: DamageLedger,
    crits: CritLedger,
    shutdown: bool,
    pending_shutdown: Option<bool>,
    destroyed: bool,
    version: u64,
    cache: RefCell<Option<CachedDerived>>,
}

impl PartialEq for AlphaStrikeState {
    fn eq(&self, other: &Self) -> bool {
        // The version counter and memo cache are identity-free bookkeeping.
        self.template == other.template
            && self.damage == other.damage
            && self.crits == other.crits
            && self.shutdown == other.shutdown
            && self.pending_shutdown == other.pending_shutdown
            && self.destroyed == other.destroyed
    }
}

impl AlphaStrikeState {
    /// Creates pristine state for a unit built from `template`.
    #[must_use]
    pub fn new(template: UnitTemplate) -> Self {
        let damage = DamageLedger::new(template.max_armor, template.max_structure);
        Self {
            template,
            damage,
            crits: CritLedger::new(),
            shutdown: false,
            pending_shutdown: None,
            destroyed: false,
            version: 0,
            cache: RefCell::new(None),
        }
    }

    pub(crate) fn restore_parts(
        template: UnitTemplate,
        damage: DamageLedger,
        crits: CritLedger,
        shutdown: bool,
        destroyed: bool,
    ) -> Self {
        Self {
            template,
            damage,
            crits,
            shutdown,
            pending_shutdown: None,
            destroyed,
            version: 0,
            cache: RefCell::new(None),
        }
    }

    /// The unit's immutable base card.
    #[must_use]
    pub const fn template(&self) -> &UnitTemplate {
        &self.template
    }

    pub(crate) const fn damage_ledger(&self) -> &DamageLedger {
        &self.damage
    }

    pub(crate) const fn crit_ledger(&self) -> &CritLedger {
        &self.crits
    }

    /// Armor damage counter.
    #[must_use]
    pub const fn armor(&self) -> Tracked {
        self.damage.armor()
    }

    /// Structure damage counter.
    #[must_use]
    pub const fn structure(&self) -> Tracked {
        self.damage.structure()
    }

    /// Heat level.
    #[must_use]
    pub const fn heat(&self) -> Tracked {
        self.damage.heat()
    }

    /// Committed shutdown flag.
    #[must_use]
    pub const fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// Whether the committed state deviates from pristine.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.damage.armor().committed() != 0
            || self.damage.structure().committed() != 0
            || self.damage.heat().committed() != 0
            || !self.crits.committed_ordered().is_empty()
            || self.damage.consumed_counters().values().any(|t| t.committed() != 0)
            || !self.damage.exhausted_sets().0.is_empty()
            || self.shutdown
            || self.destroyed
    }

    /// Monotonic state-version counter; bumps on every mutating call.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    fn view(&self) -> StateView<'_> {
        StateView {
            template: &self.template,
            heat: self.damage.heat().committed(),
            structure_damage: self.damage.structure().committed(),
            shutdown: self.shutdown,
            crits: &self.crits,
        }
    }

    fn derived(&self) -> Derived {
        if let Some(cached) = self.cache.borrow().as_ref() {
            if cached.version == self.version {
                return cached.derived.clone();
            }
        }
        let derived = resolver::derive(&self.view());
        *self.cache.borrow_mut() = Some(CachedDerived {
            version: self.version,
            derived: derived.clone(),
        });
        derived
    }

    // -------------------------------------------------------------------
    // Pending mutators
    // -------------------------------------------------------------------

    /// Stages a total damage (positive) or heal (negative) amount,
    /// clamped and split across armor and structure.
    pub fn set_pending_damage(&mut self, total: i32) {
        self.damage.set_pending_damage(total);
        self.touch();
    }

    /// Net staged damage across armor and structure.
    #[must_use]
    pub const fn pending_damage_total(&self) -> i32 {
        self.damage.pending_damage_total()
    }

    /// Stages a heat delta on the `0..=4` scale.
    pub fn set_pending_heat(&mut self, delta: i32) {
        self.damage.set_pending_heat(delta);
        self.touch();
    }

    /// Replaces the staged critical-hit records for `key`.
    pub fn set_pending_crits(&mut self, key: CritKey, delta: i32) {
        self.crits.set_pending(key, delta);
        self.touch();
    }

    /// Count of committed critical hits for `key`.
    #[must_use]
    pub fn committed_crit_hits(&self, key: CritKey) -> u32 {
        self.crits.committed_hits(key)
    }

    /// Net staged critical-hit change for `key`.
    #[must_use]
    pub fn pending_crit_change(&self, key: CritKey) -> i32 {
        self.crits.pending_change(key)
    }

    /// Stages a shutdown flag change.
    pub fn stage_shutdown(&mut self, shutdown: bool) {
        self.pending_shutdown = if shutdown == self.shutdown {
            None
        } else {
            Some(shutdown)
        };
        self.touch();
    }

    /// Stages a delta to a limited-use ability counter.
    pub fn set_pending_consumed(&mut self, key: &str, delta: i32) {
        self.damage.set_pending_consumed(key, delta);
        self.touch();
    }

    /// Stages an ability as exhausted.
    pub fn exhaust_ability(&mut self, key: &str) {
        self.damage.exhaust(key);
        self.touch();
    }

    /// Stages an exhausted ability for restoration.
    pub fn restore_ability(&mut self, key: &str) {
        self.damage.restore(key);
        self.touch();
    }

    /// Whether an ability reads as exhausted with the overlay applied.
    #[must_use]
    pub fn is_ability_exhausted(&self, key: &str) -> bool {
        self.damage.is_exhausted(key)
    }

    // -------------------------------------------------------------------
    // Derived statistics (committed state)
    // -------------------------------------------------------------------

    /// Effective movement in inches per surviving mode.
    #[must_use]
    pub fn effective_movement(&self) -> BTreeMap<MoveMode, u16> {
        self.derived().movement
    }

    /// Effective target movement modifier per mode.
    #[must_use]
    pub fn effective_tmm(&self) -> BTreeMap<MoveMode, i32> {
        self.derived().tmm
    }

    /// Effective damage line.
    #[must_use]
    pub fn effective_damage_line(&self) -> DamageLine {
        self.derived().damage
    }

    /// Effective damage value for one bracket.
    #[must_use]
    pub fn effective_damage(&self, bracket: RangeBracket) -> DamageValue {
        self.derived().damage.bracket(bracket)
    }

    /// Effective thrust.
    #[must_use]
    pub fn effective_thrust(&self) -> i32 {
        self.derived().thrust
    }

    /// The destroyed flag cached at the last commit.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // -------------------------------------------------------------------
    // Transaction control
    // -------------------------------------------------------------------

    /// Returns `true` if anything is staged.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.damage.has_pending() || self.crits.has_pending() || self.pending_shutdown.is_some()
    }

    /// Merges the overlay into committed state.
    ///
    /// A commit with nothing pending is a harmless no-op. The destroyed
    /// flag is recomputed here and only here.
    pub fn commit(&mut self) {
        if !self.has_pending() {
            return;
        }
        debug!(unit = %self.template.name, "committing pending state");
        self.damage.commit();
        self.crits.commit();
        if let Some(shutdown) = self.pending_shutdown.take() {
            self.shutdown = shutdown;
        }
        self.touch();
        self.destroyed = resolver::is_destroyed(&self.view());
    }

    /// Drops the overlay without merging.
    pub fn discard_pending(&mut self) {
        self.damage.discard_pending();
        self.crits.discard_pending();
        self.pending_shutdown = None;
        self.touch();
    }

    /// Resets committed and pending state to pristine.
    pub fn repair_all(&mut self) {
        debug!(unit = %self.template.name, "repairing to pristine");
        self.damage.reset();
        self.crits.reset();
        self.shutdown = false;
        self.pending_shutdown = None;
        self.destroyed = false;
        self.touch();
    }
}

/// Which rule system a unit's state is tracked under.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GameSystem {
    /// Alpha Strike abstract rules.
    AlphaStrike,
    /// Classic BattleTech detailed rules.
    Classic,
}

/// A unit's state under either rule system.
///
/// The enum is closed: every consumer dispatches exhaustively, and the
/// `as_*` accessors give typed access when the caller already knows the
/// system in play.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitState {
    /// Alpha Strike state (ledgers + resolution tables).
    AlphaStrike(AlphaStrikeState),
    /// Classic BattleTech state (slots + piloting risk).
    Classic(ClassicState),
}

impl UnitState {
    /// The rule system this state is tracked under.
    #[must_use]
    pub const fn system(&self) -> GameSystem {
        match self {
            Self::AlphaStrike(_) => GameSystem::AlphaStrike,
            Self::Classic(_) => GameSystem::Classic,
        }
    }

    /// Returns the Alpha Strike state, if that is the system in play.
    #[must_use]
    pub const fn as_alpha_strike(&self) -> Option<&AlphaStrikeState> {
        match self {
            Self::AlphaStrike(state) => Some(state),
            Self::Classic(_) => None,
        }
    }

    /// Mutable access to the Alpha Strike state.
    #[must_use]
    pub fn as_alpha_strike_mut(&mut self) -> Option<&mut AlphaStrikeState> {
        match self {
            Self::AlphaStrike(state) => Some(state),
            Self::Classic(_) => None,
        }
    }

    /// Returns the Classic state, if that is the system in play.
    #[must_use]
    pub const fn as_classic(&self) -> Option<&ClassicState> {
        match self {
            Self::Classic(state) => Some(state),
            Self::AlphaStrike(_) => None,
        }
    }

    /// Mutable access to the Classic state.
    #[must_use]
    pub fn as_classic_mut(&mut self) -> Option<&mut ClassicState> {
        match self {
            Self::Classic(state) => Some(state),
            Self::AlphaStrike(_) => None,
        }
    }

    /// Merges pending state: a commit for Alpha Strike, an end-of-phase
    /// consolidation for Classic.
    pub fn commit(&mut self) {
        match self {
            Self::AlphaStrike(state) => state.commit(),
            Self::Classic(state) => state.end_phase(),
        }
    }

    /// Drops pending state without merging.
    pub fn discard_pending(&mut self) {
        match self {
            Self::AlphaStrike(state) => state.discard_pending(),
            Self::Classic(state) => state.discard_pending(),
        }
    }

    /// Resets the unit to pristine.
    pub fn repair_all(&mut self) {
        match self {
            Self::AlphaStrike(state) => state.repair_all(),
            Self::Classic(state) => state.repair_all(),
        }
    }

    /// Whether the unit is destroyed under its committed state.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        match self {
            Self::AlphaStrike(state) => state.is_destroyed(),
            Self::Classic(state) => state.is_destroyed(),
        }
    }
}

/// An ordered collection of units operated on together.
///
/// Force-wide operations are independent sequential per-unit commits;
/// no ordering between units is required or observable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Force {
    units: Vec<UnitState>,
}

impl Force {
    /// Creates an empty force.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit.
    pub fn push(&mut self, unit: UnitState) {
        self.units.push(unit);
    }

    /// The units in roster order.
    #[must_use]
    pub fn units(&self) -> &[UnitState] {
        &self.units
    }

    /// Mutable access to the units.
    pub fn units_mut(&mut self) -> &mut [UnitState] {
        &mut self.units
    }

    /// Commits every unit's pending state.
    pub fn commit_all(&mut self) {
        for unit in &mut self.units {
            unit.commit();
        }
    }

    /// Discards every unit's pending state.
    pub fn discard_all(&mut self) {
        for unit in &mut self.units {
            unit.discard_pending();
        }
    }

    /// Repairs every unit to pristine.
    pub fn repair_all(&mut self) {
        for unit in &mut self.units {
            unit.repair_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::UnitTypeCode;

    fn test_state() -> AlphaStrikeState {
        let mut template = UnitTemplate::new("Test Unit", UnitTypeCode::BattleMek);
        template.max_armor = 6;
        template.max_structure = 4;
        template.movement.insert(MoveMode::Ground, 10);
        template.damage.short = DamageValue::Value(3);
        AlphaStrikeState::new(template)
    }

    mod transaction_tests {
        use super::*;

        #[test]
        fn vacuous_commit_leaves_state_identical() {
            let mut state = test_state();
            state.set_pending_damage(3);
            state.commit();
            let before = state.clone();
            state.commit();
            assert_eq!(state, before);
        }

        #[test]
        fn discard_reverts_all_channels() {
            let mut state = test_state();
            state.set_pending_damage(4);
            state.set_pending_crits(CritKey::Mp, 2);
            state.set_pending_heat(1);
            state.stage_shutdown(true);
            state.discard_pending();

            assert!(!state.has_pending());
            assert_eq!(state.pending_crit_change(CritKey::Mp), 0);
            assert_eq!(state.armor().committed(), 0);
            assert!(!state.is_shutdown());
        }

        #[test]
        fn repair_all_restores_pristine() {
            let mut state = test_state();
            state.set_pending_damage(8);
            state.set_pending_crits(CritKey::Weapon, 2);
            state.commit();
            state.repair_all();

            assert_eq!(state, test_state());
            assert!(!state.is_modified());
        }

        #[test]
        fn destroyed_is_stable_during_preview() {
            let mut state = test_state();
            state.set_pending_damage(10);
            // Staged destruction must not flip the cached flag.
            assert!(!state.is_destroyed());
            state.commit();
            assert!(state.is_destroyed());
        }
    }

    mod derived_tests {
        use super::*;

        #[test]
        fn derived_values_follow_commits() {
            let mut state = test_state();
            assert_eq!(state.effective_movement()[&MoveMode::Ground], 10);

            state.set_pending_crits(CritKey::Mp, 1);
            // Pending crits do not move the committed derivation.
            assert_eq!(state.effective_movement()[&MoveMode::Ground], 10);

            state.commit();
            assert_eq!(state.effective_movement()[&MoveMode::Ground], 5);
        }

        #[test]
        fn committed_shutdown_immobilizes() {
            let mut state = test_state();
            state.stage_shutdown(true);
            // Still mobile while the flag is only staged.
            assert_eq!(state.effective_tmm()[&MoveMode::Ground], 2);

            state.commit();
            assert!(state.is_shutdown());
            assert_eq!(
                state.effective_tmm(),
                BTreeMap::from([(MoveMode::Ground, -4)])
            );
        }

        #[test]
        fn memoized_derivation_is_reused_until_touched() {
            let mut state = test_state();
            let v0 = state.version();
            let _ = state.effective_tmm();
            let _ = state.effective_tmm();
            assert_eq!(state.version(), v0);

            state.set_pending_heat(1);
            assert!(state.version() > v0);
        }
    }

    mod variant_tests {
        use super::*;
        use crate::classic::{ChassisConfig, ClassicState};

        #[test]
        fn accessors_match_variant() {
            let mut unit = UnitState::AlphaStrike(test_state());
            assert_eq!(unit.system(), GameSystem::AlphaStrike);
            assert!(unit.as_alpha_strike().is_some());
            assert!(unit.as_classic().is_none());
            assert!(unit.as_alpha_strike_mut().is_some());

            let classic = UnitState::Classic(ClassicState::new(ChassisConfig::default()));
            assert_eq!(classic.system(), GameSystem::Classic);
            assert!(classic.as_classic().is_some());
        }
    }

    mod force_tests {
        use super::*;

        #[test]
        fn repair_all_is_per_unit() {
            let mut force = Force::new();
            for _ in 0..3 {
                let mut state = test_state();
                state.set_pending_damage(5);
                state.commit();
                force.push(UnitState::AlphaStrike(state));
            }
            force.repair_all();
            for unit in force.units() {
                assert!(!unit.as_alpha_strike().unwrap().is_modified());
            }
        }
    }
}

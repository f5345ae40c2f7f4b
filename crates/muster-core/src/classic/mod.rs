//! Classic BattleTech unit state.
//!
//! The Classic variant tracks individual critical slots per location
//! instead of abstract crit counters. A slot hit is staged as
//! "destroying" and only promoted to "destroyed" at the end of the
//! phase, the same two-phase discipline the Alpha Strike ledgers use,
//! expressed at slot granularity. The per-turn risk accumulator and the
//! piloting-skill-roll derivation live in [`psr`]; phase and turn
//! consolidation live in [`turn`].

pub mod psr;
pub mod turn;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ledger::Tracked;

pub use turn::{ClassicMove, TurnState};

/// Engine slot hits that leave the unit dead.
pub const ENGINE_SLOTS_FATAL: u32 = 3;

/// Hit location on a Classic record sheet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Location {
    /// Head
    Head,
    /// Center torso
    CenterTorso,
    /// Left torso
    LeftTorso,
    /// Right torso
    RightTorso,
    /// Left arm
    LeftArm,
    /// Right arm
    RightArm,
    /// Left leg (bipeds)
    LeftLeg,
    /// Right leg (bipeds)
    RightLeg,
    /// Front left leg (quads)
    FrontLeftLeg,
    /// Front right leg (quads)
    FrontRightLeg,
    /// Rear left leg (quads)
    RearLeftLeg,
    /// Rear right leg (quads)
    RearRightLeg,
}

impl Location {
    /// Whether this location is a leg.
    #[must_use]
    pub const fn is_leg(self) -> bool {
        matches!(
            self,
            Self::LeftLeg
                | Self::RightLeg
                | Self::FrontLeftLeg
                | Self::FrontRightLeg
                | Self::RearLeftLeg
                | Self::RearRightLeg
        )
    }

    /// The legs a chassis has.
    #[must_use]
    pub fn legs(quad: bool) -> &'static [Self] {
        if quad {
            &[
                Self::FrontLeftLeg,
                Self::FrontRightLeg,
                Self::RearLeftLeg,
                Self::RearRightLeg,
            ]
        } else {
            &[Self::LeftLeg, Self::RightLeg]
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Head => "Head",
            Self::CenterTorso => "Center Torso",
            Self::LeftTorso => "Left Torso",
            Self::RightTorso => "Right Torso",
            Self::LeftArm => "Left Arm",
            Self::RightArm => "Right Arm",
            Self::LeftLeg => "Left Leg",
            Self::RightLeg => "Right Leg",
            Self::FrontLeftLeg => "Front Left Leg",
            Self::FrontRightLeg => "Front Right Leg",
            Self::RearLeftLeg => "Rear Left Leg",
            Self::RearRightLeg => "Rear Right Leg",
        };
        write!(f, "{name}")
    }
}

/// Lifecycle of one critical slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotState {
    /// Undamaged.
    Intact,
    /// Hit this phase; promoted at the end of the phase.
    Destroying,
    /// Destroyed in an earlier phase.
    Destroyed,
}

/// One critical slot on the record sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritSlot {
    /// Equipment label as printed on the sheet.
    pub label: String,
    /// Current lifecycle state.
    pub state: SlotState,
}

impl CritSlot {
    /// Creates an intact slot.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            state: SlotState::Intact,
        }
    }
}

/// What a slot label means to the risk accumulator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum SlotKind {
    Hip,
    FootActuator,
    LegActuator,
    Gyro,
    Engine,
    Other,
}

pub(crate) fn classify_slot(label: &str) -> SlotKind {
    if label.contains("Hip") {
        SlotKind::Hip
    } else if label.contains("Foot") {
        SlotKind::FootActuator
    } else if label.contains("Leg") {
        SlotKind::LegActuator
    } else if label.contains("Gyro") {
        SlotKind::Gyro
    } else if label.contains("Engine") {
        SlotKind::Engine
    } else {
        SlotKind::Other
    }
}

bitflags! {
    /// Chassis equipment that alters piloting-roll modifiers.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct Fittings: u16 {
        /// Heavy Duty Gyro: survives a second hit.
        const HEAVY_DUTY_GYRO = 1;
        /// Hardened armor: +1 to piloting rolls.
        const HARDENED_ARMOR = 1 << 1;
        /// Modular armor: +1 until the plates are spent.
        const MODULAR_ARMOR = 1 << 2;
        /// Small cockpit: +1 to piloting rolls.
        const SMALL_COCKPIT = 1 << 3;
        /// Torso-mounted cockpit: +1 to piloting rolls.
        const TORSO_COCKPIT = 1 << 4;
        /// Actuator enhancement system in the legs: -1.
        const AES_LEGS = 1 << 5;
    }
}

/// Immutable chassis description for a Classic unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChassisConfig {
    /// Four-legged chassis.
    pub quad: bool,
    /// Warrior's piloting skill.
    pub piloting: u8,
    /// Equipment flags.
    pub fittings: Fittings,
}

impl Default for ChassisConfig {
    fn default() -> Self {
        Self {
            quad: false,
            piloting: 5,
            fittings: Fittings::empty(),
        }
    }
}

/// Classic BattleTech unit state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassicState {
    config: ChassisConfig,
    slots: BTreeMap<Location, Vec<CritSlot>>,
    destroyed_legs: BTreeSet<Location>,
    modular_armor_spent: bool,
    heat: Tracked,
    turn: TurnState,
}

impl ClassicState {
    /// Creates a unit with no slots installed.
    #[must_use]
    pub fn new(config: ChassisConfig) -> Self {
        Self {
            config,
            slots: BTreeMap::new(),
            destroyed_legs: BTreeSet::new(),
            modular_armor_spent: false,
            heat: Tracked::new(0),
            turn: TurnState::default(),
        }
    }

    /// The chassis description.
    #[must_use]
    pub const fn config(&self) -> &ChassisConfig {
        &self.config
    }

    /// Installs a location's critical slots, replacing any existing ones.
    pub fn install_slots<I, S>(&mut self, location: Location, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slots
            .insert(location, labels.into_iter().map(CritSlot::new).collect());
    }

    /// Slots installed at a location.
    #[must_use]
    pub fn slots(&self, location: Location) -> &[CritSlot] {
        self.slots.get(&location).map_or(&[], Vec::as_slice)
    }

    /// The per-turn accumulator.
    #[must_use]
    pub const fn turn(&self) -> &TurnState {
        &self.turn
    }

    /// Heat level.
    #[must_use]
    pub const fn heat(&self) -> Tracked {
        self.heat
    }

    /// Committed destroyed legs.
    #[must_use]
    pub const fn destroyed_legs(&self) -> &BTreeSet<Location> {
        &self.destroyed_legs
    }

    /// Marks modular armor as fully consumed; its +1 no longer applies.
    pub fn spend_modular_armor(&mut self) {
        self.modular_armor_spent = true;
    }

    pub(crate) const fn modular_armor_active(&self) -> bool {
        self.config.fittings.contains(Fittings::MODULAR_ARMOR) && !self.modular_armor_spent
    }

    /// Committed (promoted) slot hits of a kind, chassis-wide.
    pub(crate) fn committed_kind_hits(&self, kind: SlotKind) -> u32 {
        self.kind_hits(kind, SlotState::Destroyed)
    }

    fn kind_hits(&self, kind: SlotKind, state: SlotState) -> u32 {
        let count = self
            .slots
            .values()
            .flatten()
            .filter(|slot| slot.state == state && classify_slot(&slot.label) == kind)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    pub(crate) fn gyro_threshold(&self) -> u32 {
        if self.config.fittings.contains(Fittings::HEAVY_DUTY_GYRO) {
            2
        } else {
            1
        }
    }

    /// Records a critical slot hit.
    ///
    /// The slot is staged as destroying, never destroyed outright, and
    /// the per-turn accumulator is updated by the slot's label. Hits on
    /// unknown slots or already-damaged slots are silent no-ops.
    pub fn evaluate_crit_slot_hit(&mut self, location: Location, slot_index: usize) {
        let Some(slot) = self
            .slots
            .get_mut(&location)
            .and_then(|slots| slots.get_mut(slot_index))
        else {
            return;
        };
        if slot.state != SlotState::Intact {
            return;
        }
        slot.state = SlotState::Destroying;
        let kind = classify_slot(&slot.label);
        debug!(%location, slot = %slot.label, "crit slot hit staged");

        match kind {
            SlotKind::Hip => {
                self.turn.hips_hit.insert(location);
            }
            SlotKind::FootActuator | SlotKind::LegActuator => {
                self.turn.legs_feet_hit += 1;
            }
            SlotKind::Gyro => {
                self.turn.gyro_hits += 1;
                let total = self.committed_kind_hits(SlotKind::Gyro) + u32::from(self.turn.gyro_hits);
                self.turn.gyros_destroyed = total > self.gyro_threshold();
            }
            SlotKind::Engine | SlotKind::Other => {}
        }
    }

    /// Records a leg's internal structure as destroyed this phase.
    ///
    /// Non-leg locations are silent no-ops.
    pub fn evaluate_leg_destroyed(&mut self, location: Location) {
        if location.is_leg() {
            self.turn.legs_destroyed.insert(location);
        }
    }

    /// Stages a heat delta. Committed heat never drops below zero.
    pub fn set_pending_heat(&mut self, delta: i32) {
        self.heat.set_pending(delta.max(-self.heat.committed()));
    }

    /// Records how the unit moved this turn.
    pub fn set_move(&mut self, mode: ClassicMove, distance: u8) {
        self.turn.move_mode = mode;
        self.turn.move_distance = distance;
    }

    /// Sets the shutdown flag.
    pub fn set_shutdown(&mut self, shutdown: bool) {
        self.turn.shutdown = shutdown;
    }

    /// Whether the unit is dead: three engine slots gone (staged hits
    /// included once promoted).
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.committed_kind_hits(SlotKind::Engine) >= ENGINE_SLOTS_FATAL
    }

    /// Promotes destroying slots to destroyed and resets the per-phase
    /// accumulator. Destruction is never applied mid-phase.
    pub fn end_phase(&mut self) {
        debug!("consolidating phase");
        for slot in self.slots.values_mut().flatten() {
            if slot.state == SlotState::Destroying {
                slot.state = SlotState::Destroyed;
            }
        }
        self.destroyed_legs.extend(self.turn.legs_destroyed.iter().copied());
        self.turn.reset_phase();
        self.turn.gyros_destroyed =
            self.committed_kind_hits(SlotKind::Gyro) > self.gyro_threshold();
    }

    /// Ends the turn: consolidates the phase, commits heat, and resets
    /// movement.
    pub fn end_turn(&mut self) {
        self.end_phase();
        self.heat.commit_clamped(0, i32::MAX);
        self.turn.move_mode = ClassicMove::Stationary;
        self.turn.move_distance = 0;
    }

    /// Reverts everything staged this phase: destroying slots return to
    /// intact, the accumulator clears, pending heat is dropped.
    pub fn discard_pending(&mut self) {
        for slot in self.slots.values_mut().flatten() {
            if slot.state == SlotState::Destroying {
                slot.state = SlotState::Intact;
            }
        }
        self.heat.clear_pending();
        self.turn.reset_phase();
        self.turn.gyros_destroyed =
            self.committed_kind_hits(SlotKind::Gyro) > self.gyro_threshold();
    }

    /// Resets the unit to pristine regardless of history.
    pub fn repair_all(&mut self) {
        for slot in self.slots.values_mut().flatten() {
            slot.state = SlotState::Intact;
        }
        self.destroyed_legs.clear();
        self.modular_armor_spent = false;
        self.heat = Tracked::new(0);
        self.turn.reset_turn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn biped_with_leg_slots() -> ClassicState {
        let mut state = ClassicState::new(ChassisConfig::default());
        for &leg in Location::legs(false) {
            state.install_slots(
                leg,
                ["Hip", "Upper Leg Actuator", "Lower Leg Actuator", "Foot Actuator"],
            );
        }
        state.install_slots(Location::CenterTorso, ["Gyro", "Gyro", "Engine", "Engine", "Engine"]);
        state
    }

    #[test]
    fn slot_hits_stage_not_commit() {
        let mut state = biped_with_leg_slots();
        state.evaluate_crit_slot_hit(Location::LeftLeg, 1);
        assert_eq!(state.slots(Location::LeftLeg)[1].state, SlotState::Destroying);
        assert_eq!(state.turn().legs_feet_hit, 1);

        state.end_phase();
        assert_eq!(state.slots(Location::LeftLeg)[1].state, SlotState::Destroyed);
        assert_eq!(state.turn().legs_feet_hit, 0);
    }

    #[test]
    fn repeat_hits_on_one_slot_are_no_ops() {
        let mut state = biped_with_leg_slots();
        state.evaluate_crit_slot_hit(Location::LeftLeg, 0);
        state.evaluate_crit_slot_hit(Location::LeftLeg, 0);
        assert!(state.turn().hips_hit.contains(&Location::LeftLeg));
        assert_eq!(state.turn().legs_feet_hit, 0);
    }

    #[test]
    fn unknown_slots_are_no_ops() {
        let mut state = biped_with_leg_slots();
        state.evaluate_crit_slot_hit(Location::Head, 9);
        assert_eq!(state.turn(), &TurnState::default());
    }

    #[test]
    fn gyro_destruction_threshold_depends_on_fitting() {
        let mut state = biped_with_leg_slots();
        state.evaluate_crit_slot_hit(Location::CenterTorso, 0);
        assert!(!state.turn().gyros_destroyed);
        state.evaluate_crit_slot_hit(Location::CenterTorso, 1);
        assert!(state.turn().gyros_destroyed);

        let mut hd = ClassicState::new(ChassisConfig {
            fittings: Fittings::HEAVY_DUTY_GYRO,
            ..ChassisConfig::default()
        });
        hd.install_slots(Location::CenterTorso, ["Gyro", "Gyro", "Gyro"]);
        hd.evaluate_crit_slot_hit(Location::CenterTorso, 0);
        hd.evaluate_crit_slot_hit(Location::CenterTorso, 1);
        assert!(!hd.turn().gyros_destroyed);
        hd.evaluate_crit_slot_hit(Location::CenterTorso, 2);
        assert!(hd.turn().gyros_destroyed);
    }

    #[test]
    fn discard_reverts_staged_slots_and_heat() {
        let mut state = biped_with_leg_slots();
        state.evaluate_crit_slot_hit(Location::LeftLeg, 3);
        state.set_pending_heat(5);
        state.discard_pending();

        assert_eq!(state.slots(Location::LeftLeg)[3].state, SlotState::Intact);
        assert_eq!(state.heat().effective(), 0);
        assert_eq!(state.turn().legs_feet_hit, 0);
    }

    #[test]
    fn end_turn_commits_heat_and_resets_movement() {
        let mut state = biped_with_leg_slots();
        state.set_pending_heat(6);
        state.set_move(ClassicMove::Ran, 7);
        state.end_turn();

        assert_eq!(state.heat().committed(), 6);
        assert_eq!(state.turn().move_mode, ClassicMove::Stationary);
        assert_eq!(state.turn().move_distance, 0);
    }

    #[test]
    fn three_engine_slots_destroy_the_unit() {
        let mut state = biped_with_leg_slots();
        for index in 2..5 {
            state.evaluate_crit_slot_hit(Location::CenterTorso, index);
        }
        // Still only staged.
        assert!(!state.is_destroyed());
        state.end_phase();
        assert!(state.is_destroyed());
    }

    #[test]
    fn repair_all_restores_pristine() {
        let mut state = biped_with_leg_slots();
        state.evaluate_crit_slot_hit(Location::LeftLeg, 0);
        state.evaluate_leg_destroyed(Location::LeftLeg);
        state.end_phase();
        state.set_pending_heat(3);
        state.repair_all();

        assert_eq!(state, biped_with_leg_slots());
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut state = biped_with_leg_slots();
        state.evaluate_crit_slot_hit(Location::LeftLeg, 2);
        state.evaluate_leg_destroyed(Location::RightLeg);
        state.end_phase();
        state.set_pending_heat(2);
        state.set_move(ClassicMove::Walked, 4);

        let json = serde_json::to_string(&state).unwrap();
        let back: ClassicState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}

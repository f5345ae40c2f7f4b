//! Per-turn accumulator for the Classic variant.
//!
//! The accumulator collects this phase's risk events (actuator, hip and
//! gyro hits, destroyed legs) plus the turn's movement. Phase
//! consolidation clears the risk events; turn consolidation also resets
//! movement.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Location;

/// How the unit moved this turn.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassicMove {
    /// Did not move.
    #[default]
    Stationary,
    /// Walked.
    Walked,
    /// Ran.
    Ran,
    /// Jumped.
    Jumped,
}

/// Risk events accumulated during the current phase, plus movement state
/// for the current turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Leg and foot actuator hits this phase.
    pub legs_feet_hit: u8,
    /// Legs whose hip was hit this phase.
    pub hips_hit: BTreeSet<Location>,
    /// Gyro hits this phase.
    pub gyro_hits: u8,
    /// Whether committed plus in-flight gyro hits exceed the threshold.
    pub gyros_destroyed: bool,
    /// Legs whose internal structure was destroyed this phase.
    pub legs_destroyed: BTreeSet<Location>,
    /// Whether the unit is shut down.
    pub shutdown: bool,
    /// Movement mode used this turn.
    pub move_mode: ClassicMove,
    /// Hexes moved this turn.
    pub move_distance: u8,
}

impl TurnState {
    /// Clears the per-phase risk events. Movement and shutdown persist.
    pub fn reset_phase(&mut self) {
        self.legs_feet_hit = 0;
        self.hips_hit.clear();
        self.gyro_hits = 0;
        self.gyros_destroyed = false;
        self.legs_destroyed.clear();
    }

    /// Clears everything, including movement.
    pub fn reset_turn(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_reset_keeps_movement() {
        let mut turn = TurnState {
            legs_feet_hit: 2,
            gyro_hits: 1,
            move_mode: ClassicMove::Ran,
            move_distance: 6,
            ..TurnState::default()
        };
        turn.hips_hit.insert(Location::LeftLeg);
        turn.reset_phase();

        assert_eq!(turn.legs_feet_hit, 0);
        assert!(turn.hips_hit.is_empty());
        assert_eq!(turn.move_mode, ClassicMove::Ran);
        assert_eq!(turn.move_distance, 6);
    }

    #[test]
    fn turn_reset_clears_movement_too() {
        let mut turn = TurnState {
            move_mode: ClassicMove::Jumped,
            move_distance: 4,
            ..TurnState::default()
        };
        turn.reset_turn();
        assert_eq!(turn, TurnState::default());
    }
}

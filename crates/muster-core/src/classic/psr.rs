//! Piloting-skill-roll derivation.
//!
//! `psr_checks()` turns the phase's accumulated risk events plus the
//! chassis's standing conditions into an ordered list of checks. Each
//! check carries a 2d6 target number; [`AUTO_FALL`] is the sentinel for
//! a fall no roll can avoid (destroyed gyro or destroyed leg), and such
//! an entry suppresses the other per-leg, hip and gyro entries for the
//! phase. Only hip hits on still-standing legs keep their own checks.

use std::collections::BTreeSet;

use super::{classify_slot, ClassicState, Fittings, Location, SlotKind, SlotState};

/// Sentinel target for a fall that cannot be avoided.
pub const AUTO_FALL: u8 = 100;

/// One derived piloting check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsrCheck {
    /// 2d6 target to stay standing; [`AUTO_FALL`] for an automatic fall.
    pub fall_check: Option<u8>,
    /// 2d6 target to avoid warrior injury, where a fall is certain.
    pub pilot_check: Option<u8>,
    /// Human-readable trigger.
    pub reason: String,
    /// The leg this check is tied to, if any.
    pub leg_filter: Option<Location>,
}

fn targeted(target: i32, reason: String, leg_filter: Option<Location>, piloting: u8) -> PsrCheck {
    if target > 12 {
        PsrCheck {
            fall_check: Some(AUTO_FALL),
            pilot_check: Some(piloting),
            reason,
            leg_filter,
        }
    } else {
        PsrCheck {
            fall_check: Some(u8::try_from(target.clamp(2, 12)).unwrap_or(12)),
            pilot_check: None,
            reason,
            leg_filter,
        }
    }
}

impl ClassicState {
    /// Legs whose hip is committed-destroyed.
    fn hip_destroyed_legs(&self) -> BTreeSet<Location> {
        Location::legs(self.config().quad)
            .iter()
            .copied()
            .filter(|&leg| {
                self.slots(leg).iter().any(|slot| {
                    slot.state == SlotState::Destroyed && classify_slot(&slot.label) == SlotKind::Hip
                })
            })
            .collect()
    }

    fn leg_is_pristine(&self, leg: Location) -> bool {
        !self.destroyed_legs().contains(&leg)
            && self.slots(leg).iter().all(|slot| slot.state == SlotState::Intact)
    }

    /// Standing piloting-roll modifier from pre-existing conditions.
    fn static_psr_modifier(&self) -> i32 {
        let fittings = self.config().fittings;
        let mut modifier = 0;

        if fittings.contains(Fittings::HARDENED_ARMOR) {
            modifier += 1;
        }
        if self.modular_armor_active() {
            modifier += 1;
        }
        if fittings.contains(Fittings::SMALL_COCKPIT) || fittings.contains(Fittings::TORSO_COCKPIT) {
            modifier += 1;
        }
        if fittings.contains(Fittings::AES_LEGS) {
            modifier -= 1;
        }

        let quad = self.config().quad;
        if quad
            && Location::legs(true)
                .iter()
                .all(|&leg| self.leg_is_pristine(leg))
        {
            modifier -= 2;
        }

        // A destroyed hip costs +2 and supersedes that leg's actuator
        // damage; surviving legs pay +1 per destroyed actuator.
        let hip_gone = self.hip_destroyed_legs();
        modifier += 2 * i32::try_from(hip_gone.len()).unwrap_or(0);
        for &leg in Location::legs(quad) {
            if hip_gone.contains(&leg) {
                continue;
            }
            let actuators = self
                .slots(leg)
                .iter()
                .filter(|slot| {
                    slot.state == SlotState::Destroyed
                        && matches!(
                            classify_slot(&slot.label),
                            SlotKind::LegActuator | SlotKind::FootActuator
                        )
                })
                .count();
            modifier += i32::try_from(actuators).unwrap_or(0);
        }

        let gyro_hits = self.committed_kind_hits(SlotKind::Gyro);
        if gyro_hits > 0 {
            modifier += if fittings.contains(Fittings::HEAVY_DUTY_GYRO) && gyro_hits == 1 {
                1
            } else {
                3
            };
        }

        modifier
    }

    /// Derives this phase's piloting checks, most severe first.
    #[must_use]
    pub fn psr_checks(&self) -> Vec<PsrCheck> {
        let piloting = self.config().piloting;
        let base = i32::from(piloting) + self.static_psr_modifier();
        let mut checks = Vec::new();

        let mut downed: BTreeSet<Location> = self.destroyed_legs().clone();
        downed.extend(self.turn().legs_destroyed.iter().copied());

        if self.turn().gyros_destroyed || !downed.is_empty() {
            let reason = if self.turn().gyros_destroyed {
                "Gyro destroyed"
            } else {
                "Leg destroyed"
            };
            checks.push(PsrCheck {
                fall_check: Some(AUTO_FALL),
                pilot_check: Some(piloting),
                reason: reason.to_owned(),
                leg_filter: None,
            });
            for &leg in &self.turn().hips_hit {
                if !downed.contains(&leg) {
                    checks.push(targeted(base + 2, format!("Hip hit ({leg})"), Some(leg), piloting));
                }
            }
            return checks;
        }

        for &leg in &self.turn().hips_hit {
            checks.push(targeted(base + 2, format!("Hip hit ({leg})"), Some(leg), piloting));
        }
        for _ in 0..self.turn().legs_feet_hit {
            checks.push(targeted(
                base + 1,
                "Leg or foot actuator hit".to_owned(),
                None,
                piloting,
            ));
        }
        for _ in 0..self.turn().gyro_hits {
            checks.push(targeted(base + 3, "Gyro hit".to_owned(), None, piloting));
        }
        checks
    }

    /// Whether the unit may still run: false once the damaged-leg count
    /// reaches two on a quad or one on anything else.
    #[must_use]
    pub fn can_run(&self) -> bool {
        let quad = self.config().quad;
        let damaged = Location::legs(quad)
            .iter()
            .filter(|&&leg| {
                self.destroyed_legs().contains(&leg)
                    || self.turn().legs_destroyed.contains(&leg)
                    || self.slots(leg).iter().any(|slot| slot.state != SlotState::Intact)
            })
            .count();
        damaged < if quad { 2 } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classic::ChassisConfig;

    fn biped() -> ClassicState {
        let mut state = ClassicState::new(ChassisConfig::default());
        for &leg in Location::legs(false) {
            state.install_slots(
                leg,
                ["Hip", "Upper Leg Actuator", "Lower Leg Actuator", "Foot Actuator"],
            );
        }
        state.install_slots(Location::CenterTorso, ["Gyro", "Gyro"]);
        state
    }

    mod check_tests {
        use super::*;

        #[test]
        fn actuator_hit_rolls_against_piloting_plus_one() {
            let mut state = biped();
            state.evaluate_crit_slot_hit(Location::LeftLeg, 3);
            let checks = state.psr_checks();
            assert_eq!(checks.len(), 1);
            assert_eq!(checks[0].fall_check, Some(6));
            assert_eq!(checks[0].pilot_check, None);
        }

        #[test]
        fn hip_hit_is_plus_two_and_leg_tagged() {
            let mut state = biped();
            state.evaluate_crit_slot_hit(Location::RightLeg, 0);
            let checks = state.psr_checks();
            assert_eq!(checks.len(), 1);
            assert_eq!(checks[0].fall_check, Some(7));
            assert_eq!(checks[0].leg_filter, Some(Location::RightLeg));
        }

        #[test]
        fn gyro_hit_is_plus_three() {
            let mut state = biped();
            state.evaluate_crit_slot_hit(Location::CenterTorso, 0);
            let checks = state.psr_checks();
            assert_eq!(checks.len(), 1);
            assert_eq!(checks[0].fall_check, Some(8));
        }

        #[test]
        fn destroyed_leg_short_circuits_to_one_auto_fall() {
            let mut state = biped();
            state.evaluate_leg_destroyed(Location::LeftLeg);
            state.evaluate_leg_destroyed(Location::RightLeg);
            // Slot damage on the destroyed legs rides along.
            state.evaluate_crit_slot_hit(Location::LeftLeg, 2);

            let checks = state.psr_checks();
            assert_eq!(checks.len(), 1);
            assert_eq!(checks[0].fall_check, Some(AUTO_FALL));
            assert_eq!(checks[0].pilot_check, Some(5));
        }

        #[test]
        fn hip_on_surviving_leg_outlives_the_short_circuit() {
            let mut state = biped();
            state.evaluate_leg_destroyed(Location::LeftLeg);
            state.evaluate_crit_slot_hit(Location::RightLeg, 0);

            let checks = state.psr_checks();
            assert_eq!(checks.len(), 2);
            assert_eq!(checks[0].fall_check, Some(AUTO_FALL));
            assert_eq!(checks[1].leg_filter, Some(Location::RightLeg));
        }

        #[test]
        fn destroyed_gyro_is_an_auto_fall() {
            let mut state = biped();
            state.evaluate_crit_slot_hit(Location::CenterTorso, 0);
            state.evaluate_crit_slot_hit(Location::CenterTorso, 1);
            let checks = state.psr_checks();
            assert_eq!(checks.len(), 1);
            assert_eq!(checks[0].fall_check, Some(AUTO_FALL));
            assert_eq!(checks[0].reason, "Gyro destroyed");
        }

        #[test]
        fn target_past_twelve_becomes_auto_fall() {
            let mut state = ClassicState::new(ChassisConfig {
                fittings: Fittings::HARDENED_ARMOR
                    | Fittings::SMALL_COCKPIT
                    | Fittings::MODULAR_ARMOR
                    | Fittings::HEAVY_DUTY_GYRO,
                ..ChassisConfig::default()
            });
            for &leg in Location::legs(false) {
                state.install_slots(leg, ["Hip", "Upper Leg Actuator"]);
            }
            state.install_slots(Location::CenterTorso, ["Gyro", "Gyro", "Gyro"]);
            state.evaluate_crit_slot_hit(Location::LeftLeg, 0);
            state.end_phase();

            // Base is 5 + 1 + 1 + 1 + 2 (destroyed hip) = 10; a fresh gyro
            // hit (+3) pushes past 12 without destroying the HD gyro.
            state.evaluate_crit_slot_hit(Location::CenterTorso, 0);
            let checks = state.psr_checks();
            assert_eq!(checks[0].fall_check, Some(AUTO_FALL));
            assert_eq!(checks[0].pilot_check, Some(5));
        }
    }

    mod static_modifier_tests {
        use super::*;

        #[test]
        fn fittings_stack_into_the_base() {
            let mut state = ClassicState::new(ChassisConfig {
                fittings: Fittings::HARDENED_ARMOR | Fittings::SMALL_COCKPIT,
                ..ChassisConfig::default()
            });
            for &leg in Location::legs(false) {
                state.install_slots(leg, ["Hip", "Foot Actuator"]);
            }
            state.evaluate_crit_slot_hit(Location::LeftLeg, 1);
            // 5 piloting + 1 hardened + 1 cockpit + 1 actuator hit = 8.
            assert_eq!(state.psr_checks()[0].fall_check, Some(8));
        }

        #[test]
        fn spent_modular_armor_stops_counting() {
            let mut state = ClassicState::new(ChassisConfig {
                fittings: Fittings::MODULAR_ARMOR,
                ..ChassisConfig::default()
            });
            state.install_slots(Location::LeftLeg, ["Foot Actuator"]);
            state.install_slots(Location::RightLeg, ["Foot Actuator"]);
            state.evaluate_crit_slot_hit(Location::LeftLeg, 0);
            assert_eq!(state.psr_checks()[0].fall_check, Some(7));

            state.spend_modular_armor();
            assert_eq!(state.psr_checks()[0].fall_check, Some(6));
        }

        #[test]
        fn intact_quad_gets_minus_two() {
            let mut state = ClassicState::new(ChassisConfig {
                quad: true,
                ..ChassisConfig::default()
            });
            for &leg in Location::legs(true) {
                state.install_slots(leg, ["Hip", "Foot Actuator"]);
            }
            state.install_slots(Location::CenterTorso, ["Gyro", "Gyro"]);
            state.evaluate_crit_slot_hit(Location::CenterTorso, 0);
            // 5 - 2 (intact quad) + 3 (gyro hit) = 6.
            assert_eq!(state.psr_checks()[0].fall_check, Some(6));
        }

        #[test]
        fn destroyed_hip_supersedes_that_legs_actuators() {
            let mut state = biped();
            state.evaluate_crit_slot_hit(Location::LeftLeg, 0); // hip
            state.evaluate_crit_slot_hit(Location::LeftLeg, 3); // foot
            state.evaluate_crit_slot_hit(Location::RightLeg, 3); // foot
            state.end_phase();

            // Static: +2 for the left hip (left foot excluded), +1 for the
            // right foot. A fresh actuator hit adds +1 on top of piloting.
            state.evaluate_crit_slot_hit(Location::RightLeg, 1);
            assert_eq!(state.psr_checks()[0].fall_check, Some(5 + 2 + 1 + 1));
        }

        #[test]
        fn heavy_duty_gyro_first_hit_is_cheap() {
            let mut hd = ClassicState::new(ChassisConfig {
                fittings: Fittings::HEAVY_DUTY_GYRO,
                ..ChassisConfig::default()
            });
            hd.install_slots(Location::CenterTorso, ["Gyro", "Gyro", "Gyro"]);
            hd.install_slots(Location::LeftLeg, ["Foot Actuator", "Foot Actuator"]);
            hd.evaluate_crit_slot_hit(Location::CenterTorso, 0);
            hd.end_phase();

            hd.evaluate_crit_slot_hit(Location::LeftLeg, 0);
            // 5 + 1 (HD gyro, one hit) + 1 (actuator) = 7.
            assert_eq!(hd.psr_checks()[0].fall_check, Some(7));

            hd.evaluate_crit_slot_hit(Location::CenterTorso, 1);
            hd.end_phase();
            hd.evaluate_crit_slot_hit(Location::LeftLeg, 1);
            // Second gyro hit committed: the discount is gone (+3), and the
            // first foot actuator now counts statically (+1).
            assert_eq!(hd.psr_checks().last().unwrap().fall_check, Some(5 + 3 + 1 + 1));
        }
    }

    mod run_tests {
        use super::*;

        #[test]
        fn biped_stops_running_at_one_damaged_leg() {
            let mut state = biped();
            assert!(state.can_run());
            state.evaluate_crit_slot_hit(Location::LeftLeg, 3);
            assert!(!state.can_run());
        }

        #[test]
        fn quad_tolerates_one_damaged_leg() {
            let mut state = ClassicState::new(ChassisConfig {
                quad: true,
                ..ChassisConfig::default()
            });
            for &leg in Location::legs(true) {
                state.install_slots(leg, ["Hip", "Foot Actuator"]);
            }
            state.evaluate_crit_slot_hit(Location::FrontLeftLeg, 1);
            assert!(state.can_run());
            state.evaluate_leg_destroyed(Location::RearRightLeg);
            assert!(!state.can_run());
        }
    }
}

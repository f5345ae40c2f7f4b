//! Test helper factories for units and states.
//!
//! These build the small menagerie of units the suites exercise: a
//! standard mek, a combat vehicle, an aerospace fighter, a DropShip and
//! a Classic biped with populated leg slots.

use crate::classic::{ChassisConfig, ClassicState, Location};
use crate::ladder::DamageValue;
use crate::template::{MoveMode, UnitTemplate, UnitTypeCode};
use crate::unit::AlphaStrikeState;

/// A mek with `Arm 6 / Str 4`, 10" ground movement and a 3/3/2 line.
pub fn mek_template() -> UnitTemplate {
    let mut template = UnitTemplate::new("Griffin GRF-1N", UnitTypeCode::BattleMek);
    template.max_armor = 6;
    template.max_structure = 4;
    template.movement.insert(MoveMode::Ground, 10);
    template.damage.short = DamageValue::Value(3);
    template.damage.medium = DamageValue::Value(3);
    template.damage.long = DamageValue::Value(2);
    template
}

/// A tracked combat vehicle with 10" movement and a 5/5/3 line.
pub fn vehicle_template() -> UnitTemplate {
    let mut template = UnitTemplate::new("Manticore", UnitTypeCode::CombatVehicle);
    template.max_armor = 8;
    template.max_structure = 4;
    template.movement.insert(MoveMode::Ground, 10);
    template.damage.short = DamageValue::Value(5);
    template.damage.medium = DamageValue::Value(5);
    template.damage.long = DamageValue::Value(3);
    template
}

/// An aerospace fighter with thrust 12.
pub fn fighter_template() -> UnitTemplate {
    let mut template = UnitTemplate::new("Stingray F-90", UnitTypeCode::AerospaceFighter);
    template.max_armor = 6;
    template.max_structure = 4;
    template.base_thrust = 12;
    template.damage.short = DamageValue::Value(4);
    template.damage.medium = DamageValue::Value(4);
    template.damage.long = DamageValue::Value(2);
    template
}

/// A DropShip with thrust 8.
pub fn dropship_template() -> UnitTemplate {
    let mut template = UnitTemplate::new("Union", UnitTypeCode::DropShip);
    template.max_armor = 20;
    template.max_structure = 12;
    template.base_thrust = 8;
    template.damage.short = DamageValue::Value(6);
    template.damage.medium = DamageValue::Value(6);
    template.damage.long = DamageValue::Value(4);
    template
}

/// Fresh Alpha Strike state for a template.
pub fn state_of(template: UnitTemplate) -> AlphaStrikeState {
    AlphaStrikeState::new(template)
}

/// A Classic biped with standard leg slots and a two-slot gyro.
pub fn classic_biped() -> ClassicState {
    let mut state = ClassicState::new(ChassisConfig::default());
    for &leg in Location::legs(false) {
        state.install_slots(
            leg,
            ["Hip", "Upper Leg Actuator", "Lower Leg Actuator", "Foot Actuator"],
        );
    }
    state.install_slots(
        Location::CenterTorso,
        ["Gyro", "Gyro", "Engine", "Engine", "Engine"],
    );
    state
}

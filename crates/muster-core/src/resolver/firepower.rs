//! Effective damage line derivation.
//!
//! Non-vehicles lose one ladder rung per weapon hit, order-independent.
//! Vehicles interleave engine halvings with weapon steps in committed
//! order, which is why the records carry a total order at all: a weapon
//! hit before an engine hit and the same hits reversed yield different
//! values.

use crate::ladder::DamageValue;
use crate::ledger::crits::CritKey;
use crate::template::{DamageLine, RangeBracket};

use super::StateView;

/// Effective damage value for one range bracket.
#[must_use]
pub fn effective_damage(view: &StateView<'_>, bracket: RangeBracket) -> DamageValue {
    let base = view.template.damage.bracket(bracket);
    if view.template.type_code.is_vehicle() {
        let mut value = base;
        for record in view.crits.committed_ordered() {
            if !value.above_floor() {
                break;
            }
            match record.key {
                CritKey::Engine => value = value.halve(),
                CritKey::Weapon => value = value.step_down(),
                _ => {}
            }
        }
        value
    } else {
        let hits = u8::try_from(view.crits.committed_hits(CritKey::Weapon)).unwrap_or(u8::MAX);
        base.reduce(hits)
    }
}

/// Effective damage values for all four brackets.
#[must_use]
pub fn effective_damage_line(view: &StateView<'_>) -> DamageLine {
    DamageLine {
        short: effective_damage(view, RangeBracket::Short),
        medium: effective_damage(view, RangeBracket::Medium),
        long: effective_damage(view, RangeBracket::Long),
        extreme: effective_damage(view, RangeBracket::Extreme),
    }
}

//! Effective movement derivation.
//!
//! Vehicles degrade through the motive-hit chain; everything else uses the
//! mp-hit chain. Both chains walk the committed records in order and stop
//! once the value hits zero. Heat then costs 2" per level on non-jump
//! modes.

use std::collections::BTreeMap;

use crate::ledger::crits::{CritKey, CritRecord};
use crate::template::MoveMode;

use super::StateView;

/// Applies the vehicle motive-hit chain to a value (inches or TMM).
///
/// `Motive1` subtracts 2; `Motive2` and `Engine` halve, but never reduce
/// by less than 2; `Motive3` zeroes the value outright.
pub(crate) fn motive_chain(records: &[CritRecord], mut value: i32) -> i32 {
    for record in records {
        if value <= 0 {
            break;
        }
        match record.key {
            CritKey::Motive1 => value -= 2,
            CritKey::Motive2 | CritKey::Engine => value = (value / 2).min(value - 2),
            CritKey::Motive3 => value = 0,
            _ => {}
        }
    }
    value.max(0)
}

/// Applies the mp-hit chain: each hit halves (floor), never reducing by
/// less than 2.
pub(crate) fn mp_chain(records: &[CritRecord], mut value: i32) -> i32 {
    for record in records {
        if value <= 0 {
            break;
        }
        if record.key == CritKey::Mp {
            value = (value / 2).min(value - 2);
        }
    }
    value.max(0)
}

/// Effective movement in inches for every mode the unit has.
#[must_use]
pub fn effective_movement(view: &StateView<'_>) -> BTreeMap<MoveMode, u16> {
    let records = view.crits.committed_ordered();
    let vehicle = view.template.type_code.is_vehicle();

    let mut out = BTreeMap::new();
    for (&mode, &base) in &view.template.movement {
        let mut inches = if vehicle {
            motive_chain(records, i32::from(base))
        } else {
            mp_chain(records, i32::from(base))
        };
        if mode != MoveMode::Jump {
            inches -= 2 * view.heat;
        }
        out.insert(mode, u16::try_from(inches.max(0)).unwrap_or(0));
    }
    out
}

//! Target movement modifier derivation.
//!
//! TMM starts from a fixed inches bracket table, then degrades: vehicles
//! push the raw TMM value through the same motive-hit chain shape as
//! movement, non-vehicles subtract one per mp hit. Running hot costs one
//! more on the ground mode. An immobilized unit is a single `-4` entry.

use std::collections::BTreeMap;

use crate::ledger::crits::CritKey;
use crate::template::MoveMode;

use super::movement::{effective_movement, motive_chain};
use super::StateView;

/// TMM an attacker faces when the target is immobilized.
pub const IMMOBILE_TMM: i32 = -4;

/// Bracket table from movement inches to base TMM.
#[must_use]
pub const fn base_tmm(inches: i32) -> i32 {
    match inches {
        i32::MIN..=4 => 0,
        5..=8 => 1,
        9..=12 => 2,
        13..=18 => 3,
        19..=34 => 4,
        _ => 5,
    }
}

/// Effective TMM per mode.
///
/// Modes whose TMM equals the ground mode's collapse into the ground
/// entry, mirroring how the card prints a single number when the
/// modifiers agree.
#[must_use]
pub fn effective_tmm(view: &StateView<'_>) -> BTreeMap<MoveMode, i32> {
    let movement = effective_movement(view);
    let immobilized = view.shutdown || movement.values().all(|&inches| inches == 0);
    if immobilized {
        return BTreeMap::from([(MoveMode::Ground, IMMOBILE_TMM)]);
    }

    let records = view.crits.committed_ordered();
    let vehicle = view.template.type_code.is_vehicle();
    let mp_hits = i32::try_from(view.crits.committed_hits(CritKey::Mp)).unwrap_or(i32::MAX);

    let mut out = BTreeMap::new();
    for (&mode, &inches) in &movement {
        let mut tmm = base_tmm(i32::from(inches));
        if vehicle {
            tmm = motive_chain(records, tmm);
        } else {
            tmm -= mp_hits;
        }
        if mode == MoveMode::Ground && view.heat >= 2 {
            tmm -= 1;
        }
        out.insert(mode, tmm.max(0));
    }

    if let Some(&ground) = out.get(&MoveMode::Ground) {
        out.retain(|&mode, &mut tmm| mode == MoveMode::Ground || tmm != ground);
    }
    out
}

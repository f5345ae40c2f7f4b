//! Pure derivations over committed unit state.
//!
//! Every function here reads the ordered committed critical-hit list (and
//! committed heat/structure) and produces a display-ready number. Nothing
//! in this module mutates state; the unit container memoizes results
//! behind its version counter.
//!
//! # Processing Order
//!
//! Several effects are non-commutative: vehicle engine and weapon hits
//! interleave against the damage line, and motive hits compose with
//! engine hits against movement. All walks iterate
//! `committed_crits_ordered()` ascending by sequence magnitude and stop
//! early once the quantity being reduced reaches its floor.

pub mod firepower;
pub mod movement;
pub mod thrust;
pub mod tmm;

use std::collections::BTreeMap;

use crate::ledger::crits::{CritKey, CritLedger};
use crate::template::{DamageLine, MoveMode, UnitTemplate};

/// Read-only view of the committed state a derivation needs.
#[derive(Debug, Copy, Clone)]
pub struct StateView<'a> {
    /// The unit's immutable base card.
    pub template: &'a UnitTemplate,
    /// Committed heat level.
    pub heat: i32,
    /// Committed structure damage.
    pub structure_damage: i32,
    /// Committed shutdown flag.
    pub shutdown: bool,
    /// Committed critical-hit records.
    pub crits: &'a CritLedger,
}

/// Engine hits needed to destroy a unit: vessels ride out two.
#[must_use]
const fn engine_hit_threshold(vessel: bool) -> u32 {
    if vessel {
        3
    } else {
        2
    }
}

/// Whether the unit is destroyed under the committed state.
///
/// Destruction is checked in this order: structure gone, engine hits at
/// threshold, crew dead, or (for thrust-rated units) no thrust left. The
/// unit container recomputes and caches this only inside `commit()`, so
/// the flag never fluctuates while pending edits are previewed.
#[must_use]
pub fn is_destroyed(view: &StateView<'_>) -> bool {
    let template = view.template;
    if template.max_structure > 0 && view.structure_damage >= i32::from(template.max_structure) {
        return true;
    }
    let vessel = template.type_code.is_vessel();
    if view.crits.committed_hits(CritKey::Engine) >= engine_hit_threshold(vessel) {
        return true;
    }
    if view.crits.committed_hits(CritKey::Crew) > 1 {
        return true;
    }
    template.base_thrust > 0 && thrust::effective_thrust(view) <= 0
}

/// All derived combat statistics, computed in one pass for memoization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derived {
    /// Effective movement in inches per surviving mode.
    pub movement: BTreeMap<MoveMode, u16>,
    /// Effective target movement modifier per mode.
    pub tmm: BTreeMap<MoveMode, i32>,
    /// Effective damage line.
    pub damage: DamageLine,
    /// Effective thrust.
    pub thrust: i32,
}

/// Computes every derived statistic for the view.
#[must_use]
pub fn derive(view: &StateView<'_>) -> Derived {
    Derived {
        movement: movement::effective_movement(view),
        tmm: tmm::effective_tmm(view),
        damage: firepower::effective_damage_line(view),
        thrust: thrust::effective_thrust(view),
    }
}

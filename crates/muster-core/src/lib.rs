//! # Muster Core
//!
//! Two-phase unit damage and critical-hit state engine for the Muster
//! force-management tool.
//!
//! Every unit carries a committed snapshot plus a pending overlay.
//! Dialogs stage speculative damage, heat and critical hits into the
//! overlay; a commit merges it in one transaction, and all combat
//! statistics (movement, TMM, damage line, thrust, destruction) are
//! derived purely from the ordered committed state.
//!
//! ## Architecture
//!
//! - **Ledgers** ([`ledger`]): conservation-clamped numeric accounting
//!   and ordered critical-hit records.
//! - **Resolvers** ([`resolver`]): pure, order-sensitive derivations.
//! - **Tables** ([`crit_table`]): Alpha Strike roll tables with
//!   applicability guards.
//! - **Classic variant** ([`classic`]): slot-level crits, the piloting
//!   risk accumulator, and phase/turn consolidation.
//! - **Persistence** ([`persist`]): tolerant record restore against a
//!   template catalog.
//!
//! ## Usage
//!
//! ```
//! use muster_core::template::{UnitTemplate, UnitTypeCode};
//! use muster_core::unit::AlphaStrikeState;
//!
//! let mut template = UnitTemplate::new("Ostscout OTT-7J", UnitTypeCode::BattleMek);
//! template.max_armor = 6;
//! template.max_structure = 4;
//!
//! let mut unit = AlphaStrikeState::new(template);
//! unit.set_pending_damage(8);
//! assert_eq!(unit.armor().pending(), 6);
//! unit.commit();
//! assert_eq!(unit.armor().committed(), 6);
//! assert_eq!(unit.structure().committed(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod classic;
pub mod crit_table;
pub mod ladder;
pub mod ledger;
pub mod persist;
pub mod resolver;
pub mod template;
pub mod unit;

pub use classic::{ChassisConfig, ClassicState, Location};
pub use crit_table::{roll_crit, CritEffect, CritRoll};
pub use ladder::DamageValue;
pub use ledger::crits::CritKey;
pub use persist::{LoadError, SavedUnit, TemplateSource};
pub use template::{UnitTemplate, UnitTypeCode};
pub use unit::{AlphaStrikeState, Force, GameSystem, UnitState};

#[cfg(test)]
mod tests;

//! Alpha Strike critical-hit resolution tables.
//!
//! Seven static 2d6 tables, keyed by unit type. Rolling produces a
//! [`CritRoll`] the caller can show in a dialog and then either apply
//! (staging one more pending record, or pending damage for the CASE ammo
//! path) or discard. Nothing here mutates state until [`apply`] is
//! called, and [`cannot_apply_reason`] gates the apply the same way the
//! dialog's confirm button is gated.
//!
//! Infantry and battle armor have no table and always resolve to
//! "No Critical Hit".

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::ledger::crits::CritKey;
use crate::template::{FiringArc, Specials, UnitTemplate, UnitTypeCode, WeaponColumn};
use crate::unit::AlphaStrikeState;

/// Maximum committed+pending hits for one arc/column pair.
pub const ARC_PAIR_MAX: i32 = 4;

/// Target named by a table entry, before any arc roll.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CritTarget {
    /// Engine hit.
    Engine,
    /// Fire-control hit.
    FireControl,
    /// Movement-point hit.
    Mp,
    /// Weapon hit.
    Weapon,
    /// Minor motive damage.
    Motive1,
    /// Major motive damage.
    Motive2,
    /// Crippling motive damage.
    Motive3,
    /// Thruster hit.
    Thruster,
    /// Crew or cockpit hit.
    Crew,
    /// Ammo hit; key-less, resolved against the unit's specials.
    Ammo,
}

impl CritTarget {
    /// The ledger key for this target. `Ammo` has none.
    #[must_use]
    pub const fn key(self) -> Option<CritKey> {
        match self {
            Self::Engine => Some(CritKey::Engine),
            Self::FireControl => Some(CritKey::FireControl),
            Self::Mp => Some(CritKey::Mp),
            Self::Weapon => Some(CritKey::Weapon),
            Self::Motive1 => Some(CritKey::Motive1),
            Self::Motive2 => Some(CritKey::Motive2),
            Self::Motive3 => Some(CritKey::Motive3),
            Self::Thruster => Some(CritKey::Thruster),
            Self::Crew => Some(CritKey::Crew),
            Self::Ammo => None,
        }
    }
}

/// One row of a resolution table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CritTableEntry {
    /// Short name shown in the roll dialog.
    pub label: &'static str,
    /// Rules text shown under the label.
    pub description: &'static str,
    /// Target category; `None` is "No Critical Hit".
    pub target: Option<CritTarget>,
    /// Whether the hit lands in a random firing arc and weapon column.
    pub requires_arc_roll: bool,
    /// Cap on committed hits of this key, where the rules define one.
    pub max_hits: Option<u8>,
}

const fn no_crit() -> CritTableEntry {
    CritTableEntry {
        label: "No Critical Hit",
        description: "The attack causes no lasting critical damage.",
        target: None,
        requires_arc_roll: false,
        max_hits: None,
    }
}

const fn entry(
    label: &'static str,
    description: &'static str,
    target: CritTarget,
    max_hits: Option<u8>,
) -> CritTableEntry {
    CritTableEntry {
        label,
        description,
        target: Some(target),
        requires_arc_roll: false,
        max_hits,
    }
}

const fn arc_weapon(description: &'static str) -> CritTableEntry {
    CritTableEntry {
        label: "Weapon Hit",
        description,
        target: Some(CritTarget::Weapon),
        requires_arc_roll: true,
        max_hits: None,
    }
}

const AMMO: CritTableEntry = entry(
    "Ammo Hit",
    "Ammunition is struck; the outcome depends on the unit's storage.",
    CritTarget::Ammo,
    None,
);

type Table = [CritTableEntry; 11];

static MEK_TABLE: Table = [
    AMMO,
    entry("Engine Hit", "Reactor shielding is breached; a second hit destroys the unit.", CritTarget::Engine, Some(2)),
    entry("Fire Control Hit", "Targeting systems damaged; +2 to-hit per hit.", CritTarget::FireControl, Some(4)),
    no_crit(),
    entry("Weapon Hit", "Weapons destroyed; reduce damage values by 1.", CritTarget::Weapon, Some(4)),
    entry("MP Hit", "Actuator and myomer damage; halve movement.", CritTarget::Mp, Some(4)),
    entry("Weapon Hit", "Weapons destroyed; reduce damage values by 1.", CritTarget::Weapon, Some(4)),
    no_crit(),
    entry("Fire Control Hit", "Targeting systems damaged; +2 to-hit per hit.", CritTarget::FireControl, Some(4)),
    entry("Engine Hit", "Reactor shielding is breached; a second hit destroys the unit.", CritTarget::Engine, Some(2)),
    entry("Cockpit Hit", "The cockpit is breached; a second hit kills the warrior.", CritTarget::Crew, Some(2)),
];

static PROTOMEK_TABLE: Table = [
    AMMO,
    entry("MP Hit", "Leg and torso servos damaged; halve movement.", CritTarget::Mp, Some(4)),
    entry("Fire Control Hit", "Targeting systems damaged; +2 to-hit per hit.", CritTarget::FireControl, Some(4)),
    no_crit(),
    entry("Weapon Hit", "Weapons destroyed; reduce damage values by 1.", CritTarget::Weapon, Some(4)),
    entry("MP Hit", "Leg and torso servos damaged; halve movement.", CritTarget::Mp, Some(4)),
    entry("Weapon Hit", "Weapons destroyed; reduce damage values by 1.", CritTarget::Weapon, Some(4)),
    no_crit(),
    entry("Fire Control Hit", "Targeting systems damaged; +2 to-hit per hit.", CritTarget::FireControl, Some(4)),
    entry("Weapon Hit", "Weapons destroyed; reduce damage values by 1.", CritTarget::Weapon, Some(4)),
    entry("Pilot Hit", "The pilot compartment is breached; a second hit kills the pilot.", CritTarget::Crew, Some(2)),
];

static VEHICLE_TABLE: Table = [
    AMMO,
    entry("Minor Motive Damage", "Tracks or wheels damaged; -2\" movement.", CritTarget::Motive1, None),
    entry("Fire Control Hit", "Targeting systems damaged; +2 to-hit per hit.", CritTarget::FireControl, Some(4)),
    no_crit(),
    entry("Weapon Hit", "Weapons destroyed; reduce damage values by 1.", CritTarget::Weapon, Some(4)),
    entry("Major Motive Damage", "Drive train mangled; halve movement.", CritTarget::Motive2, None),
    entry("Weapon Hit", "Weapons destroyed; reduce damage values by 1.", CritTarget::Weapon, Some(4)),
    no_crit(),
    entry("Crippling Motive Damage", "The unit is immobilized.", CritTarget::Motive3, Some(1)),
    entry("Crew Killed", "Crew compartment struck; a second hit wipes out the crew.", CritTarget::Crew, Some(2)),
    entry("Engine Hit", "Engine destroyed; halve movement and damage.", CritTarget::Engine, Some(2)),
];

static FIGHTER_TABLE: Table = [
    AMMO,
    entry("Engine Hit", "Engine damaged; halve thrust, a second hit destroys the unit.", CritTarget::Engine, Some(2)),
    entry("Fire Control Hit", "Targeting systems damaged; +2 to-hit per hit.", CritTarget::FireControl, Some(4)),
    no_crit(),
    entry("Weapon Hit", "Weapons destroyed; reduce damage values by 1.", CritTarget::Weapon, Some(4)),
    entry("Thruster Hit", "Maneuvering thrusters damaged; -1 thrust per hit.", CritTarget::Thruster, None),
    entry("Weapon Hit", "Weapons destroyed; reduce damage values by 1.", CritTarget::Weapon, Some(4)),
    no_crit(),
    entry("Fire Control Hit", "Targeting systems damaged; +2 to-hit per hit.", CritTarget::FireControl, Some(4)),
    entry("Engine Hit", "Engine damaged; halve thrust, a second hit destroys the unit.", CritTarget::Engine, Some(2)),
    entry("Crew Hit", "The cockpit is breached; a second hit kills the crew.", CritTarget::Crew, Some(2)),
];

static SMALL_CRAFT_TABLE: Table = [
    AMMO,
    entry("Engine Hit", "Drive damaged; a third hit leaves the vessel adrift.", CritTarget::Engine, Some(3)),
    entry("Fire Control Hit", "Targeting systems damaged; +2 to-hit per hit.", CritTarget::FireControl, Some(4)),
    no_crit(),
    arc_weapon("Weapons in a random arc destroyed; reduce that arc's damage."),
    entry("Thruster Hit", "Maneuvering thrusters damaged; -1 thrust per hit.", CritTarget::Thruster, None),
    arc_weapon("Weapons in a random arc destroyed; reduce that arc's damage."),
    no_crit(),
    entry("Fire Control Hit", "Targeting systems damaged; +2 to-hit per hit.", CritTarget::FireControl, Some(4)),
    entry("Engine Hit", "Drive damaged; a third hit leaves the vessel adrift.", CritTarget::Engine, Some(3)),
    entry("Crew Hit", "Bridge or crew quarters struck; a second hit kills the crew.", CritTarget::Crew, Some(2)),
];

static LARGE_VESSEL_TABLE: Table = [
    AMMO,
    entry("Engine Hit", "Drive damaged; a third hit leaves the vessel adrift.", CritTarget::Engine, Some(3)),
    entry("Fire Control Hit", "Targeting systems damaged; +2 to-hit per hit.", CritTarget::FireControl, Some(4)),
    no_crit(),
    arc_weapon("Weapons in a random arc and bay destroyed; reduce that column."),
    entry("Thruster Hit", "Station-keeping thrusters damaged; -1 thrust per hit.", CritTarget::Thruster, None),
    arc_weapon("Weapons in a random arc and bay destroyed; reduce that column."),
    no_crit(),
    entry("Fire Control Hit", "Targeting systems damaged; +2 to-hit per hit.", CritTarget::FireControl, Some(4)),
    entry("Engine Hit", "Drive damaged; a third hit leaves the vessel adrift.", CritTarget::Engine, Some(3)),
    entry("Crew Hit", "The bridge is struck; a second hit kills the command crew.", CritTarget::Crew, Some(2)),
];

static MOBILE_STRUCTURE_TABLE: Table = [
    AMMO,
    entry("Weapon Hit", "Weapons destroyed; reduce damage values by 1.", CritTarget::Weapon, Some(4)),
    entry("Fire Control Hit", "Targeting systems damaged; +2 to-hit per hit.", CritTarget::FireControl, Some(4)),
    no_crit(),
    entry("Weapon Hit", "Weapons destroyed; reduce damage values by 1.", CritTarget::Weapon, Some(4)),
    entry("MP Hit", "Drive sections damaged; halve movement.", CritTarget::Mp, Some(4)),
    entry("Weapon Hit", "Weapons destroyed; reduce damage values by 1.", CritTarget::Weapon, Some(4)),
    no_crit(),
    entry("Fire Control Hit", "Targeting systems damaged; +2 to-hit per hit.", CritTarget::FireControl, Some(4)),
    entry("Weapon Hit", "Weapons destroyed; reduce damage values by 1.", CritTarget::Weapon, Some(4)),
    entry("Crew Hit", "Command deck struck; a second hit kills the crew.", CritTarget::Crew, Some(2)),
];

/// Resolution table for a unit type, if it has one.
#[must_use]
pub fn table_for(type_code: UnitTypeCode) -> Option<&'static Table> {
    use UnitTypeCode as T;
    match type_code {
        T::BattleMek | T::IndustrialMek => Some(&MEK_TABLE),
        T::ProtoMek => Some(&PROTOMEK_TABLE),
        T::CombatVehicle | T::SupportVehicle => Some(&VEHICLE_TABLE),
        T::AerospaceFighter | T::ConventionalFighter => Some(&FIGHTER_TABLE),
        T::SmallCraft | T::DropShip => Some(&SMALL_CRAFT_TABLE),
        T::WarShip | T::JumpShip | T::SpaceStation => Some(&LARGE_VESSEL_TABLE),
        T::MobileStructure => Some(&MOBILE_STRUCTURE_TABLE),
        T::BattleArmor | T::Infantry => None,
    }
}

/// Consequence of a resolved critical-hit roll.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CritEffect {
    /// No lasting critical damage.
    NoEffect,
    /// One more critical hit of `key` to stage.
    Hit {
        /// Resolved ledger key, including any rolled arc.
        key: CritKey,
        /// Cap on committed hits for the key, if the table defines one.
        max_hits: Option<u8>,
    },
    /// Ammo hit fully negated by CASE II or an energy-only armament.
    AmmoNegated,
    /// Ammo hit vented by CASE: becomes one point of pending damage.
    AmmoDamage,
    /// Ammo explosion with narrative consequences; not auto-applied.
    AmmoExplosion,
}

/// A resolved roll against the table, ready to show and optionally apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CritRoll {
    /// Natural 2d6 result.
    pub roll: u8,
    /// Result after the Critical-Resistant modifier.
    pub modified: i8,
    /// Label of the resolved row.
    pub label: &'static str,
    /// Rules text of the resolved row.
    pub description: &'static str,
    /// Arc and column picked for an arc-roll entry.
    pub arc: Option<(FiringArc, WeaponColumn)>,
    /// What applying this roll would do.
    pub effect: CritEffect,
}

fn unresolved(roll: u8, modified: i8) -> CritRoll {
    let row = no_crit();
    CritRoll {
        roll,
        modified,
        label: row.label,
        description: row.description,
        arc: None,
        effect: CritEffect::NoEffect,
    }
}

/// Resolves a known 2d6 result against the unit's table.
///
/// Exposed separately from [`roll_crit`] so dialogs can honor manually
/// entered dice; only the arc pick consumes randomness here.
pub fn resolve<R: Rng + ?Sized>(template: &UnitTemplate, roll: u8, rng: &mut R) -> CritRoll {
    let mut modified = i8::try_from(roll).unwrap_or(12);
    if template.specials.contains(Specials::CRIT_RESISTANT) {
        modified -= 2;
    }
    if modified <= 1 {
        return unresolved(roll, modified);
    }
    let Some(table) = table_for(template.type_code) else {
        return unresolved(roll, modified);
    };
    let index = usize::try_from(modified.clamp(2, 12)).unwrap_or(2) - 2;
    let row = &table[index];

    let Some(target) = row.target else {
        return CritRoll {
            roll,
            modified,
            label: row.label,
            description: row.description,
            arc: None,
            effect: CritEffect::NoEffect,
        };
    };

    let (effect, arc) = match target {
        CritTarget::Ammo => (resolve_ammo(template.specials), None),
        other => {
            if row.requires_arc_roll {
                let arc = *FiringArc::ALL.choose(rng).unwrap_or(&FiringArc::Nose);
                let column = if template.type_code.has_capital_columns() {
                    *WeaponColumn::CAPITAL.choose(rng).unwrap_or(&WeaponColumn::Standard)
                } else {
                    *WeaponColumn::CONVENTIONAL.choose(rng).unwrap_or(&WeaponColumn::Standard)
                };
                (
                    CritEffect::Hit {
                        key: CritKey::Arc { arc, column },
                        max_hits: row.max_hits,
                    },
                    Some((arc, column)),
                )
            } else {
                // Non-arc targets always carry a key; Ammo was handled above.
                let key = other.key().unwrap_or(CritKey::Weapon);
                (
                    CritEffect::Hit {
                        key,
                        max_hits: row.max_hits,
                    },
                    None,
                )
            }
        }
    };

    CritRoll {
        roll,
        modified,
        label: row.label,
        description: row.description,
        arc,
        effect,
    }
}

const fn resolve_ammo(specials: Specials) -> CritEffect {
    if specials.contains(Specials::CASE2) || specials.contains(Specials::ENERGY) {
        CritEffect::AmmoNegated
    } else if specials.contains(Specials::CASE) {
        CritEffect::AmmoDamage
    } else {
        CritEffect::AmmoExplosion
    }
}

/// Rolls 2d6 and resolves against the unit's table.
pub fn roll_crit<R: Rng + ?Sized>(template: &UnitTemplate, rng: &mut R) -> CritRoll {
    let roll = rng.gen_range(1..=6) + rng.gen_range(1..=6);
    resolve(template, roll, rng)
}

/// Why a resolved roll cannot be applied to the unit right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyVeto {
    /// Movement-affecting hit, but no movement mode remains above zero.
    Immobile,
    /// Weapon hit, but every damage bracket is already at the floor.
    NoFirepower,
    /// The key is already at its table-defined cap.
    MaxHits {
        /// The capped key.
        key: CritKey,
        /// The cap.
        max: u8,
    },
    /// The arc/column pair already carries its four hits.
    ArcSaturated {
        /// Saturated firing arc.
        arc: FiringArc,
        /// Saturated weapon column.
        column: WeaponColumn,
    },
}

impl fmt::Display for ApplyVeto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immobile => write!(f, "no movement remains to lose"),
            Self::NoFirepower => write!(f, "no weapon damage remains to lose"),
            Self::MaxHits { key, max } => write!(f, "{key} is already at its {max}-hit limit"),
            Self::ArcSaturated { arc, column } => {
                write!(f, "arc {}:{} already carries four hits", arc.code(), column.code())
            }
        }
    }
}

/// Evaluates the applicability guard for a resolved roll.
///
/// Returns `None` when the roll may be applied. Counts include pending
/// records, so two staged hits cannot sneak past a cap together.
#[must_use]
pub fn cannot_apply_reason(state: &AlphaStrikeState, effect: &CritEffect) -> Option<ApplyVeto> {
    let CritEffect::Hit { key, max_hits } = effect else {
        return None;
    };
    let key = *key;
    let staged = |k: CritKey| {
        i32::try_from(state.committed_crit_hits(k)).unwrap_or(i32::MAX) + state.pending_crit_change(k)
    };

    if let CritKey::Arc { arc, column } = key {
        if staged(key) >= ARC_PAIR_MAX {
            return Some(ApplyVeto::ArcSaturated { arc, column });
        }
        return None;
    }

    if key.affects_movement() && state.effective_movement().values().all(|&inches| inches == 0) {
        return Some(ApplyVeto::Immobile);
    }
    if key == CritKey::Weapon {
        let line = state.effective_damage_line();
        let any_left = crate::template::RangeBracket::ALL
            .iter()
            .any(|&bracket| line.bracket(bracket).above_floor());
        if !any_left {
            return Some(ApplyVeto::NoFirepower);
        }
    }
    if let Some(max) = max_hits {
        if staged(key) >= i32::from(*max) {
            return Some(ApplyVeto::MaxHits { key, max: *max });
        }
    }
    None
}

/// Applies a resolved roll to the unit's pending overlay.
///
/// A key hit stages one more record on top of whatever is already
/// pending; the CASE ammo path stages one more point of damage. Negated
/// and narrative-only outcomes change nothing.
pub fn apply(outcome: &CritRoll, state: &mut AlphaStrikeState) {
    match outcome.effect {
        CritEffect::Hit { key, .. } => {
            let change = state.pending_crit_change(key);
            state.set_pending_crits(key, change + 1);
        }
        CritEffect::AmmoDamage => {
            let total = state.pending_damage_total();
            state.set_pending_damage(total + 1);
        }
        CritEffect::NoEffect | CritEffect::AmmoNegated | CritEffect::AmmoExplosion => {}
    }
}

//! Static unit data the state engine derives from.
//!
//! A [`UnitTemplate`] is the immutable "card" a unit's mutable state is
//! created against: base movement, base damage line, thrust, armor and
//! structure maxima, and special-ability flags. Catalog loading lives
//! outside this crate; templates arrive fully formed and are resolved by
//! name when persisted state is restored.

use std::collections::BTreeMap;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::ladder::DamageValue;

/// Unit type classification, as printed on the card.
///
/// The type code selects the critical-hit resolution table and drives the
/// vessel/vehicle distinctions in the effect resolvers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitTypeCode {
    /// BattleMek
    BattleMek,
    /// IndustrialMek
    IndustrialMek,
    /// ProtoMek
    ProtoMek,
    /// Combat vehicle
    CombatVehicle,
    /// Support vehicle
    SupportVehicle,
    /// Battle armor squad
    BattleArmor,
    /// Conventional infantry
    Infantry,
    /// Aerospace fighter
    AerospaceFighter,
    /// Conventional fighter
    ConventionalFighter,
    /// Small craft
    SmallCraft,
    /// DropShip
    DropShip,
    /// WarShip
    WarShip,
    /// JumpShip
    JumpShip,
    /// Space station
    SpaceStation,
    /// Mobile structure
    MobileStructure,
}

impl UnitTypeCode {
    /// Two-letter card code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::BattleMek => "BM",
            Self::IndustrialMek => "IM",
            Self::ProtoMek => "PM",
            Self::CombatVehicle => "CV",
            Self::SupportVehicle => "SV",
            Self::BattleArmor => "BA",
            Self::Infantry => "CI",
            Self::AerospaceFighter => "AF",
            Self::ConventionalFighter => "CF",
            Self::SmallCraft => "SC",
            Self::DropShip => "DS",
            Self::WarShip => "WS",
            Self::JumpShip => "JS",
            Self::SpaceStation => "SS",
            Self::MobileStructure => "MS",
        }
    }

    /// Parses a two-letter card code. Unknown codes yield `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "BM" => Some(Self::BattleMek),
            "IM" => Some(Self::IndustrialMek),
            "PM" => Some(Self::ProtoMek),
            "CV" => Some(Self::CombatVehicle),
            "SV" => Some(Self::SupportVehicle),
            "BA" => Some(Self::BattleArmor),
            "CI" => Some(Self::Infantry),
            "AF" => Some(Self::AerospaceFighter),
            "CF" => Some(Self::ConventionalFighter),
            "SC" => Some(Self::SmallCraft),
            "DS" => Some(Self::DropShip),
            "WS" => Some(Self::WarShip),
            "JS" => Some(Self::JumpShip),
            "SS" => Some(Self::SpaceStation),
            "MS" => Some(Self::MobileStructure),
            _ => None,
        }
    }

    /// Ground vehicles use the motive-hit chain instead of the mp chain.
    #[must_use]
    pub const fn is_vehicle(self) -> bool {
        matches!(self, Self::CombatVehicle | Self::SupportVehicle)
    }

    /// Vessels take three engine hits to destroy and use percentage-based
    /// thrust loss.
    #[must_use]
    pub const fn is_vessel(self) -> bool {
        matches!(
            self,
            Self::SmallCraft | Self::DropShip | Self::WarShip | Self::JumpShip | Self::SpaceStation
        )
    }

    /// Infantry units never take critical hits.
    #[must_use]
    pub const fn is_infantry(self) -> bool {
        matches!(self, Self::BattleArmor | Self::Infantry)
    }

    /// Whether the arc-roll weapon column set includes capital weapons.
    #[must_use]
    pub const fn has_capital_columns(self) -> bool {
        matches!(self, Self::WarShip | Self::JumpShip | Self::SpaceStation)
    }
}

impl fmt::Display for UnitTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Movement mode on the card.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MoveMode {
    /// Ground movement (the unsuffixed value on the card).
    Ground,
    /// Jump movement (`j` suffix).
    Jump,
    /// Underwater maneuvering (`s` suffix).
    Umu,
}

impl MoveMode {
    /// Card suffix for the mode.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Ground => "",
            Self::Jump => "j",
            Self::Umu => "s",
        }
    }
}

/// Range bracket for the damage line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RangeBracket {
    /// Short range
    Short,
    /// Medium range
    Medium,
    /// Long range
    Long,
    /// Extreme range
    Extreme,
}

impl RangeBracket {
    /// All brackets in card order.
    pub const ALL: [Self; 4] = [Self::Short, Self::Medium, Self::Long, Self::Extreme];
}

/// Firing arc for large-vessel weapon criticals.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FiringArc {
    /// Nose arc
    Nose,
    /// Left side arc
    LeftSide,
    /// Right side arc
    RightSide,
    /// Aft arc
    Aft,
}

impl FiringArc {
    /// All four arcs, in roll order.
    pub const ALL: [Self; 4] = [Self::Nose, Self::LeftSide, Self::RightSide, Self::Aft];

    /// Stable wire code used in persisted crit keys.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftSide => "ls",
            Self::RightSide => "rs",
            Self::Aft => "aft",
        }
    }

    /// Parses a wire code. Unknown codes yield `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|arc| arc.code() == code)
    }
}

/// Weapon damage column within a firing arc.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeaponColumn {
    /// Standard-scale weapons
    Standard,
    /// Capital-scale weapons
    Capital,
    /// Sub-capital weapons
    SubCapital,
    /// Capital missiles
    Missile,
}

impl WeaponColumn {
    /// Columns rolled for units with capital weapon lines.
    pub const CAPITAL: [Self; 4] = [Self::Standard, Self::Capital, Self::SubCapital, Self::Missile];

    /// Columns rolled for units without capital weapon lines.
    pub const CONVENTIONAL: [Self; 3] = [Self::Standard, Self::SubCapital, Self::Missile];

    /// Stable wire code used in persisted crit keys.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Standard => "std",
            Self::Capital => "cap",
            Self::SubCapital => "scap",
            Self::Missile => "msl",
        }
    }

    /// Parses a wire code. Unknown codes yield `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::CAPITAL.into_iter().find(|col| col.code() == code)
    }
}

bitflags! {
    /// Special abilities that alter critical-hit handling.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct Specials: u32 {
        /// Cellular ammunition storage: an ammo hit becomes +1 damage.
        const CASE = 1;
        /// Improved cellular ammunition storage: ammo hits are negated.
        const CASE2 = 1 << 1;
        /// Energy-only armament: ammo hits are negated.
        const ENERGY = 1 << 2;
        /// Critical-resistant construction: -2 on the crit roll.
        const CRIT_RESISTANT = 1 << 3;
    }
}

/// Damage line: one ladder value per range bracket.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageLine {
    /// Short-range value
    pub short: DamageValue,
    /// Medium-range value
    pub medium: DamageValue,
    /// Long-range value
    pub long: DamageValue,
    /// Extreme-range value
    pub extreme: DamageValue,
}

impl DamageLine {
    /// Value for a bracket.
    #[must_use]
    pub const fn bracket(&self, bracket: RangeBracket) -> DamageValue {
        match bracket {
            RangeBracket::Short => self.short,
            RangeBracket::Medium => self.medium,
            RangeBracket::Long => self.long,
            RangeBracket::Extreme => self.extreme,
        }
    }
}

/// The immutable base card a unit's mutable state derives from.
///
/// Everything here is fixed for the life of the unit; the ledgers only
/// ever record deviation from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTemplate {
    /// Catalog name, unique within a data set. Persisted state references
    /// the template by this name.
    pub name: String,
    /// Unit type classification.
    pub type_code: UnitTypeCode,
    /// Maximum armor pips.
    pub max_armor: u16,
    /// Maximum structure pips.
    pub max_structure: u16,
    /// Base thrust for aerospace units; `0` for everything else.
    pub base_thrust: u8,
    /// Base movement in inches per mode. Modes absent from the map do not
    /// exist for this unit.
    pub movement: BTreeMap<MoveMode, u16>,
    /// Base damage line.
    pub damage: DamageLine,
    /// Special-ability flags.
    pub specials: Specials,
}

impl UnitTemplate {
    /// Creates a template with the given name and type and everything else
    /// zeroed. Tests and callers fill in the fields they need.
    #[must_use]
    pub fn new(name: impl Into<String>, type_code: UnitTypeCode) -> Self {
        Self {
            name: name.into(),
            type_code,
            max_armor: 0,
            max_structure: 0,
            base_thrust: 0,
            movement: BTreeMap::new(),
            damage: DamageLine::default(),
            specials: Specials::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_round_trip() {
        for code in [
            UnitTypeCode::BattleMek,
            UnitTypeCode::CombatVehicle,
            UnitTypeCode::WarShip,
            UnitTypeCode::Infantry,
            UnitTypeCode::MobileStructure,
        ] {
            assert_eq!(UnitTypeCode::from_code(code.code()), Some(code));
        }
        assert_eq!(UnitTypeCode::from_code("ZZ"), None);
    }

    #[test]
    fn classification_predicates() {
        assert!(UnitTypeCode::CombatVehicle.is_vehicle());
        assert!(!UnitTypeCode::BattleMek.is_vehicle());
        assert!(UnitTypeCode::DropShip.is_vessel());
        assert!(!UnitTypeCode::AerospaceFighter.is_vessel());
        assert!(UnitTypeCode::BattleArmor.is_infantry());
        assert!(UnitTypeCode::WarShip.has_capital_columns());
        assert!(!UnitTypeCode::DropShip.has_capital_columns());
    }

    #[test]
    fn arc_and_column_codes_round_trip() {
        for arc in FiringArc::ALL {
            assert_eq!(FiringArc::from_code(arc.code()), Some(arc));
        }
        for col in WeaponColumn::CAPITAL {
            assert_eq!(WeaponColumn::from_code(col.code()), Some(col));
        }
    }

    #[test]
    fn damage_line_bracket_access() {
        let line = DamageLine {
            short: DamageValue::Value(4),
            medium: DamageValue::Value(3),
            long: DamageValue::Value(2),
            extreme: DamageValue::Absent,
        };
        assert_eq!(line.bracket(RangeBracket::Short), DamageValue::Value(4));
        assert_eq!(line.bracket(RangeBracket::Extreme), DamageValue::Absent);
    }

    #[test]
    fn template_serde_round_trip() {
        let mut template = UnitTemplate::new("Ostscout OTT-7J", UnitTypeCode::BattleMek);
        template.max_armor = 3;
        template.max_structure = 2;
        template.movement.insert(MoveMode::Ground, 14);
        template.movement.insert(MoveMode::Jump, 14);
        template.specials = Specials::ENERGY;

        let json = serde_json::to_string(&template).unwrap();
        let back: UnitTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(template, back);
    }
}

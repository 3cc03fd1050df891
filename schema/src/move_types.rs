use crate::{ElementType, SideCondition, Terrain, Weather};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumDiscriminants;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

impl fmt::Display for MoveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveCategory::Physical => write!(f, "Physical"),
            MoveCategory::Special => write!(f, "Special"),
            MoveCategory::Status => write!(f, "Status"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatType {
    Hp,
    Atk,
    Def,
    SpAtk,
    SpDef,
    Spe,
    Acc,
    Eva,
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatType::Hp => write!(f, "HP"),
            StatType::Atk => write!(f, "Attack"),
            StatType::Def => write!(f, "Defense"),
            StatType::SpAtk => write!(f, "Special Attack"),
            StatType::SpDef => write!(f, "Special Defense"),
            StatType::Spe => write!(f, "Speed"),
            StatType::Acc => write!(f, "Accuracy"),
            StatType::Eva => write!(f, "Evasion"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    User,
    Target,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::User => write!(f, "User"),
            Target::Target => write!(f, "Target"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusType {
    Burn,
    Paralysis,
    Sleep,
    Poison,
    BadlyPoisoned,
    Freeze,
}

impl StatusType {
    /// Element types that can never receive this status.
    pub fn immune_types(&self) -> &'static [ElementType] {
        match self {
            StatusType::Burn => &[ElementType::Fire],
            StatusType::Paralysis => &[ElementType::Electric],
            StatusType::Freeze => &[ElementType::Ice],
            StatusType::Poison | StatusType::BadlyPoisoned => {
                &[ElementType::Poison, ElementType::Steel]
            }
            StatusType::Sleep => &[],
        }
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusType::Burn => write!(f, "burned"),
            StatusType::Paralysis => write!(f, "paralyzed"),
            StatusType::Sleep => write!(f, "asleep"),
            StatusType::Poison => write!(f, "poisoned"),
            StatusType::BadlyPoisoned => write!(f, "badly poisoned"),
            StatusType::Freeze => write!(f, "frozen"),
        }
    }
}

/// Which slots a move reaches when it is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetScope {
    User,
    #[default]
    SingleTarget,
    AllOpponents,
    AllOthers,
    AllAllies,
    UserSide,
    OpponentSide,
    EntireField,
}

impl TargetScope {
    /// Spread moves hit several slots at once.
    pub fn is_spread(&self) -> bool {
        matches!(
            self,
            TargetScope::AllOpponents | TargetScope::AllOthers | TargetScope::AllAllies
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemiInvulnerableLocation {
    Underground,
    InAir,
    Underwater,
    Vanished,
}

impl fmt::Display for SemiInvulnerableLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemiInvulnerableLocation::Underground => write!(f, "underground"),
            SemiInvulnerableLocation::InAir => write!(f, "in the air"),
            SemiInvulnerableLocation::Underwater => write!(f, "underwater"),
            SemiInvulnerableLocation::Vanished => write!(f, "out of sight"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(name(EffectKind), derive(Hash))]
pub enum MoveEffect {
    // Damage
    Damage,           // pipeline damage against every target
    MultiHit(u8, u8), // min hits, max hits
    Recoil(u8),       // % of damage dealt
    Drain(u8),        // % of damage dealt

    // Status
    Status(StatusType, u8), // status, chance %
    CureStatus(Target),
    Flinch(u8), // chance %

    // Stat changes
    StatChange(Target, StatType, i8, u8), // target, stat, stages, chance %

    // Utility
    Heal(u8), // % of max HP

    // Field effects
    SetSideCondition(Target, SideCondition, u8), // side, condition, turns
    ClearSideCondition(Target, SideCondition),
    SetWeather(Weather, Option<u8>), // None lasts until cleared
    SetTerrain(Terrain, u8),

    // Multi-turn and defensive mechanics
    Protect,
    ChargeUp,
    SemiInvulnerable(SemiInvulnerableLocation),
    Focus,

    // Named hook for content with no built-in processor
    Scripted(String),
}

impl MoveEffect {
    pub fn kind(&self) -> EffectKind {
        EffectKind::from(self)
    }

    /// Effects applied once per hit target rather than once per use.
    pub fn applies_per_target(&self) -> bool {
        match self {
            MoveEffect::Status(..) | MoveEffect::Flinch(_) => true,
            MoveEffect::StatChange(target, ..) | MoveEffect::CureStatus(target) => {
                *target == Target::Target
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveFlags {
    pub contact: bool,
    pub bypasses_protection: bool,
    pub cannot_crit: bool,
    pub crit_stage: u8,
    pub punishes_switch: bool,
    pub hits_semi_invulnerable: Vec<SemiInvulnerableLocation>,
    pub skips_charge_in: Vec<Weather>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub name: String,
    pub element: ElementType,
    pub category: MoveCategory,
    #[serde(default)]
    pub power: Option<u16>,
    #[serde(default)]
    pub accuracy: Option<u8>, // None never misses
    pub max_pp: u8,
    #[serde(default)]
    pub priority: i8,
    #[serde(default)]
    pub target: TargetScope,
    #[serde(default)]
    pub effects: Vec<MoveEffect>,
    #[serde(default)]
    pub flags: MoveFlags,
}

impl MoveData {
    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|effect| effect.kind() == kind)
    }

    pub fn deals_damage(&self) -> bool {
        self.category != MoveCategory::Status && self.has_effect(EffectKind::Damage)
    }

    /// Two-turn moves: charging moves and semi-invulnerable moves.
    pub fn is_two_turn(&self) -> bool {
        self.has_effect(EffectKind::ChargeUp) || self.semi_invulnerable_location().is_some()
    }

    pub fn semi_invulnerable_location(&self) -> Option<SemiInvulnerableLocation> {
        self.effects.iter().find_map(|effect| match effect {
            MoveEffect::SemiInvulnerable(location) => Some(*location),
            _ => None,
        })
    }

    /// Inclusive hit-count range; single-hit moves report (1, 1).
    pub fn hit_range(&self) -> (u8, u8) {
        self.effects
            .iter()
            .find_map(|effect| match effect {
                MoveEffect::MultiHit(min, max) => Some(((*min).max(1), (*max).max(*min).max(1))),
                _ => None,
            })
            .unwrap_or((1, 1))
    }
}

impl fmt::Display for MoveData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

use crate::ElementType;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Adaptability,
    Blaze,
    Torrent,
    Overgrow,
    Swarm,
    SwiftSwim,
    Chlorophyll,
    SandRush,
    SlushRush,
    HugePower,
    Technician,
    RoughSkin,
    Levitate,
    Limber,
    Insomnia,
    InnerFocus,
    Truant,
}

impl Ability {
    /// The element a pinch ability boosts at low HP.
    pub fn pinch_element(&self) -> Option<ElementType> {
        match self {
            Ability::Blaze => Some(ElementType::Fire),
            Ability::Torrent => Some(ElementType::Water),
            Ability::Overgrow => Some(ElementType::Grass),
            Ability::Swarm => Some(ElementType::Bug),
            _ => None,
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Item {
    ChoiceBand,
    ChoiceSpecs,
    ChoiceScarf,
    AssaultVest,
    LifeOrb,
    ExpertBelt,
    TypeBoost(ElementType), // x1.2 to moves of the element
    RockyHelmet,
    ShellBell,
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::ChoiceBand => write!(f, "Choice Band"),
            Item::ChoiceSpecs => write!(f, "Choice Specs"),
            Item::ChoiceScarf => write!(f, "Choice Scarf"),
            Item::AssaultVest => write!(f, "Assault Vest"),
            Item::LifeOrb => write!(f, "Life Orb"),
            Item::ExpertBelt => write!(f, "Expert Belt"),
            Item::TypeBoost(element) => write!(f, "{} Plate", element),
            Item::RockyHelmet => write!(f, "Rocky Helmet"),
            Item::ShellBell => write!(f, "Shell Bell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub sp_attack: u8,
    pub sp_defense: u8,
    pub speed: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub name: String,
    pub types: Vec<ElementType>,
    pub base_stats: BaseStats,
    #[serde(default)]
    pub ability: Option<Ability>,
}

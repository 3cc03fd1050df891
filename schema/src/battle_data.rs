use crate::{ElementType, MoveCategory};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conditions that cover one whole side of the field for a number of turns.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Copy)]
pub enum SideCondition {
    Reflect,
    LightScreen,
    AuroraVeil,
    Tailwind,
    Mist,
    Safeguard,
}

impl SideCondition {
    /// Weather that must be active for the condition to be set. Empty means no requirement.
    pub fn required_weather(&self) -> &'static [Weather] {
        match self {
            SideCondition::AuroraVeil => &[Weather::Hail],
            _ => &[],
        }
    }

    /// Whether this condition is a screen against the given move category.
    pub fn screens(&self, category: MoveCategory) -> bool {
        match self {
            SideCondition::Reflect => category == MoveCategory::Physical,
            SideCondition::LightScreen => category == MoveCategory::Special,
            SideCondition::AuroraVeil => category != MoveCategory::Status,
            _ => false,
        }
    }
}

impl fmt::Display for SideCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            SideCondition::Reflect => "Reflect",
            SideCondition::LightScreen => "Light Screen",
            SideCondition::AuroraVeil => "Aurora Veil",
            SideCondition::Tailwind => "Tailwind",
            SideCondition::Mist => "Mist",
            SideCondition::Safeguard => "Safeguard",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Copy)]
pub enum Weather {
    Sun,
    Rain,
    Sandstorm,
    Hail,
    HarshSunlight,
    HeavyRain,
}

impl Weather {
    /// Primal weather lasts until cleared and cannot be replaced by ordinary weather.
    pub fn is_primal(&self) -> bool {
        matches!(self, Weather::HarshSunlight | Weather::HeavyRain)
    }

    pub fn is_sunny(&self) -> bool {
        matches!(self, Weather::Sun | Weather::HarshSunlight)
    }

    pub fn is_rainy(&self) -> bool {
        matches!(self, Weather::Rain | Weather::HeavyRain)
    }

    /// The element this weather wipes out entirely, if any.
    pub fn nullified_element(&self) -> Option<ElementType> {
        match self {
            Weather::HarshSunlight => Some(ElementType::Water),
            Weather::HeavyRain => Some(ElementType::Fire),
            _ => None,
        }
    }

    /// Element types that take no end-of-turn chip damage from this weather.
    pub fn chip_immune_types(&self) -> &'static [ElementType] {
        match self {
            Weather::Sandstorm => &[ElementType::Rock, ElementType::Ground, ElementType::Steel],
            Weather::Hail => &[ElementType::Ice],
            _ => &[],
        }
    }

    pub fn deals_chip_damage(&self) -> bool {
        matches!(self, Weather::Sandstorm | Weather::Hail)
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Weather::Sun => "harsh sunlight",
            Weather::Rain => "rain",
            Weather::Sandstorm => "sandstorm",
            Weather::Hail => "hail",
            Weather::HarshSunlight => "extremely harsh sunlight",
            Weather::HeavyRain => "heavy rain",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Copy)]
pub enum Terrain {
    Electric,
    Grassy,
    Psychic,
    Misty,
}

impl Terrain {
    /// Element boosted for grounded attackers.
    pub fn boosted_element(&self) -> Option<ElementType> {
        match self {
            Terrain::Electric => Some(ElementType::Electric),
            Terrain::Grassy => Some(ElementType::Grass),
            Terrain::Psychic => Some(ElementType::Psychic),
            Terrain::Misty => None,
        }
    }

    /// Element weakened when it hits a grounded defender.
    pub fn weakened_element(&self) -> Option<ElementType> {
        match self {
            Terrain::Misty => Some(ElementType::Dragon),
            _ => None,
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Terrain::Electric => "Electric Terrain",
            Terrain::Grassy => "Grassy Terrain",
            Terrain::Psychic => "Psychic Terrain",
            Terrain::Misty => "Misty Terrain",
        };
        write!(f, "{}", display_name)
    }
}

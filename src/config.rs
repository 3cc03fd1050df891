use crate::battle::state::SideId;
use crate::errors::{BattleError, BattleResult, CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MAX_SLOTS_PER_SIDE: usize = 3;

/// Format-level settings for one battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleRules {
    pub slots_per_side: usize,
    pub turn_limit: Option<u32>,
    pub boss: Option<BossRules>,
    /// Per-target damage multiplier for spread moves in multi-slot formats.
    pub spread_multiplier: f64,
    /// Screen multiplier when a side has more than one slot.
    pub multi_screen_multiplier: f64,
}

/// A side whose combatants have their battle stats scaled up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossRules {
    pub side: SideId,
    pub stat_multiplier: f64,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            slots_per_side: 1,
            turn_limit: None,
            boss: None,
            spread_multiplier: 0.75,
            multi_screen_multiplier: 2732.0 / 4096.0,
        }
    }
}

impl BattleRules {
    pub fn singles() -> Self {
        Self::default()
    }

    pub fn doubles() -> Self {
        Self {
            slots_per_side: 2,
            ..Self::default()
        }
    }

    pub fn multi_slot(&self) -> bool {
        self.slots_per_side > 1
    }

    /// Stat multiplier for combatants on `side`, 1.0 unless that side is the boss.
    pub fn boss_multiplier(&self, side: SideId) -> f64 {
        match &self.boss {
            Some(boss) if boss.side == side => boss.stat_multiplier,
            _ => 1.0,
        }
    }

    pub fn validate(&self) -> BattleResult<()> {
        if self.slots_per_side == 0 || self.slots_per_side > MAX_SLOTS_PER_SIDE {
            return Err(BattleError::InvalidRules(format!(
                "slots_per_side must be between 1 and {}, got {}",
                MAX_SLOTS_PER_SIDE, self.slots_per_side
            )));
        }
        if self.turn_limit == Some(0) {
            return Err(BattleError::InvalidRules(
                "turn_limit must be at least 1".to_string(),
            ));
        }
        if let Some(boss) = &self.boss {
            if !(boss.stat_multiplier > 0.0) {
                return Err(BattleError::InvalidRules(format!(
                    "boss stat multiplier must be positive, got {}",
                    boss.stat_multiplier
                )));
            }
        }
        for (name, value) in [
            ("spread_multiplier", self.spread_multiplier),
            ("multi_screen_multiplier", self.multi_screen_multiplier),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(BattleError::InvalidRules(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn from_ron_str(source: &str) -> CatalogResult<Self> {
        let rules: BattleRules = ron::from_str(source)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn load(path: &Path) -> CatalogResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }
}

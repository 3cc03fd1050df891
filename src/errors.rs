use crate::battle::state::{CombatantId, SlotRef};
use schema::StatType;
use std::path::PathBuf;
use thiserror::Error;

/// Precondition violations raised by the battle engine.
///
/// These are programmer-usage errors: a caller handed the engine a reference
/// or value that can never be valid. Ordinary game-state no-ops (an empty slot,
/// a fainted target, a blocked status) are never reported through this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("slot {slot} does not exist on this field")]
    InvalidSlot { slot: SlotRef },

    #[error("combatant handle {id:?} is not part of the party for {slot}")]
    InvalidCombatant { slot: SlotRef, id: CombatantId },

    #[error("move index {index} is out of range for the combatant in {slot}")]
    InvalidMoveIndex { slot: SlotRef, index: usize },

    #[error("{operation} amount must not be negative (got {amount})")]
    NegativeAmount { operation: &'static str, amount: i32 },

    #[error("the {stat} stat has no stage to modify")]
    HpStageModification { stat: StatType },

    #[error("invalid battle rules: {0}")]
    InvalidRules(String),
}

/// Failures while loading catalogs and rule files.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("unknown move `{0}`")]
    UnknownMove(String),

    #[error("unknown species `{0}`")]
    UnknownSpecies(String),

    #[error("duplicate catalog entry `{0}`")]
    Duplicate(String),

    #[error(transparent)]
    Rules(#[from] BattleError),
}

pub type BattleResult<T> = Result<T, BattleError>;
pub type CatalogResult<T> = Result<T, CatalogError>;

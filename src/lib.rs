//! Turn resolution engine for multi-combatant, turn-based battles.
//!
//! Given the actions both sides chose for a turn, the engine orders them,
//! runs the damage formula and move effects, mutates combatant state and
//! records what happened so a view can replay it afterwards.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod catalog;
pub mod config;
pub mod errors;

// --- PUBLIC API RE-EXPORTS ---

// Content records from the `schema` crate.
pub use schema::{
    Ability, BaseStats, EffectKind, ElementType, Item, MoveCategory, MoveData, MoveEffect,
    MoveFlags, SideCondition, SpeciesData, StatType, StatusType, Target, TargetScope, Terrain,
    Weather,
};

// Engine composition root and turn results.
pub use battle::action_queue::{LoggedAction, TurnLog};
pub use battle::actions::Action;
pub use battle::damage::{DamageOverrides, DamagePipeline};
pub use battle::engine::BattleEngine;
pub use battle::events::{BattleEvent, BattleOutcome, BattleStatistics, EventBus};
pub use battle::move_effects::EffectRegistry;
pub use battle::turn_order::TurnOrderResolver;

// Battle state.
pub use battle::combatant::{Combatant, CombatantStats, StatusCondition};
pub use battle::state::{CombatantId, Field, SideId, SlotRef};

// Collaborators.
pub use battle::rng::{RandomSource, ScriptedRng, SeededRng};
pub use battle::view::{BattleView, NullView, RecordingView};

pub use catalog::Catalog;
pub use config::BattleRules;
pub use errors::{BattleError, BattleResult, CatalogError, CatalogResult};

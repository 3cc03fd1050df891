mod damage_effects;
mod field_effects;
mod special_effects;
mod stat_effects;
mod status_effects;

use crate::battle::actions::Action;
use crate::battle::context::BattleContext;
use crate::battle::state::{Field, SlotRef};
use crate::errors::BattleResult;
use schema::{EffectKind, MoveData, MoveEffect, Target, TargetScope};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

pub use self::damage_effects::{strike, StrikeResult};
use self::{damage_effects::*, field_effects::*, special_effects::*, stat_effects::*, status_effects::*};

/// What a handler knows about the move use it is part of.
#[derive(Debug, Clone)]
pub struct EffectContext {
    pub user: SlotRef,
    /// The hit target for per-target effects, the primary target otherwise.
    pub target: SlotRef,
    pub move_data: Arc<MoveData>,
    /// Damage dealt so far by this use, across every target and hit.
    pub damage_dealt: u32,
    pub spread_multiplier: f64,
    /// Targets the damage could not touch at all.
    pub immune: Vec<SlotRef>,
}

impl EffectContext {
    pub fn resolve(&self, target: Target) -> SlotRef {
        match target {
            Target::User => self.user,
            Target::Target => self.target,
        }
    }
}

pub type EffectHandler =
    fn(&MoveEffect, &mut EffectContext, &mut BattleContext) -> BattleResult<Vec<Action>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveOutcome {
    pub follow_ups: Vec<Action>,
    pub damage_dealt: u32,
}

/// Effect-kind keyed dispatch table.
///
/// Kinds with no registered handler are skipped. The state-machine effects
/// (charging, semi-invulnerability, focus) and multi-hit counts are read by
/// move use and the damage handler directly and have no handler of their own.
#[derive(Clone, Default)]
pub struct EffectRegistry {
    handlers: HashMap<EffectKind, EffectHandler>,
}

impl EffectRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in handler.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(EffectKind::Damage, apply_damage);
        registry.register(EffectKind::Recoil, apply_recoil);
        registry.register(EffectKind::Drain, apply_drain);
        registry.register(EffectKind::Heal, apply_heal);
        registry.register(EffectKind::Status, apply_status);
        registry.register(EffectKind::CureStatus, apply_cure_status);
        registry.register(EffectKind::Flinch, apply_flinch);
        registry.register(EffectKind::StatChange, apply_stat_change);
        registry.register(EffectKind::SetSideCondition, apply_set_side_condition);
        registry.register(EffectKind::ClearSideCondition, apply_clear_side_condition);
        registry.register(EffectKind::SetWeather, apply_set_weather);
        registry.register(EffectKind::SetTerrain, apply_set_terrain);
        registry.register(EffectKind::Protect, apply_protect);
        registry
    }

    pub fn register(&mut self, kind: EffectKind, handler: EffectHandler) {
        self.handlers.insert(kind, handler);
    }

    pub fn unregister(&mut self, kind: EffectKind) -> Option<EffectHandler> {
        self.handlers.remove(&kind)
    }

    pub fn handler(&self, kind: EffectKind) -> Option<EffectHandler> {
        self.handlers.get(&kind).copied()
    }

    pub fn is_registered(&self, kind: EffectKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Apply a move's effects to the targets it connected with.
    ///
    /// Damage runs first, once per target, so that effects reading the damage
    /// dealt see the full total. Everything else follows in declaration order.
    /// A target the damage could not touch takes none of the move's other
    /// effects, and a move that touched none of its targets stops there.
    pub fn process_move(
        &self,
        user: SlotRef,
        targets: &[SlotRef],
        move_data: &Arc<MoveData>,
        ctx: &mut BattleContext,
    ) -> BattleResult<MoveOutcome> {
        let spread_multiplier = if move_data.target.is_spread() && ctx.field.rules.multi_slot() {
            ctx.field.rules.spread_multiplier
        } else {
            1.0
        };
        let primary = targets.first().copied().unwrap_or(user);
        let mut effect_ctx = EffectContext {
            user,
            target: primary,
            move_data: Arc::clone(move_data),
            damage_dealt: 0,
            spread_multiplier,
            immune: Vec::new(),
        };
        let mut follow_ups = Vec::new();

        let damage_effect = move_data
            .effects
            .iter()
            .find(|effect| effect.kind() == EffectKind::Damage);
        if let (Some(effect), Some(handler)) = (damage_effect, self.handler(EffectKind::Damage)) {
            for target in targets {
                effect_ctx.target = *target;
                follow_ups.extend(handler(effect, &mut effect_ctx, ctx)?);
            }
        }

        let reachable: Vec<SlotRef> = targets
            .iter()
            .copied()
            .filter(|target| !effect_ctx.immune.contains(target))
            .collect();
        if reachable.is_empty() && !targets.is_empty() {
            debug!(move_name = %move_data.name, "no target could be affected");
            return Ok(MoveOutcome {
                follow_ups,
                damage_dealt: effect_ctx.damage_dealt,
            });
        }

        for effect in &move_data.effects {
            let kind = effect.kind();
            if kind == EffectKind::Damage {
                continue;
            }
            let Some(handler) = self.handler(kind) else {
                trace!(?kind, move_name = %move_data.name, "no handler registered, skipping");
                continue;
            };
            if effect.applies_per_target() {
                for target in &reachable {
                    effect_ctx.target = *target;
                    follow_ups.extend(handler(effect, &mut effect_ctx, ctx)?);
                }
            } else {
                effect_ctx.target = primary;
                follow_ups.extend(handler(effect, &mut effect_ctx, ctx)?);
            }
        }

        Ok(MoveOutcome {
            follow_ups,
            damage_dealt: effect_ctx.damage_dealt,
        })
    }
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Slots a move used from `user` aims at.
///
/// A single-target move whose chosen slot is empty falls back to the first
/// living opponent. Side and field scoped moves resolve to the user.
pub fn resolve_targets(
    field: &Field,
    user: SlotRef,
    scope: TargetScope,
    chosen: Option<SlotRef>,
) -> BattleResult<Vec<SlotRef>> {
    if let Some(chosen) = chosen {
        field.validate_slot(chosen)?;
    }
    let targets = match scope {
        TargetScope::User
        | TargetScope::UserSide
        | TargetScope::OpponentSide
        | TargetScope::EntireField => vec![user],
        TargetScope::SingleTarget => match chosen {
            Some(chosen) if chosen != user && field.is_living(chosen) => vec![chosen],
            _ => field.opponents_of(user).into_iter().take(1).collect(),
        },
        TargetScope::AllOpponents => field.opponents_of(user),
        TargetScope::AllAllies => field.allies_of(user),
        TargetScope::AllOthers => field
            .occupied_slots()
            .into_iter()
            .filter(|slot| *slot != user)
            .collect(),
    };
    Ok(targets)
}

use super::EffectContext;
use crate::battle::actions::Action;
use crate::battle::conditions::VolatileFlags;
use crate::battle::context::BattleContext;
use crate::battle::events::BattleEvent;
use crate::errors::BattleResult;
use schema::{Ability, MoveEffect};

pub fn apply_status(
    effect: &MoveEffect,
    effect_ctx: &mut EffectContext,
    ctx: &mut BattleContext,
) -> BattleResult<Vec<Action>> {
    let MoveEffect::Status(status, chance) = effect else {
        return Ok(vec![]);
    };
    let target = effect_ctx.target;
    if !ctx.field.is_living(target) || !ctx.rng.chance(*chance, "status chance") {
        return Ok(vec![]);
    }
    Ok(vec![Action::SetStatus {
        target,
        status: Some(*status),
        source: Some(effect_ctx.user),
    }])
}

pub fn apply_cure_status(
    effect: &MoveEffect,
    effect_ctx: &mut EffectContext,
    _ctx: &mut BattleContext,
) -> BattleResult<Vec<Action>> {
    let MoveEffect::CureStatus(target) = effect else {
        return Ok(vec![]);
    };
    Ok(vec![Action::SetStatus {
        target: effect_ctx.resolve(*target),
        status: None,
        source: Some(effect_ctx.user),
    }])
}

/// Flinch lands directly on the target's slot; it only matters if the target
/// has not acted yet this turn.
pub fn apply_flinch(
    effect: &MoveEffect,
    effect_ctx: &mut EffectContext,
    ctx: &mut BattleContext,
) -> BattleResult<Vec<Action>> {
    let MoveEffect::Flinch(chance) = effect else {
        return Ok(vec![]);
    };
    let target = effect_ctx.target;
    if target == effect_ctx.user {
        return Ok(vec![]);
    }
    let Some(combatant) = ctx.field.living_combatant(target)? else {
        return Ok(vec![]);
    };
    if combatant.has_ability(Ability::InnerFocus) {
        return Ok(vec![]);
    }
    let name = combatant.name.clone();
    if !ctx.rng.chance(*chance, "flinch chance") {
        return Ok(vec![]);
    }
    ctx.field
        .slot_mut(target)?
        .volatiles
        .insert(VolatileFlags::FLINCH);
    ctx.emit(BattleEvent::VolatileApplied {
        target,
        name,
        flag: VolatileFlags::FLINCH,
    });
    Ok(vec![])
}

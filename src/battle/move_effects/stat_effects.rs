use super::EffectContext;
use crate::battle::actions::Action;
use crate::battle::context::BattleContext;
use crate::errors::BattleResult;
use schema::MoveEffect;

pub fn apply_stat_change(
    effect: &MoveEffect,
    effect_ctx: &mut EffectContext,
    ctx: &mut BattleContext,
) -> BattleResult<Vec<Action>> {
    let MoveEffect::StatChange(target, stat, stages, chance) = effect else {
        return Ok(vec![]);
    };
    let target = effect_ctx.resolve(*target);
    if !ctx.field.is_living(target) || !ctx.rng.chance(*chance, "stat change chance") {
        return Ok(vec![]);
    }
    Ok(vec![Action::StatStage {
        target,
        stat: *stat,
        delta: *stages as i32,
        source: Some(effect_ctx.user),
    }])
}

use super::EffectContext;
use crate::battle::actions::{Action, SideConditionChange, TerrainChange, WeatherChange};
use crate::battle::context::BattleContext;
use crate::battle::state::SideId;
use crate::errors::BattleResult;
use schema::{MoveEffect, Target};

fn side_for(effect_ctx: &EffectContext, target: Target) -> SideId {
    match target {
        Target::User => effect_ctx.user.side,
        Target::Target => effect_ctx.user.side.opponent(),
    }
}

pub fn apply_set_side_condition(
    effect: &MoveEffect,
    effect_ctx: &mut EffectContext,
    _ctx: &mut BattleContext,
) -> BattleResult<Vec<Action>> {
    let MoveEffect::SetSideCondition(target, condition, turns) = effect else {
        return Ok(vec![]);
    };
    Ok(vec![Action::SideCondition {
        side: side_for(effect_ctx, *target),
        condition: *condition,
        change: SideConditionChange::Set { turns: *turns },
    }])
}

pub fn apply_clear_side_condition(
    effect: &MoveEffect,
    effect_ctx: &mut EffectContext,
    _ctx: &mut BattleContext,
) -> BattleResult<Vec<Action>> {
    let MoveEffect::ClearSideCondition(target, condition) = effect else {
        return Ok(vec![]);
    };
    Ok(vec![Action::SideCondition {
        side: side_for(effect_ctx, *target),
        condition: *condition,
        change: SideConditionChange::Clear,
    }])
}

pub fn apply_set_weather(
    effect: &MoveEffect,
    _effect_ctx: &mut EffectContext,
    _ctx: &mut BattleContext,
) -> BattleResult<Vec<Action>> {
    let MoveEffect::SetWeather(weather, turns) = effect else {
        return Ok(vec![]);
    };
    Ok(vec![Action::Weather(WeatherChange::Set {
        weather: *weather,
        turns: *turns,
    })])
}

pub fn apply_set_terrain(
    effect: &MoveEffect,
    _effect_ctx: &mut EffectContext,
    _ctx: &mut BattleContext,
) -> BattleResult<Vec<Action>> {
    let MoveEffect::SetTerrain(terrain, turns) = effect else {
        return Ok(vec![]);
    };
    Ok(vec![Action::Terrain(TerrainChange::Set {
        terrain: *terrain,
        turns: *turns,
    })])
}

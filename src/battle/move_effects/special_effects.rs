use super::EffectContext;
use crate::battle::actions::Action;
use crate::battle::conditions::VolatileFlags;
use crate::battle::context::BattleContext;
use crate::battle::events::{BattleEvent, FailureReason};
use crate::errors::BattleResult;
use schema::MoveEffect;
use tracing::debug;

// Odds stop shrinking past 1/3^6.
const MAX_PROTECT_EXPONENT: u8 = 6;

/// Consecutive protections succeed with probability 1/3^n, where n is the
/// number of protections that already succeeded in a row.
pub fn apply_protect(
    _effect: &MoveEffect,
    effect_ctx: &mut EffectContext,
    ctx: &mut BattleContext,
) -> BattleResult<Vec<Action>> {
    let user = effect_ctx.user;
    if !ctx.field.is_living(user) {
        return Ok(vec![]);
    }
    let name = ctx.name_at(user);
    let streak = ctx.field.slot(user)?.protect_streak;
    let succeeded = streak == 0 || {
        let odds = 3u32.pow(streak.min(MAX_PROTECT_EXPONENT) as u32);
        ctx.rng.int_range(1, odds, "protect success") == 1
    };
    debug!(%user, streak, succeeded, "protect attempt");

    let slot = ctx.field.slot_mut(user)?;
    if succeeded {
        slot.volatiles.insert(VolatileFlags::PROTECTED);
        slot.protect_streak = slot.protect_streak.saturating_add(1);
        ctx.emit(BattleEvent::VolatileApplied {
            target: user,
            name,
            flag: VolatileFlags::PROTECTED,
        });
    } else {
        slot.protect_streak = 0;
        ctx.emit(BattleEvent::ActionFailed {
            actor: user,
            name,
            reason: FailureReason::ProtectFailed,
        });
    }
    Ok(vec![])
}

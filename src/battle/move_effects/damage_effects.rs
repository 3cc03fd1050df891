use super::EffectContext;
use crate::battle::actions::Action;
use crate::battle::conditions::VolatileFlags;
use crate::battle::context::BattleContext;
use crate::battle::damage::DamageContext;
use crate::battle::events::{BattleEvent, DamageSource};
use crate::battle::state::SlotRef;
use crate::errors::{BattleError, BattleResult};
use schema::{Ability, Item, MoveData, MoveEffect};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrikeResult {
    pub damage: u16,
    pub critical: bool,
    pub fainted: bool,
    /// The target's types or the weather wiped the hit out entirely.
    pub immune: bool,
    pub follow_ups: Vec<Action>,
}

/// One pipeline hit from `attacker` on `target`, applied to the field.
///
/// An empty or fainted target takes nothing. Lethal damage appends exactly one
/// faint follow-up for the target.
pub fn strike(
    ctx: &mut BattleContext,
    attacker: SlotRef,
    target: SlotRef,
    move_data: &MoveData,
    spread_multiplier: f64,
) -> BattleResult<StrikeResult> {
    if !ctx.field.is_living(target) || !ctx.field.is_living(attacker) {
        return Ok(StrikeResult::default());
    }

    let pipeline = ctx.pipeline;
    let (damage, critical, effectiveness, nullified) = {
        let mut damage_ctx = DamageContext::new(&*ctx.field, attacker, target, move_data)?
            .with_spread_multiplier(spread_multiplier);
        let damage = pipeline.calculate(&mut damage_ctx, &mut *ctx.rng);
        (
            damage,
            damage_ctx.critical,
            damage_ctx.effectiveness,
            damage_ctx.nullified,
        )
    };

    if critical && damage > 0 {
        ctx.emit(BattleEvent::CriticalHit { target });
    }
    if effectiveness != 1.0 {
        ctx.emit(BattleEvent::TypeEffectiveness {
            target,
            multiplier: effectiveness,
        });
    }
    if damage == 0 {
        return Ok(StrikeResult {
            immune: nullified || effectiveness == 0.0,
            ..StrikeResult::default()
        });
    }

    let defender = ctx
        .field
        .combatant_at_mut(target)?
        .ok_or(BattleError::InvalidSlot { slot: target })?;
    let dealt = defender.take_damage(damage);
    let name = defender.name.clone();
    let remaining_hp = defender.current_hp();
    let max_hp = defender.max_hp();
    let rough_skin = defender.has_ability(Ability::RoughSkin);
    let rocky_helmet = defender.has_item(Item::RockyHelmet);

    ctx.emit(BattleEvent::DamageDealt {
        target,
        name,
        amount: dealt,
        remaining_hp,
        max_hp,
        source: DamageSource::Move(move_data.name.clone()),
    });

    let slot = ctx.field.slot_mut(target)?;
    if slot.has(VolatileFlags::FOCUSING) {
        slot.volatiles.insert(VolatileFlags::HIT_WHILE_FOCUSING);
    }

    let mut follow_ups = Vec::new();
    let fainted = remaining_hp == 0;
    if fainted {
        follow_ups.push(Action::Faint { target });
    }
    if move_data.flags.contact && dealt > 0 {
        let attacker_max_hp = ctx
            .field
            .combatant_at(attacker)?
            .map_or(0, |combatant| combatant.max_hp() as i32);
        for (applies, divisor) in [(rough_skin, 8), (rocky_helmet, 6)] {
            if applies {
                follow_ups.push(Action::FixedDamage {
                    target: attacker,
                    amount: (attacker_max_hp / divisor).max(1),
                    source: DamageSource::Contact,
                });
            }
        }
    }

    Ok(StrikeResult {
        damage: dealt,
        critical,
        fainted,
        immune: false,
        follow_ups,
    })
}

/// Pipeline damage against one target, repeated for multi-hit moves until the
/// hit count runs out or the target goes down. A target the move cannot touch
/// is recorded in `effect_ctx.immune`.
pub fn apply_damage(
    _effect: &MoveEffect,
    effect_ctx: &mut EffectContext,
    ctx: &mut BattleContext,
) -> BattleResult<Vec<Action>> {
    let move_data = std::sync::Arc::clone(&effect_ctx.move_data);
    if !move_data.deals_damage() {
        return Ok(vec![]);
    }
    let (min, max) = move_data.hit_range();
    let hits = if min == max {
        min
    } else {
        ctx.rng.int_range(min as u32, max as u32, "multi-hit count") as u8
    };

    let mut follow_ups = Vec::new();
    let mut landed = 0;
    for _ in 0..hits {
        let result = strike(
            ctx,
            effect_ctx.user,
            effect_ctx.target,
            &move_data,
            effect_ctx.spread_multiplier,
        )?;
        if result.immune {
            effect_ctx.immune.push(effect_ctx.target);
        }
        if result.damage == 0 {
            break;
        }
        landed += 1;
        effect_ctx.damage_dealt += result.damage as u32;
        follow_ups.extend(result.follow_ups);
        if result.fainted {
            break;
        }
    }

    if max > 1 && landed > 0 {
        ctx.emit(BattleEvent::Message {
            text: format!("Hit {} time(s)!", landed),
        });
    }
    Ok(follow_ups)
}

fn share_of_damage(dealt: u32, percent: u8) -> i32 {
    ((dealt * percent as u32) / 100).max(1) as i32
}

pub fn apply_recoil(
    effect: &MoveEffect,
    effect_ctx: &mut EffectContext,
    _ctx: &mut BattleContext,
) -> BattleResult<Vec<Action>> {
    let MoveEffect::Recoil(percent) = effect else {
        return Ok(vec![]);
    };
    if effect_ctx.damage_dealt == 0 {
        return Ok(vec![]);
    }
    Ok(vec![Action::FixedDamage {
        target: effect_ctx.user,
        amount: share_of_damage(effect_ctx.damage_dealt, *percent),
        source: DamageSource::Recoil,
    }])
}

pub fn apply_drain(
    effect: &MoveEffect,
    effect_ctx: &mut EffectContext,
    _ctx: &mut BattleContext,
) -> BattleResult<Vec<Action>> {
    let MoveEffect::Drain(percent) = effect else {
        return Ok(vec![]);
    };
    if effect_ctx.damage_dealt == 0 {
        return Ok(vec![]);
    }
    Ok(vec![Action::Heal {
        target: effect_ctx.user,
        amount: share_of_damage(effect_ctx.damage_dealt, *percent),
    }])
}

pub fn apply_heal(
    effect: &MoveEffect,
    effect_ctx: &mut EffectContext,
    ctx: &mut BattleContext,
) -> BattleResult<Vec<Action>> {
    let MoveEffect::Heal(percent) = effect else {
        return Ok(vec![]);
    };
    let Some(user) = ctx.field.living_combatant(effect_ctx.user)? else {
        return Ok(vec![]);
    };
    let amount = (user.max_hp() as u32 * *percent as u32 / 100) as i32;
    Ok(vec![Action::Heal {
        target: effect_ctx.user,
        amount,
    }])
}

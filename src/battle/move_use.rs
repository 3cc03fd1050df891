use crate::battle::actions::Action;
use crate::battle::combatant::StatusCondition;
use crate::battle::conditions::VolatileFlags;
use crate::battle::context::BattleContext;
use crate::battle::events::{BattleEvent, DamageSource, FailureReason};
use crate::battle::move_effects::resolve_targets;
use crate::battle::state::{Field, SlotRef};
use crate::battle::stats::move_hits;
use crate::errors::{BattleError, BattleResult};
use schema::{Ability, EffectKind, Item, MoveData, StatusType};
use std::sync::Arc;
use tracing::{debug, trace};

/// A combatant using one of its moves.
///
/// Resolution walks a fixed sequence of checks and each one can end the use
/// early: before-move triggers, PP, flinch, persistent status, the charge
/// turn of two-turn moves, lost focus. Only then is PP spent and the move
/// announced, after which each target is checked for protection,
/// semi-invulnerability and accuracy before effects run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveUse {
    pub user: SlotRef,
    pub move_index: usize,
    /// Chosen target for single-target moves.
    pub target: Option<SlotRef>,
}

impl MoveUse {
    pub fn new(user: SlotRef, move_index: usize, target: Option<SlotRef>) -> Self {
        Self {
            user,
            move_index,
            target,
        }
    }

    /// The move's data, or `None` when the user's slot is empty.
    pub fn move_data(&self, field: &Field) -> BattleResult<Option<Arc<MoveData>>> {
        let Some(combatant) = field.combatant_at(self.user)? else {
            return Ok(None);
        };
        let instance = combatant
            .move_at(self.move_index)
            .ok_or(BattleError::InvalidMoveIndex {
                slot: self.user,
                index: self.move_index,
            })?;
        Ok(Some(Arc::clone(&instance.data)))
    }

    pub fn priority(&self, field: &Field) -> BattleResult<i8> {
        Ok(self
            .move_data(field)?
            .map_or(0, |move_data| move_data.priority))
    }

    pub fn execute(&self, ctx: &mut BattleContext) -> BattleResult<Vec<Action>> {
        ctx.field.validate_slot(self.user)?;
        if let Some(target) = self.target {
            ctx.field.validate_slot(target)?;
        }
        let Some(move_data) = self.move_data(ctx.field)? else {
            return Ok(vec![]);
        };
        if !ctx.field.is_living(self.user) {
            return Ok(vec![]);
        }

        let focusing = move_data.has_effect(EffectKind::Focus);
        if focusing {
            ctx.field
                .slot_mut(self.user)?
                .volatiles
                .insert(VolatileFlags::FOCUSING);
        }
        let result = self.resolve(ctx, &move_data);
        if focusing {
            ctx.field
                .slot_mut(self.user)?
                .volatiles
                .remove(VolatileFlags::FOCUSING | VolatileFlags::HIT_WHILE_FOCUSING);
        }
        result
    }

    fn fail(&self, ctx: &mut BattleContext, reason: FailureReason) -> BattleResult<Vec<Action>> {
        debug!(user = %self.user, ?reason, "move use failed");
        let name = ctx.name_at(self.user);
        ctx.emit(BattleEvent::ActionFailed {
            actor: self.user,
            name,
            reason,
        });
        Ok(vec![])
    }

    /// Like `fail`, but the action was prevented outright so any pending
    /// charge is abandoned too.
    fn prevented(
        &self,
        ctx: &mut BattleContext,
        reason: FailureReason,
    ) -> BattleResult<Vec<Action>> {
        ctx.field.slot_mut(self.user)?.clear_charge_state();
        self.fail(ctx, reason)
    }

    fn spend_pp(&self, ctx: &mut BattleContext) -> BattleResult<()> {
        if let Some(combatant) = ctx.field.combatant_at_mut(self.user)? {
            if let Some(instance) = combatant.move_at_mut(self.move_index) {
                instance.use_pp();
            }
        }
        Ok(())
    }

    fn resolve(
        &self,
        ctx: &mut BattleContext,
        move_data: &Arc<MoveData>,
    ) -> BattleResult<Vec<Action>> {
        let user = self.user;
        let (name, pp, truant, status) = match ctx.field.combatant_at(user)? {
            Some(combatant) => (
                combatant.name.clone(),
                combatant.move_at(self.move_index).map_or(0, |instance| instance.pp),
                combatant.has_ability(Ability::Truant),
                combatant.status,
            ),
            None => return Ok(vec![]),
        };

        // Before-move triggers.
        if truant && ctx.field.slot(user)?.has(VolatileFlags::LOAFING) {
            ctx.field
                .slot_mut(user)?
                .volatiles
                .remove(VolatileFlags::LOAFING);
            return self.prevented(ctx, FailureReason::Loafing);
        }

        let continuing = {
            let slot = ctx.field.slot(user)?;
            slot.has(VolatileFlags::CHARGING)
                && slot.charging_move.as_deref() == Some(move_data.name.as_str())
        };
        if !continuing {
            // A different move abandons whatever was being charged.
            ctx.field.slot_mut(user)?.clear_charge_state();
        }

        if !continuing && pp == 0 {
            return self.fail(ctx, FailureReason::NoPpRemaining);
        }

        if ctx.field.slot(user)?.has(VolatileFlags::FLINCH) {
            ctx.field
                .slot_mut(user)?
                .volatiles
                .remove(VolatileFlags::FLINCH);
            return self.prevented(ctx, FailureReason::Flinched);
        }

        if let Some(reason) = self.status_check(ctx, status, &name)? {
            return self.prevented(ctx, reason);
        }

        // Charge turn.
        if move_data.is_two_turn() {
            if continuing {
                ctx.field.slot_mut(user)?.clear_charge_state();
            } else {
                let skip_charge = ctx
                    .field
                    .weather()
                    .is_some_and(|weather| move_data.flags.skips_charge_in.contains(&weather));
                if !skip_charge {
                    return self.begin_charge(ctx, move_data, name);
                }
            }
        }

        if ctx.field.slot(user)?.has(VolatileFlags::HIT_WHILE_FOCUSING) {
            self.spend_pp(ctx)?;
            return self.fail(ctx, FailureReason::FocusLost);
        }

        if !continuing {
            self.spend_pp(ctx)?;
        }
        ctx.emit(BattleEvent::MoveUsed {
            user,
            name,
            move_name: move_data.name.clone(),
        });
        {
            let slot = ctx.field.slot_mut(user)?;
            if !move_data.has_effect(EffectKind::Protect) {
                slot.protect_streak = 0;
            }
            slot.last_move = Some(move_data.name.clone());
            if truant {
                slot.volatiles.insert(VolatileFlags::LOAFING);
            }
        }

        let targets = resolve_targets(ctx.field, user, move_data.target, self.target)?;
        if targets.is_empty() {
            return self.fail(ctx, FailureReason::NoTarget);
        }

        let mut connected = Vec::with_capacity(targets.len());
        for target in targets {
            if target == user || self.connects(ctx, move_data, target)? {
                connected.push(target);
            }
        }
        if connected.is_empty() {
            return Ok(vec![]);
        }

        let registry = ctx.registry;
        let outcome = registry.process_move(user, &connected, move_data, ctx)?;
        let mut follow_ups = outcome.follow_ups;
        follow_ups.extend(self.after_move(ctx, outcome.damage_dealt)?);
        Ok(follow_ups)
    }

    /// Sleep, freeze and paralysis. Returns the reason the user cannot act.
    fn status_check(
        &self,
        ctx: &mut BattleContext,
        status: Option<StatusCondition>,
        name: &str,
    ) -> BattleResult<Option<FailureReason>> {
        let user = self.user;
        match status {
            Some(StatusCondition::Sleep(0)) => {
                self.cure(ctx, StatusType::Sleep, name)?;
                Ok(None)
            }
            Some(StatusCondition::Sleep(turns)) => {
                if let Some(combatant) = ctx.field.combatant_at_mut(user)? {
                    combatant.status = Some(StatusCondition::Sleep(turns - 1));
                }
                Ok(Some(FailureReason::Asleep))
            }
            Some(StatusCondition::Freeze) => {
                if ctx.rng.chance(20, "thaw") {
                    self.cure(ctx, StatusType::Freeze, name)?;
                    Ok(None)
                } else {
                    Ok(Some(FailureReason::Frozen))
                }
            }
            Some(StatusCondition::Paralysis) if ctx.rng.chance(25, "full paralysis") => {
                Ok(Some(FailureReason::Paralyzed))
            }
            _ => Ok(None),
        }
    }

    fn cure(&self, ctx: &mut BattleContext, status: StatusType, name: &str) -> BattleResult<()> {
        if let Some(combatant) = ctx.field.combatant_at_mut(self.user)? {
            combatant.status = None;
        }
        ctx.emit(BattleEvent::StatusCured {
            target: self.user,
            name: name.to_string(),
            status,
        });
        Ok(())
    }

    fn begin_charge(
        &self,
        ctx: &mut BattleContext,
        move_data: &MoveData,
        name: String,
    ) -> BattleResult<Vec<Action>> {
        self.spend_pp(ctx)?;
        let location = move_data.semi_invulnerable_location();
        let slot = ctx.field.slot_mut(self.user)?;
        slot.volatiles.insert(VolatileFlags::CHARGING);
        if location.is_some() {
            slot.volatiles.insert(VolatileFlags::SEMI_INVULNERABLE);
        }
        slot.charging_move = Some(move_data.name.clone());
        slot.semi_invulnerable = location;
        trace!(user = %self.user, move_name = %move_data.name, "charging");
        ctx.emit(BattleEvent::MoveCharging {
            user: self.user,
            name,
            move_name: move_data.name.clone(),
            location,
        });
        Ok(vec![])
    }

    /// Protection, semi-invulnerability and accuracy against one target.
    fn connects(
        &self,
        ctx: &mut BattleContext,
        move_data: &MoveData,
        target: SlotRef,
    ) -> BattleResult<bool> {
        let slot = ctx.field.slot(target)?;
        let protected = slot.has(VolatileFlags::PROTECTED);
        let hidden = if slot.has(VolatileFlags::SEMI_INVULNERABLE) {
            slot.semi_invulnerable
        } else {
            None
        };
        let target_name = ctx.name_at(target);

        if protected && !move_data.flags.bypasses_protection {
            ctx.emit(BattleEvent::MoveBlocked {
                target,
                name: target_name,
            });
            return Ok(false);
        }
        if let Some(location) = hidden {
            if !move_data.flags.hits_semi_invulnerable.contains(&location) {
                ctx.emit(BattleEvent::MoveMissed {
                    user: self.user,
                    target,
                    target_name,
                });
                return Ok(false);
            }
        }
        if ctx.field.is_living(target)
            && !move_hits(ctx.field, self.user, target, move_data, &mut *ctx.rng)?
        {
            ctx.emit(BattleEvent::MoveMissed {
                user: self.user,
                target,
                target_name,
            });
            return Ok(false);
        }
        Ok(true)
    }

    /// Held-item triggers that read the damage this use dealt.
    fn after_move(&self, ctx: &mut BattleContext, damage_dealt: u32) -> BattleResult<Vec<Action>> {
        if damage_dealt == 0 {
            return Ok(vec![]);
        }
        let Some(user) = ctx.field.living_combatant(self.user)? else {
            return Ok(vec![]);
        };
        let mut follow_ups = Vec::new();
        match user.item {
            Some(Item::LifeOrb) => follow_ups.push(Action::FixedDamage {
                target: self.user,
                amount: (user.max_hp() as i32 / 10).max(1),
                source: DamageSource::LifeOrb,
            }),
            Some(Item::ShellBell) => follow_ups.push(Action::Heal {
                target: self.user,
                amount: (damage_dealt as i32 / 8).max(1),
            }),
            _ => {}
        }
        Ok(follow_ups)
    }
}

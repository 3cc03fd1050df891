use crate::battle::combatant::StatusCondition;
use crate::battle::conditions::VolatileFlags;
use crate::battle::context::BattleContext;
use crate::battle::events::{
    BattleEvent, DamageSource, FailureReason, StatBlockReason, StatusBlockReason,
};
use crate::battle::move_effects::strike;
use crate::battle::move_use::MoveUse;
use crate::battle::state::{CombatantId, Field, SideId, SlotRef, TerrainState, WeatherState};
use crate::battle::view::{present_event, BattleView};
use crate::errors::{BattleError, BattleResult};
use schema::{
    Ability, ElementType, MoveData, SideCondition, StatType, StatusType, Terrain, Weather,
};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideConditionChange {
    Set { turns: u8 },
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherChange {
    /// `turns: None` lasts until cleared. Primal weather always lasts.
    Set { weather: Weather, turns: Option<u8> },
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainChange {
    Set { terrain: Terrain, turns: u8 },
    Clear,
}

/// One unit of battle work.
///
/// The logic phase (`execute`) mutates the field synchronously and returns
/// follow-up actions. The presentation phase (`present`) replays the events the
/// logic phase recorded against a view and never touches battle state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Apply a persistent status, or clear it with `None`.
    SetStatus {
        target: SlotRef,
        status: Option<StatusType>,
        source: Option<SlotRef>,
    },
    /// Damage that skips the pipeline (recoil, contact punishment, residuals).
    FixedDamage {
        target: SlotRef,
        amount: i32,
        source: DamageSource,
    },
    /// One pipeline-computed hit.
    Damage {
        attacker: SlotRef,
        target: SlotRef,
        move_data: Arc<MoveData>,
    },
    Faint {
        target: SlotRef,
    },
    Heal {
        target: SlotRef,
        amount: i32,
    },
    Message {
        text: String,
    },
    SideCondition {
        side: SideId,
        condition: SideCondition,
        change: SideConditionChange,
    },
    Weather(WeatherChange),
    Terrain(TerrainChange),
    StatStage {
        target: SlotRef,
        stat: StatType,
        delta: i32,
        source: Option<SlotRef>,
    },
    Switch {
        slot: SlotRef,
        incoming: CombatantId,
    },
    UseMove(MoveUse),
}

pub const SWITCH_PRIORITY: i8 = 6;

impl Action {
    pub fn use_move(user: SlotRef, move_index: usize, target: Option<SlotRef>) -> Self {
        Action::UseMove(MoveUse::new(user, move_index, target))
    }

    pub fn switch(slot: SlotRef, incoming: usize) -> Self {
        Action::Switch {
            slot,
            incoming: CombatantId(incoming),
        }
    }

    /// The slot whose speed orders this action, if any.
    pub fn origin(&self) -> Option<SlotRef> {
        match self {
            Action::UseMove(move_use) => Some(move_use.user),
            Action::Switch { slot, .. } => Some(*slot),
            Action::Damage { attacker, .. } => Some(*attacker),
            Action::SetStatus { source, .. } | Action::StatStage { source, .. } => *source,
            _ => None,
        }
    }

    pub fn priority(&self, field: &Field) -> BattleResult<i8> {
        match self {
            Action::Switch { .. } => Ok(SWITCH_PRIORITY),
            Action::UseMove(move_use) => move_use.priority(field),
            _ => Ok(0),
        }
    }

    /// Whether a protection effect on the target can stop this action.
    pub fn interceptable(&self, field: &Field) -> bool {
        match self {
            Action::UseMove(move_use) => matches!(
                move_use.move_data(field),
                Ok(Some(move_data)) if !move_data.flags.bypasses_protection
            ),
            _ => false,
        }
    }

    /// Chosen actions go through the turn-order resolver; system actions keep
    /// the order they were queued in.
    pub fn requires_ordering(&self) -> bool {
        matches!(self, Action::UseMove(_) | Action::Switch { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::SetStatus { .. } => "set status",
            Action::FixedDamage { .. } => "fixed damage",
            Action::Damage { .. } => "damage",
            Action::Faint { .. } => "faint",
            Action::Heal { .. } => "heal",
            Action::Message { .. } => "message",
            Action::SideCondition { .. } => "side condition",
            Action::Weather(_) => "weather",
            Action::Terrain(_) => "terrain",
            Action::StatStage { .. } => "stat stage",
            Action::Switch { .. } => "switch",
            Action::UseMove(_) => "use move",
        }
    }

    /// Logic phase. Returns follow-up actions to run before anything queued later.
    pub fn execute(&self, ctx: &mut BattleContext) -> BattleResult<Vec<Action>> {
        debug!(action = self.label(), "executing action");
        match self {
            Action::SetStatus {
                target, status, ..
            } => set_status(ctx, *target, *status),
            Action::FixedDamage {
                target,
                amount,
                source,
            } => fixed_damage(ctx, *target, *amount, source),
            Action::Damage {
                attacker,
                target,
                move_data,
            } => {
                ctx.field.validate_slot(*attacker)?;
                ctx.field.validate_slot(*target)?;
                if !ctx.field.is_living(*attacker) {
                    return Ok(vec![]);
                }
                Ok(strike(ctx, *attacker, *target, move_data, 1.0)?.follow_ups)
            }
            Action::Faint { target } => faint(ctx, *target),
            Action::Heal { target, amount } => heal(ctx, *target, *amount),
            Action::Message { text } => {
                ctx.emit(BattleEvent::Message { text: text.clone() });
                Ok(vec![])
            }
            Action::SideCondition {
                side,
                condition,
                change,
            } => side_condition(ctx, *side, *condition, *change),
            Action::Weather(change) => weather(ctx, *change),
            Action::Terrain(change) => terrain(ctx, *change),
            Action::StatStage {
                target,
                stat,
                delta,
                source,
            } => stat_stage(ctx, *target, *stat, *delta, *source),
            Action::Switch { slot, incoming } => switch(ctx, *slot, *incoming),
            Action::UseMove(move_use) => move_use.execute(ctx),
        }
    }

    /// Presentation phase: replay `events` (the ones this action's logic
    /// produced) in order, awaiting each call. No events, no view calls.
    pub async fn present(&self, events: &[BattleEvent], view: &dyn BattleView) {
        if events.is_empty() {
            return;
        }
        for event in events {
            present_event(event, view).await;
        }
    }
}

fn require_non_negative(operation: &'static str, amount: i32) -> BattleResult<u16> {
    if amount < 0 {
        return Err(BattleError::NegativeAmount { operation, amount });
    }
    Ok(amount.min(u16::MAX as i32) as u16)
}

fn is_immune_to_status(ctx: &BattleContext, target: SlotRef, status: StatusType) -> bool {
    let Ok(Some(combatant)) = ctx.field.combatant_at(target) else {
        return true;
    };
    let ability_immunity = match status {
        StatusType::Paralysis => combatant.has_ability(Ability::Limber),
        StatusType::Sleep => combatant.has_ability(Ability::Insomnia),
        _ => false,
    };
    ability_immunity
        || status
            .immune_types()
            .iter()
            .any(|element: &ElementType| combatant.has_type(*element))
}

fn set_status(
    ctx: &mut BattleContext,
    target: SlotRef,
    status: Option<StatusType>,
) -> BattleResult<Vec<Action>> {
    ctx.field.validate_slot(target)?;
    let Some(combatant) = ctx.field.living_combatant(target)? else {
        return Ok(vec![]);
    };
    let name = combatant.name.clone();
    let current = combatant.status;

    let Some(status) = status else {
        if let Some(previous) = current {
            if let Some(combatant) = ctx.field.combatant_at_mut(target)? {
                combatant.status = None;
            }
            ctx.emit(BattleEvent::StatusCured {
                target,
                name,
                status: previous.kind(),
            });
        }
        return Ok(vec![]);
    };

    let blocked = if ctx
        .field
        .side(target.side)
        .has_condition(SideCondition::Safeguard)
    {
        Some(StatusBlockReason::Safeguard)
    } else if current.is_some() {
        Some(StatusBlockReason::AlreadyAffected)
    } else if is_immune_to_status(ctx, target, status) {
        Some(StatusBlockReason::Immune)
    } else {
        None
    };
    if let Some(reason) = blocked {
        ctx.emit(BattleEvent::StatusBlocked {
            target,
            name,
            status,
            reason,
        });
        return Ok(vec![]);
    }

    let sleep_turns = if status == StatusType::Sleep {
        ctx.rng.int_range(1, 3, "sleep duration") as u8
    } else {
        0
    };
    if let Some(combatant) = ctx.field.combatant_at_mut(target)? {
        combatant.status = Some(StatusCondition::fresh(status, sleep_turns));
    }
    ctx.emit(BattleEvent::StatusApplied {
        target,
        name,
        status,
    });
    Ok(vec![])
}

fn fixed_damage(
    ctx: &mut BattleContext,
    target: SlotRef,
    amount: i32,
    source: &DamageSource,
) -> BattleResult<Vec<Action>> {
    let amount = require_non_negative("damage", amount)?;
    ctx.field.validate_slot(target)?;
    if amount == 0 || !ctx.field.is_living(target) {
        return Ok(vec![]);
    }
    let Some(combatant) = ctx.field.combatant_at_mut(target)? else {
        return Ok(vec![]);
    };
    let dealt = combatant.take_damage(amount);
    let name = combatant.name.clone();
    let remaining_hp = combatant.current_hp();
    let max_hp = combatant.max_hp();
    ctx.emit(BattleEvent::DamageDealt {
        target,
        name,
        amount: dealt,
        remaining_hp,
        max_hp,
        source: source.clone(),
    });
    if remaining_hp == 0 {
        return Ok(vec![Action::Faint { target }]);
    }
    Ok(vec![])
}

fn heal(ctx: &mut BattleContext, target: SlotRef, amount: i32) -> BattleResult<Vec<Action>> {
    let amount = require_non_negative("heal", amount)?;
    ctx.field.validate_slot(target)?;
    if amount == 0 || !ctx.field.is_living(target) {
        return Ok(vec![]);
    }
    let Some(combatant) = ctx.field.combatant_at_mut(target)? else {
        return Ok(vec![]);
    };
    let restored = combatant.heal(amount);
    if restored == 0 {
        return Ok(vec![]);
    }
    let event = BattleEvent::Healed {
        target,
        name: combatant.name.clone(),
        amount: restored,
        new_hp: combatant.current_hp(),
        max_hp: combatant.max_hp(),
    };
    ctx.emit(event);
    Ok(vec![])
}

/// Vacates the slot. Whether the battle is over is the caller's business.
fn faint(ctx: &mut BattleContext, target: SlotRef) -> BattleResult<Vec<Action>> {
    let Some(combatant) = ctx.field.combatant_at_mut(target)? else {
        return Ok(vec![]);
    };
    if !combatant.is_fainted() {
        warn!(%target, "faint requested for a combatant with HP remaining");
        return Ok(vec![]);
    }
    combatant.volatiles = VolatileFlags::empty();
    let name = combatant.name.clone();
    ctx.field.slot_mut(target)?.reset_for(None);
    ctx.emit(BattleEvent::Fainted { target, name });
    Ok(vec![])
}

fn side_condition(
    ctx: &mut BattleContext,
    side: SideId,
    condition: SideCondition,
    change: SideConditionChange,
) -> BattleResult<Vec<Action>> {
    match change {
        SideConditionChange::Set { turns } => {
            let required = condition.required_weather();
            let weather_missing = !required.is_empty()
                && !ctx
                    .field
                    .weather()
                    .is_some_and(|weather| required.contains(&weather));
            if weather_missing || ctx.field.side(side).has_condition(condition) {
                ctx.emit(BattleEvent::SideConditionFailed { side, condition });
                return Ok(vec![]);
            }
            ctx.field.side_mut(side).conditions.insert(condition, turns);
            ctx.emit(BattleEvent::SideConditionStarted { side, condition });
        }
        SideConditionChange::Clear => {
            if ctx.field.side_mut(side).conditions.remove(&condition).is_some() {
                ctx.emit(BattleEvent::SideConditionEnded { side, condition });
            }
        }
    }
    Ok(vec![])
}

fn weather(ctx: &mut BattleContext, change: WeatherChange) -> BattleResult<Vec<Action>> {
    match change {
        WeatherChange::Set { weather, turns } => {
            match ctx.field.weather() {
                Some(active) if active.is_primal() && !weather.is_primal() => {
                    ctx.emit(BattleEvent::WeatherBlocked {
                        attempted: weather,
                        active,
                    });
                    return Ok(vec![]);
                }
                Some(active) if active == weather => {
                    ctx.emit(BattleEvent::Message {
                        text: "But it failed!".to_string(),
                    });
                    return Ok(vec![]);
                }
                _ => {}
            }
            let turns_remaining = if weather.is_primal() { None } else { turns };
            ctx.field.weather = Some(WeatherState {
                weather,
                turns_remaining,
            });
            ctx.emit(BattleEvent::WeatherChanged {
                weather: Some(weather),
            });
        }
        WeatherChange::Clear => {
            if ctx.field.weather.take().is_some() {
                ctx.emit(BattleEvent::WeatherChanged { weather: None });
            }
        }
    }
    Ok(vec![])
}

fn terrain(ctx: &mut BattleContext, change: TerrainChange) -> BattleResult<Vec<Action>> {
    match change {
        TerrainChange::Set { terrain, turns } => {
            if ctx.field.terrain() == Some(terrain) {
                ctx.emit(BattleEvent::Message {
                    text: "But it failed!".to_string(),
                });
                return Ok(vec![]);
            }
            ctx.field.terrain = Some(TerrainState {
                terrain,
                turns_remaining: turns,
            });
            ctx.emit(BattleEvent::TerrainChanged {
                terrain: Some(terrain),
            });
        }
        TerrainChange::Clear => {
            if ctx.field.terrain.take().is_some() {
                ctx.emit(BattleEvent::TerrainChanged { terrain: None });
            }
        }
    }
    Ok(vec![])
}

fn stat_stage(
    ctx: &mut BattleContext,
    target: SlotRef,
    stat: StatType,
    delta: i32,
    source: Option<SlotRef>,
) -> BattleResult<Vec<Action>> {
    ctx.field.validate_slot(target)?;
    if stat == StatType::Hp {
        return Err(BattleError::HpStageModification { stat });
    }
    if delta == 0 || !ctx.field.is_living(target) {
        return Ok(vec![]);
    }
    let name = ctx.name_at(target);
    let rising = delta > 0;

    let from_opponent = source.is_some_and(|source| source.is_opponent_of(target));
    if !rising && from_opponent && ctx.field.side(target.side).has_condition(SideCondition::Mist)
    {
        ctx.emit(BattleEvent::StatChangeBlocked {
            target,
            name,
            stat,
            rising,
            reason: StatBlockReason::Mist,
        });
        return Ok(vec![]);
    }

    let slot = ctx.field.slot_mut(target)?;
    let change = slot.stages.apply(stat, delta)?;
    let new_stage = slot.stages.get(stat);
    if change == 0 {
        ctx.emit(BattleEvent::StatChangeBlocked {
            target,
            name,
            stat,
            rising,
            reason: StatBlockReason::AtLimit,
        });
        return Ok(vec![]);
    }
    ctx.emit(BattleEvent::StatStageChanged {
        target,
        name,
        stat,
        delta: change,
        new_stage,
    });
    Ok(vec![])
}

/// Seat `incoming` in `slot`. The outgoing combatant is flagged as switching
/// out until the end of the turn and the slot's battle-local state is wiped.
fn switch(ctx: &mut BattleContext, slot: SlotRef, incoming: CombatantId) -> BattleResult<Vec<Action>> {
    ctx.field.validate_slot(slot)?;
    let side = ctx.field.side(slot.side);
    let Some(candidate) = side.combatant(incoming) else {
        return Err(BattleError::InvalidCombatant { slot, id: incoming });
    };
    let incoming_name = candidate.name.clone();
    if candidate.is_fainted() || side.is_active(incoming) {
        ctx.emit(BattleEvent::ActionFailed {
            actor: slot,
            name: incoming_name,
            reason: FailureReason::CannotSwitch,
        });
        return Ok(vec![]);
    }

    let outgoing_id = ctx.field.combatant_id_at(slot)?;
    let outgoing_name = match ctx.field.combatant_at_mut(slot)? {
        Some(outgoing) => {
            outgoing.volatiles.insert(VolatileFlags::SWITCHING_OUT);
            Some(outgoing.name.clone())
        }
        None => None,
    };

    let seat = ctx.field.slot_mut(slot)?;
    seat.reset_for(Some(incoming));
    seat.switched_out = outgoing_id;
    debug!(%slot, incoming = %incoming_name, "switched in");
    ctx.emit(BattleEvent::Switched {
        slot,
        outgoing: outgoing_name,
        incoming: incoming_name,
    });
    Ok(vec![])
}

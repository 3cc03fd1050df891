use crate::battle::action_queue::{ActionQueue, LoggedAction, TurnLog};
use crate::battle::actions::{Action, SideConditionChange, TerrainChange, WeatherChange};
use crate::battle::combatant::StatusCondition;
use crate::battle::conditions::VolatileFlags;
use crate::battle::context::BattleContext;
use crate::battle::damage::DamagePipeline;
use crate::battle::events::{BattleEvent, BattleOutcome, BattleStatistics, DamageSource, EventBus};
use crate::battle::move_effects::EffectRegistry;
use crate::battle::rng::RandomSource;
use crate::battle::state::{Field, SideId, SlotRef};
use crate::battle::turn_order::TurnOrderResolver;
use crate::errors::BattleResult;
use schema::{EffectKind, StatusType};
use tracing::{debug, info};

/// Composition root for one battle.
///
/// Every collaborator is handed in by the caller; nothing here builds a
/// default random source, pipeline or registry on its own.
pub struct BattleEngine {
    field: Field,
    resolver: TurnOrderResolver,
    pipeline: DamagePipeline,
    registry: EffectRegistry,
    rng: Box<dyn RandomSource>,
    outcome: BattleOutcome,
    statistics: BattleStatistics,
}

impl BattleEngine {
    pub fn new(
        field: Field,
        resolver: TurnOrderResolver,
        pipeline: DamagePipeline,
        registry: EffectRegistry,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            field,
            resolver,
            pipeline,
            registry,
            rng,
            outcome: BattleOutcome::Ongoing,
            statistics: BattleStatistics::default(),
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Direct access for scenario setup between turns.
    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    pub fn outcome(&self) -> BattleOutcome {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome != BattleOutcome::Ongoing
    }

    /// Totals across every turn resolved so far.
    pub fn statistics(&self) -> &BattleStatistics {
        &self.statistics
    }

    pub fn resolver(&self) -> &TurnOrderResolver {
        &self.resolver
    }

    /// Empty slots that could be refilled from the bench.
    pub fn pending_replacements(&self) -> Vec<SlotRef> {
        let mut slots = Vec::new();
        for side in SideId::ALL {
            let available = self.field.side(side).bench().len();
            slots.extend(
                self.field
                    .slot_refs(side)
                    .filter(|slot| matches!(self.field.combatant_id_at(*slot), Ok(None)))
                    .take(available),
            );
        }
        slots
    }

    /// Resolve one full turn from the actions both sides chose.
    pub fn resolve_turn(&mut self, actions: Vec<Action>) -> BattleResult<TurnLog> {
        self.field.turn_number += 1;
        let turn_number = self.field.turn_number;
        info!(turn_number, actions = actions.len(), "turn started");

        let mut bus = EventBus::new();
        let mut entries = Vec::new();
        bus.push(BattleEvent::TurnStarted { turn_number });
        self.mark_focusing(&actions, &mut bus);

        let mut queue =
            ActionQueue::ordered(actions, &self.field, &self.resolver, self.rng.as_mut())?;
        self.run_queue(&mut queue, &mut bus, &mut entries)?;

        let residuals = residual_actions(&self.field);
        advance_toxic_counters(&mut self.field);
        self.run_queue(&mut ActionQueue::in_order(residuals), &mut bus, &mut entries)?;

        let expiries = tick_durations(&mut self.field);
        self.run_queue(&mut ActionQueue::in_order(expiries), &mut bus, &mut entries)?;

        clear_per_turn_state(&mut self.field);
        self.finish(turn_number, bus, entries)
    }

    /// Run system actions (replacement switches, scripted effects) in the given
    /// order, outside turn ordering.
    pub fn run_system_actions(&mut self, actions: Vec<Action>) -> BattleResult<TurnLog> {
        let turn_number = self.field.turn_number;
        debug!(turn_number, actions = actions.len(), "running system actions");
        let mut bus = EventBus::new();
        let mut entries = Vec::new();
        self.run_queue(&mut ActionQueue::in_order(actions), &mut bus, &mut entries)?;
        self.update_outcome(&mut bus);
        self.statistics.merge(&bus.statistics());
        Ok(TurnLog::new(turn_number, bus, entries))
    }

    fn run_queue(
        &mut self,
        queue: &mut ActionQueue,
        bus: &mut EventBus,
        entries: &mut Vec<LoggedAction>,
    ) -> BattleResult<()> {
        let mut ctx = BattleContext::new(
            &mut self.field,
            self.rng.as_mut(),
            &self.pipeline,
            &self.registry,
            bus,
        );
        queue.run(&mut ctx, entries)
    }

    /// Focus moves announce themselves before anyone acts so that hits taken
    /// earlier in the turn can break the focus.
    fn mark_focusing(&mut self, actions: &[Action], bus: &mut EventBus) {
        for action in actions {
            let Action::UseMove(move_use) = action else {
                continue;
            };
            let Ok(Some(move_data)) = move_use.move_data(&self.field) else {
                continue;
            };
            if !move_data.has_effect(EffectKind::Focus) {
                continue;
            }
            let name = match self.field.living_combatant(move_use.user) {
                Ok(Some(combatant)) => combatant.name.clone(),
                _ => continue,
            };
            if let Ok(slot) = self.field.slot_mut(move_use.user) {
                slot.volatiles.insert(VolatileFlags::FOCUSING);
                bus.push(BattleEvent::Message {
                    text: format!("{} is tightening its focus!", name),
                });
            }
        }
    }

    fn finish(
        &mut self,
        turn_number: u32,
        mut bus: EventBus,
        entries: Vec<LoggedAction>,
    ) -> BattleResult<TurnLog> {
        self.update_outcome(&mut bus);
        if let Some(limit) = self.field.rules.turn_limit {
            if self.outcome == BattleOutcome::Ongoing && turn_number >= limit {
                self.outcome = BattleOutcome::Draw;
                info!(turn_number, "turn limit reached");
                bus.push(BattleEvent::BattleEnded {
                    outcome: self.outcome,
                });
            }
        }
        bus.push(BattleEvent::TurnEnded { turn_number });
        self.statistics.merge(&bus.statistics());
        info!(turn_number, outcome = ?self.outcome, "turn ended");
        Ok(TurnLog::new(turn_number, bus, entries))
    }

    fn update_outcome(&mut self, bus: &mut EventBus) {
        if self.outcome != BattleOutcome::Ongoing {
            return;
        }
        let player_out = !self.field.side(SideId::Player).has_usable_combatants();
        let opponent_out = !self.field.side(SideId::Opponent).has_usable_combatants();
        self.outcome = match (player_out, opponent_out) {
            (true, true) => BattleOutcome::Draw,
            (true, false) => BattleOutcome::Defeat,
            (false, true) => BattleOutcome::Victory,
            (false, false) => BattleOutcome::Ongoing,
        };
        if self.outcome != BattleOutcome::Ongoing {
            info!(outcome = ?self.outcome, "battle ended");
            bus.push(BattleEvent::BattleEnded {
                outcome: self.outcome,
            });
        }
    }
}

fn residual_amount(max_hp: u16, numerator: u16, denominator: u16) -> i32 {
    ((max_hp as u32 * numerator as u32 / denominator as u32).max(1)) as i32
}

/// Status residuals, then weather chip, for every active combatant.
fn residual_actions(field: &Field) -> Vec<Action> {
    let occupied = field.occupied_slots();
    let mut actions = Vec::new();

    for slot in &occupied {
        let Ok(Some(combatant)) = field.living_combatant(*slot) else {
            continue;
        };
        let max_hp = combatant.max_hp();
        let residual = match combatant.status {
            Some(StatusCondition::Burn) => Some((StatusType::Burn, residual_amount(max_hp, 1, 16))),
            Some(StatusCondition::Poison) => {
                Some((StatusType::Poison, residual_amount(max_hp, 1, 8)))
            }
            Some(StatusCondition::BadlyPoisoned(counter)) => Some((
                StatusType::BadlyPoisoned,
                residual_amount(max_hp, counter.max(1) as u16, 16),
            )),
            _ => None,
        };
        if let Some((status, amount)) = residual {
            actions.push(Action::FixedDamage {
                target: *slot,
                amount,
                source: DamageSource::Status(status),
            });
        }
    }

    if let Some(weather) = field.weather().filter(|weather| weather.deals_chip_damage()) {
        for slot in &occupied {
            let Ok(Some(combatant)) = field.living_combatant(*slot) else {
                continue;
            };
            let immune = weather
                .chip_immune_types()
                .iter()
                .any(|element| combatant.has_type(*element));
            if !immune {
                actions.push(Action::FixedDamage {
                    target: *slot,
                    amount: residual_amount(combatant.max_hp(), 1, 16),
                    source: DamageSource::Weather(weather),
                });
            }
        }
    }
    actions
}

fn advance_toxic_counters(field: &mut Field) {
    for slot in field.occupied_slots() {
        if let Ok(Some(combatant)) = field.combatant_at_mut(slot) {
            if let Some(StatusCondition::BadlyPoisoned(counter)) = combatant.status {
                combatant.status = Some(StatusCondition::BadlyPoisoned(counter.saturating_add(1)));
            }
        }
    }
}

/// Count every timed effect down by one turn and queue a clear for each that
/// ran out.
fn tick_durations(field: &mut Field) -> Vec<Action> {
    let mut expired = Vec::new();

    if let Some(state) = field.weather.as_mut() {
        if let Some(turns) = state.turns_remaining.as_mut() {
            *turns = turns.saturating_sub(1);
            if *turns == 0 {
                expired.push(Action::Weather(WeatherChange::Clear));
            }
        }
    }
    if let Some(state) = field.terrain.as_mut() {
        state.turns_remaining = state.turns_remaining.saturating_sub(1);
        if state.turns_remaining == 0 {
            expired.push(Action::Terrain(TerrainChange::Clear));
        }
    }
    for side in SideId::ALL {
        let conditions = &mut field.side_mut(side).conditions;
        let mut ended: Vec<_> = conditions
            .iter_mut()
            .filter_map(|(condition, turns)| {
                *turns = turns.saturating_sub(1);
                (*turns == 0).then_some(*condition)
            })
            .collect();
        ended.sort_by_key(|condition| condition.to_string());
        expired.extend(ended.into_iter().map(|condition| Action::SideCondition {
            side,
            condition,
            change: SideConditionChange::Clear,
        }));
    }
    expired
}

fn clear_per_turn_state(field: &mut Field) {
    for side in SideId::ALL {
        let side = field.side_mut(side);
        for slot in &mut side.slots {
            slot.volatiles.remove(VolatileFlags::PER_TURN);
            slot.switched_out = None;
        }
        for combatant in &mut side.party {
            combatant.volatiles.remove(VolatileFlags::SWITCHING_OUT);
        }
    }
}

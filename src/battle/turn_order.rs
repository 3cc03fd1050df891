use crate::battle::actions::Action;
use crate::battle::rng::RandomSource;
use crate::battle::state::{Field, SlotRef};
use crate::battle::stats::apply_stat_stage_multiplier;
use crate::errors::BattleResult;
use ordered_float::OrderedFloat;
use schema::{Ability, Item, SideCondition, StatType, StatusType, Weather};
use tracing::debug;

/// Orders a batch of actions by priority bracket, then effective speed,
/// then a fresh random draw per action.
#[derive(Debug, Default, Clone, Copy)]
pub struct TurnOrderResolver;

/// Sorts descending on priority, then speed, then the tie-break draw.
struct OrderKey {
    priority: i8,
    speed: OrderedFloat<f64>,
    tie_break: OrderedFloat<f64>,
}

impl TurnOrderResolver {
    pub fn new() -> Self {
        Self
    }

    /// Speed used for ordering. Empty slots report 0.
    pub fn effective_speed(&self, field: &Field, slot: SlotRef) -> BattleResult<f64> {
        let Some(combatant) = field.combatant_at(slot)? else {
            return Ok(0.0);
        };
        let stage = field.slot(slot)?.stages.get(StatType::Spe);
        let mut speed = apply_stat_stage_multiplier(combatant.stats.speed, stage) as f64;

        if combatant.status_type() == Some(StatusType::Paralysis) {
            speed *= 0.5;
        }
        if field.side(slot.side).has_condition(SideCondition::Tailwind) {
            speed *= 2.0;
        }
        if combatant.has_item(Item::ChoiceScarf) {
            speed *= 1.5;
        }
        if let (Some(ability), Some(weather)) = (combatant.ability, field.weather()) {
            let doubled = match ability {
                Ability::SwiftSwim => weather.is_rainy(),
                Ability::Chlorophyll => weather.is_sunny(),
                Ability::SandRush => weather == Weather::Sandstorm,
                Ability::SlushRush => weather == Weather::Hail,
                _ => false,
            };
            if doubled {
                speed *= 2.0;
            }
        }

        Ok(speed)
    }

    /// Speed of whoever originates `action`, 0 for actions with no origin.
    pub fn action_speed(&self, field: &Field, action: &Action) -> BattleResult<f64> {
        match action.origin() {
            Some(slot) => self.effective_speed(field, slot),
            None => Ok(0.0),
        }
    }

    /// Produce a total order for `actions`.
    ///
    /// Every action draws one tie-break value on every call, so equal
    /// priority and speed are never resolved the same way by caching.
    pub fn order(
        &self,
        field: &Field,
        actions: Vec<Action>,
        rng: &mut dyn RandomSource,
    ) -> BattleResult<Vec<Action>> {
        let mut keyed = Vec::with_capacity(actions.len());
        for action in actions {
            let key = OrderKey {
                priority: action.priority(field)?,
                speed: OrderedFloat(self.action_speed(field, &action)?),
                tie_break: OrderedFloat(rng.float_range(0.0, 1.0, "speed tie")),
            };
            keyed.push((key, action));
        }

        keyed.sort_by(|(a, _), (b, _)| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.speed.cmp(&a.speed))
                .then_with(|| a.tie_break.cmp(&b.tie_break))
        });

        for (key, action) in &keyed {
            debug!(
                priority = key.priority,
                speed = key.speed.0,
                action = action.label(),
                "ordered action"
            );
        }

        Ok(keyed.into_iter().map(|(_, action)| action).collect())
    }
}

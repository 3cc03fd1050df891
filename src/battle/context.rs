use crate::battle::damage::DamagePipeline;
use crate::battle::events::{BattleEvent, EventBus};
use crate::battle::move_effects::EffectRegistry;
use crate::battle::rng::RandomSource;
use crate::battle::state::{Field, SlotRef};

/// Everything an action's logic phase may touch.
///
/// Built by the engine for one queue run. The field and the event bus are the
/// only mutable state; the pipeline and registry are shared collaborators.
pub struct BattleContext<'a> {
    pub field: &'a mut Field,
    pub rng: &'a mut dyn RandomSource,
    pub pipeline: &'a DamagePipeline,
    pub registry: &'a EffectRegistry,
    pub bus: &'a mut EventBus,
}

impl<'a> BattleContext<'a> {
    pub fn new(
        field: &'a mut Field,
        rng: &'a mut dyn RandomSource,
        pipeline: &'a DamagePipeline,
        registry: &'a EffectRegistry,
        bus: &'a mut EventBus,
    ) -> Self {
        Self {
            field,
            rng,
            pipeline,
            registry,
            bus,
        }
    }

    pub fn emit(&mut self, event: BattleEvent) {
        self.bus.push(event);
    }

    /// Display name of whoever sits in `slot`, empty when nobody does.
    pub fn name_at(&self, slot: SlotRef) -> String {
        match self.field.combatant_at(slot) {
            Ok(Some(combatant)) => combatant.name.clone(),
            _ => String::new(),
        }
    }
}

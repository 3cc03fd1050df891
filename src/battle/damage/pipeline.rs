use crate::battle::damage::context::DamageContext;
use crate::battle::damage::steps::{
    AttackerAbilityStep, AttackerItemStep, BaseDamageStep, BurnStep, CriticalHitStep,
    DamageStep, RandomFactorStep, ScreenStep, StabStep, TerrainStep, TypeEffectivenessStep,
    WeatherStep,
};
use crate::battle::rng::RandomSource;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Deterministic injection points for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageOverrides {
    /// Replaces the [0.85, 1.0] roll.
    pub random_factor: Option<f64>,
    /// Replaces the critical hit roll. Moves that cannot crit still never do.
    pub critical: Option<bool>,
}

impl DamageOverrides {
    /// Fixed factor of 1.0 and no critical hits.
    pub fn deterministic() -> Self {
        Self {
            random_factor: Some(1.0),
            critical: Some(false),
        }
    }
}

/// The fixed chain of damage steps.
pub struct DamagePipeline {
    steps: Vec<Box<dyn DamageStep>>,
}

impl DamagePipeline {
    pub fn new(overrides: DamageOverrides) -> Self {
        let steps: Vec<Box<dyn DamageStep>> = vec![
            Box::new(BaseDamageStep),
            Box::new(CriticalHitStep {
                forced: overrides.critical,
            }),
            Box::new(RandomFactorStep {
                fixed: overrides.random_factor,
            }),
            Box::new(StabStep),
            Box::new(AttackerAbilityStep),
            Box::new(AttackerItemStep),
            Box::new(WeatherStep),
            Box::new(TerrainStep),
            Box::new(ScreenStep),
            Box::new(TypeEffectivenessStep),
            Box::new(BurnStep),
        ];
        Self { steps }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Run every step in order and return the final damage.
    pub fn calculate(&self, ctx: &mut DamageContext, rng: &mut dyn RandomSource) -> u16 {
        for step in &self.steps {
            step.apply(ctx, rng);
            debug!(
                step = step.name(),
                base = ctx.base_damage,
                multiplier = ctx.multiplier,
                "damage step"
            );
        }
        let damage = ctx.final_damage();
        debug!(
            move_name = %ctx.move_data.name,
            attacker = %ctx.attacker,
            defender = %ctx.defender,
            damage,
            critical = ctx.critical,
            effectiveness = ctx.effectiveness,
            "damage calculated"
        );
        damage
    }
}

impl std::fmt::Debug for DamagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DamagePipeline")
            .field("steps", &self.step_names())
            .finish()
    }
}

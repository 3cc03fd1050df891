use crate::battle::combatant::Combatant;
use crate::battle::state::{Field, Slot, SlotRef};
use crate::errors::{BattleError, BattleResult};
use schema::{ElementType, MoveData};

/// Per-hit scratch record threaded through the damage steps.
#[derive(Debug, Clone)]
pub struct DamageContext<'a> {
    pub field: &'a Field,
    pub attacker: SlotRef,
    pub defender: SlotRef,
    pub attacker_combatant: &'a Combatant,
    pub defender_combatant: &'a Combatant,
    pub attacker_slot: &'a Slot,
    pub defender_slot: &'a Slot,
    pub move_data: &'a MoveData,
    /// Running product of every step's multiplier.
    pub multiplier: f64,
    pub base_damage: u32,
    pub random_factor: f64,
    pub critical: bool,
    pub stab: bool,
    pub effectiveness: f64,
    /// Set when primal weather wipes out the move's element.
    pub nullified: bool,
    /// Flat reduction for spread moves, 1.0 for single-target hits.
    pub spread_multiplier: f64,
}

impl<'a> DamageContext<'a> {
    /// Both slots must hold a combatant.
    pub fn new(
        field: &'a Field,
        attacker: SlotRef,
        defender: SlotRef,
        move_data: &'a MoveData,
    ) -> BattleResult<Self> {
        let attacker_combatant = field
            .combatant_at(attacker)?
            .ok_or(BattleError::InvalidSlot { slot: attacker })?;
        let defender_combatant = field
            .combatant_at(defender)?
            .ok_or(BattleError::InvalidSlot { slot: defender })?;
        Ok(Self {
            field,
            attacker,
            defender,
            attacker_combatant,
            defender_combatant,
            attacker_slot: field.slot(attacker)?,
            defender_slot: field.slot(defender)?,
            move_data,
            multiplier: 1.0,
            base_damage: 0,
            random_factor: 1.0,
            critical: false,
            stab: false,
            effectiveness: 1.0,
            nullified: false,
            spread_multiplier: 1.0,
        })
    }

    pub fn with_spread_multiplier(mut self, spread_multiplier: f64) -> Self {
        self.spread_multiplier = spread_multiplier;
        self
    }

    pub fn move_element(&self) -> ElementType {
        self.move_data.element
    }

    /// Type chart multiplier of the move against the defender's types.
    pub fn type_multiplier(&self) -> f64 {
        ElementType::combined_effectiveness(self.move_data.element, self.defender_combatant.types())
            as f64
    }

    /// `max(1, floor(base * multiplier))`, or 0 when the hit cannot land at all.
    pub fn final_damage(&self) -> u16 {
        if self.effectiveness == 0.0 || self.nullified {
            return 0;
        }
        let raw = (self.base_damage as f64 * self.multiplier * self.spread_multiplier).floor();
        raw.clamp(1.0, u16::MAX as f64) as u16
    }
}

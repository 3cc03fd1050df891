use crate::battle::action_queue::{ActionQueue, LoggedAction};
use crate::battle::actions::Action;
use crate::battle::combatant::{Combatant, CombatantStats, StatusCondition};
use crate::battle::context::BattleContext;
use crate::battle::damage::{DamageOverrides, DamagePipeline};
use crate::battle::engine::BattleEngine;
use crate::battle::events::{BattleEvent, EventBus};
use crate::battle::move_effects::EffectRegistry;
use crate::battle::rng::ScriptedRng;
use crate::battle::state::{Field, SlotRef};
use crate::battle::turn_order::TurnOrderResolver;
use crate::config::BattleRules;
use crate::errors::BattleResult;
use schema::{
    Ability, BaseStats, ElementType, Item, MoveCategory, MoveData, MoveEffect, MoveFlags,
    SpeciesData, TargetScope,
};
use std::sync::Arc;

/// A builder for test combatants with flat, easy-to-reason-about stats.
///
/// # Example
/// ```ignore
/// let attacker = CombatantBuilder::new("Attacker")
///     .with_attack(50)
///     .with_moves(vec![physical_move("Tackle", ElementType::Normal, 40)])
///     .build();
/// ```
pub struct CombatantBuilder {
    name: String,
    types: Vec<ElementType>,
    level: u8,
    stats: CombatantStats,
    hp: Option<u16>,
    status: Option<StatusCondition>,
    ability: Option<Ability>,
    item: Option<Item>,
    moves: Vec<Arc<MoveData>>,
}

impl CombatantBuilder {
    /// Level 50, typeless, 200 HP and 100 in every other stat.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            types: vec![ElementType::Typeless],
            level: 50,
            stats: CombatantStats {
                hp: 200,
                attack: 100,
                defense: 100,
                sp_attack: 100,
                sp_defense: 100,
                speed: 100,
            },
            hp: None,
            status: None,
            ability: None,
            item: None,
            moves: Vec::new(),
        }
    }

    pub fn with_types(mut self, types: Vec<ElementType>) -> Self {
        self.types = types;
        self
    }

    pub fn with_attack(mut self, attack: u16) -> Self {
        self.stats.attack = attack;
        self
    }

    pub fn with_defense(mut self, defense: u16) -> Self {
        self.stats.defense = defense;
        self
    }

    pub fn with_sp_attack(mut self, sp_attack: u16) -> Self {
        self.stats.sp_attack = sp_attack;
        self
    }

    pub fn with_speed(mut self, speed: u16) -> Self {
        self.stats.speed = speed;
        self
    }

    /// Current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn with_status(mut self, status: StatusCondition) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = Some(ability);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.item = Some(item);
        self
    }

    pub fn with_moves(mut self, moves: Vec<MoveData>) -> Self {
        self.moves = moves.into_iter().map(Arc::new).collect();
        self
    }

    pub fn build(self) -> Combatant {
        let species = Arc::new(SpeciesData {
            name: self.name,
            types: self.types,
            base_stats: BaseStats {
                hp: 100,
                attack: 100,
                defense: 100,
                sp_attack: 100,
                sp_defense: 100,
                speed: 100,
            },
            ability: self.ability,
        });
        let mut combatant = Combatant::with_stats(species, self.level, self.stats, self.moves);
        if let Some(hp) = self.hp {
            combatant.set_hp(hp);
        }
        combatant.status = self.status;
        combatant.item = self.item;
        combatant
    }
}

/// Builder for move records. Defaults: 100 accuracy, 10 PP, single target.
pub struct MoveBuilder {
    data: MoveData,
}

impl MoveBuilder {
    fn base(name: &str, element: ElementType, category: MoveCategory) -> Self {
        Self {
            data: MoveData {
                name: name.to_string(),
                element,
                category,
                power: None,
                accuracy: Some(100),
                max_pp: 10,
                priority: 0,
                target: TargetScope::SingleTarget,
                effects: Vec::new(),
                flags: MoveFlags::default(),
            },
        }
    }

    pub fn physical(name: &str, element: ElementType, power: u16) -> Self {
        let mut builder = Self::base(name, element, MoveCategory::Physical);
        builder.data.power = Some(power);
        builder.data.effects.push(MoveEffect::Damage);
        builder
    }

    pub fn special(name: &str, element: ElementType, power: u16) -> Self {
        let mut builder = Self::base(name, element, MoveCategory::Special);
        builder.data.power = Some(power);
        builder.data.effects.push(MoveEffect::Damage);
        builder
    }

    pub fn status(name: &str) -> Self {
        let mut builder = Self::base(name, ElementType::Normal, MoveCategory::Status);
        builder.data.accuracy = None;
        builder
    }

    pub fn priority(mut self, priority: i8) -> Self {
        self.data.priority = priority;
        self
    }

    pub fn accuracy(mut self, accuracy: Option<u8>) -> Self {
        self.data.accuracy = accuracy;
        self
    }

    pub fn pp(mut self, max_pp: u8) -> Self {
        self.data.max_pp = max_pp;
        self
    }

    pub fn target(mut self, target: TargetScope) -> Self {
        self.data.target = target;
        self
    }

    pub fn effect(mut self, effect: MoveEffect) -> Self {
        self.data.effects.push(effect);
        self
    }

    pub fn flags(mut self, edit: impl FnOnce(&mut MoveFlags)) -> Self {
        edit(&mut self.data.flags);
        self
    }

    pub fn build(self) -> MoveData {
        self.data
    }
}

pub fn physical_move(name: &str, element: ElementType, power: u16) -> MoveData {
    MoveBuilder::physical(name, element, power).build()
}

/// One-on-one field.
pub fn singles(player: Combatant, opponent: Combatant) -> Field {
    Field::new(BattleRules::singles(), vec![player], vec![opponent]).expect("singles rules are valid")
}

pub fn doubles(player: Vec<Combatant>, opponent: Vec<Combatant>) -> Field {
    Field::new(BattleRules::doubles(), player, opponent).expect("doubles rules are valid")
}

/// Level 50 attacker against a defender, no modifiers on either side.
pub fn flat_field(attack: u16, defense: u16) -> Field {
    singles(
        CombatantBuilder::new("Attacker")
            .with_attack(attack)
            .with_sp_attack(attack)
            .build(),
        CombatantBuilder::new("Defender")
            .with_defense(defense)
            .build(),
    )
}

/// Engine with a fixed 1.0 random factor and no critical hits.
pub fn deterministic_engine(field: Field, rng: ScriptedRng) -> BattleEngine {
    BattleEngine::new(
        field,
        TurnOrderResolver::new(),
        DamagePipeline::new(DamageOverrides::deterministic()),
        EffectRegistry::standard(),
        Box::new(rng),
    )
}

/// Runs actions against a field outside of a full turn.
pub struct Harness {
    pub field: Field,
    pub rng: ScriptedRng,
    pub pipeline: DamagePipeline,
    pub registry: EffectRegistry,
    pub bus: EventBus,
}

impl Harness {
    /// Deterministic pipeline, standard registry, every draw returns 50.
    pub fn new(field: Field) -> Self {
        Self {
            field,
            rng: ScriptedRng::repeating(50),
            pipeline: DamagePipeline::new(DamageOverrides::deterministic()),
            registry: EffectRegistry::standard(),
            bus: EventBus::new(),
        }
    }

    pub fn with_rng(mut self, rng: ScriptedRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_registry(mut self, registry: EffectRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Logic phase of a single action, follow-ups returned but not run.
    pub fn execute(&mut self, action: &Action) -> BattleResult<Vec<Action>> {
        let mut ctx = BattleContext::new(
            &mut self.field,
            &mut self.rng,
            &self.pipeline,
            &self.registry,
            &mut self.bus,
        );
        action.execute(&mut ctx)
    }

    /// Run actions and all their follow-ups in the given order.
    pub fn run(&mut self, actions: Vec<Action>) -> BattleResult<Vec<LoggedAction>> {
        let mut log = Vec::new();
        let mut ctx = BattleContext::new(
            &mut self.field,
            &mut self.rng,
            &self.pipeline,
            &self.registry,
            &mut self.bus,
        );
        ActionQueue::in_order(actions).run(&mut ctx, &mut log)?;
        Ok(log)
    }

    pub fn events(&self) -> &[BattleEvent] {
        self.bus.events()
    }

    pub fn combatant(&self, slot: SlotRef) -> &Combatant {
        self.field
            .combatant_at(slot)
            .expect("slot exists")
            .expect("slot is occupied")
    }

    pub fn party_member(&self, slot: SlotRef, index: usize) -> &Combatant {
        &self.field.side(slot.side).party[index]
    }
}

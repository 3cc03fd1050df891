//! Headless demo battle built from the files under `data/`.
//!
//! Each active combatant cycles through the moves it still has PP for; fainted
//! slots are refilled from the bench in party order.

use async_trait::async_trait;
use battle_engine::{
    Action, BattleEngine, BattleRules, BattleView, Catalog, CatalogResult, Combatant,
    DamageOverrides, DamagePipeline, EffectRegistry, Field, SeededRng, SideId, SlotRef,
    StatType, StatusType, TurnOrderResolver,
};
use std::error::Error;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LEVEL: u8 = 50;
const SEED: u64 = 7;
const MAX_TURNS: u32 = 200;

type PartySpec<'a> = &'a [(&'a str, &'a [&'a str])];

const PLAYER_PARTY: PartySpec<'static> = &[
    ("Charmander", &["Ember", "Quick Attack", "Growl", "Flamethrower"]),
    ("Pikachu", &["Thunder Shock", "Quick Attack", "Thunder Wave", "Protect"]),
    ("Machop", &["Focus Punch", "Tackle", "Rock Slide", "Protect"]),
];

const OPPONENT_PARTY: PartySpec<'static> = &[
    ("Squirtle", &["Water Gun", "Tackle", "Rain Dance", "Surf"]),
    ("Bulbasaur", &["Vine Whip", "Giga Drain", "Solar Beam", "Growl"]),
    ("Geodude", &["Rock Slide", "Earthquake", "Dig", "Double-Edge"]),
];

/// Prints messages and HP changes to stdout.
struct ConsoleView;

#[async_trait]
impl BattleView for ConsoleView {
    async fn show_message(&self, text: &str) {
        println!("{}", text);
    }

    async fn animate_move(&self, _user: SlotRef, _move_name: &str) {}

    async fn animate_damage(&self, target: SlotRef, _amount: u16, hp: u16, max_hp: u16) {
        println!("  [{}] {}/{} HP", target, hp, max_hp);
    }

    async fn animate_faint(&self, _target: SlotRef) {}

    async fn animate_switch(&self, _slot: SlotRef, _incoming: &str) {}

    async fn animate_status(&self, _target: SlotRef, _status: StatusType) {}

    async fn show_stat_change(&self, _target: SlotRef, _stat: StatType, _delta: i8) {}
}

fn build_party(catalog: &Catalog, members: PartySpec<'_>) -> CatalogResult<Vec<Combatant>> {
    members
        .iter()
        .map(|(species, moves)| {
            let species = catalog.get_species(species)?;
            let moves = catalog.moves(moves.iter().copied())?;
            Ok(Combatant::new(species, LEVEL, moves))
        })
        .collect()
}

fn choose_actions(field: &Field) -> Vec<Action> {
    field
        .occupied_slots()
        .into_iter()
        .filter_map(|slot| {
            let combatant = field.living_combatant(slot).ok().flatten()?;
            let usable: Vec<usize> = combatant
                .moves
                .iter()
                .enumerate()
                .filter(|(_, instance)| instance.pp > 0)
                .map(|(index, _)| index)
                .collect();
            let index = match usable.len() {
                0 => 0,
                count => usable[field.turn_number as usize % count],
            };
            Some(Action::use_move(slot, index, None))
        })
        .collect()
}

fn replacements(engine: &BattleEngine) -> Vec<Action> {
    let pending = engine.pending_replacements();
    let mut actions = Vec::new();
    for side in SideId::ALL {
        let bench = engine.field().side(side).bench();
        let slots = pending.iter().filter(|slot| slot.side == side);
        actions.extend(
            slots
                .zip(bench)
                .map(|(slot, incoming)| Action::Switch { slot: *slot, incoming }),
        );
    }
    actions
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_path = Path::new("data");
    let catalog = Catalog::load(&data_path.join("catalog.ron"))?;
    let rules = BattleRules::load(&data_path.join("rules.ron"))?;

    let field = Field::new(
        rules,
        build_party(&catalog, PLAYER_PARTY)?,
        build_party(&catalog, OPPONENT_PARTY)?,
    )?;
    let mut engine = BattleEngine::new(
        field,
        TurnOrderResolver::new(),
        DamagePipeline::new(DamageOverrides::default()),
        EffectRegistry::standard(),
        Box::new(SeededRng::new(SEED)),
    );
    let view = ConsoleView;

    while !engine.is_over() && engine.field().turn_number < MAX_TURNS {
        let actions = choose_actions(engine.field());
        let log = engine.resolve_turn(actions)?;
        log.present(&view).await;

        let refill = replacements(&engine);
        if !refill.is_empty() {
            let log = engine.run_system_actions(refill)?;
            log.present(&view).await;
        }
    }

    info!(
        outcome = ?engine.outcome(),
        turns = engine.field().turn_number,
        "battle finished"
    );
    println!("{}", serde_json::to_string_pretty(engine.statistics())?);
    Ok(())
}

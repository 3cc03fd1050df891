use crate::battle::conditions::VolatileFlags;
use crate::battle::damage::context::DamageContext;
use crate::battle::rng::RandomSource;
use crate::battle::stats::{effective_attack, effective_defense};
use schema::{Ability, ElementType, Item, MoveCategory, StatusType};

/// One layer of the damage formula.
///
/// Steps only touch the context they are handed. They may draw from the
/// random source but never mutate the field.
pub trait DamageStep: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, ctx: &mut DamageContext, rng: &mut dyn RandomSource);
}

// =================================================================
// Base damage
// =================================================================

/// `((2L/5 + 2) * power * atk / def) / 50 + 2`, integer arithmetic throughout.
pub fn base_damage(ctx: &DamageContext, critical: bool) -> u32 {
    let Some(power) = ctx.move_data.power else {
        return 0;
    };
    let category = ctx.move_data.category;
    if category == MoveCategory::Status {
        return 0;
    }

    let mut power = power as u32;
    if power <= 60 && ctx.attacker_combatant.has_ability(Ability::Technician) {
        power = power * 3 / 2;
    }
    if ctx.move_data.flags.punishes_switch && defender_switched_out(ctx) {
        power *= 2;
    }

    let attack = effective_attack(ctx.field, ctx.attacker, category, critical)
        .unwrap_or(1)
        .max(1) as u32;
    let defense = effective_defense(ctx.field, ctx.defender, category, critical)
        .unwrap_or(1)
        .max(1) as u32;

    let level_factor = 2 * ctx.attacker_combatant.level as u32 / 5 + 2;
    (level_factor * power * attack / defense) / 50 + 2
}

/// The slot's previous occupant left this turn and still carries its
/// switching-out mark.
fn defender_switched_out(ctx: &DamageContext) -> bool {
    ctx.defender_slot
        .switched_out
        .and_then(|id| ctx.field.side(ctx.defender.side).combatant(id))
        .is_some_and(|outgoing| outgoing.volatiles.contains(VolatileFlags::SWITCHING_OUT))
}

pub struct BaseDamageStep;

impl DamageStep for BaseDamageStep {
    fn name(&self) -> &'static str {
        "base damage"
    }

    fn apply(&self, ctx: &mut DamageContext, _rng: &mut dyn RandomSource) {
        ctx.base_damage = base_damage(ctx, false);
    }
}

// =================================================================
// Critical hit
// =================================================================

/// Rolls for a critical hit unless `forced` pins the result.
///
/// A critical hit recomputes the base damage with only the stages that help
/// the attacker, then multiplies by 1.5.
pub struct CriticalHitStep {
    pub forced: Option<bool>,
}

impl CriticalHitStep {
    /// 1-in-N odds for each crit stage.
    pub fn denominator(stage: u8) -> u32 {
        match stage {
            0 => 24,
            1 => 8,
            2 => 2,
            _ => 1,
        }
    }
}

impl DamageStep for CriticalHitStep {
    fn name(&self) -> &'static str {
        "critical hit"
    }

    fn apply(&self, ctx: &mut DamageContext, rng: &mut dyn RandomSource) {
        if ctx.move_data.flags.cannot_crit {
            ctx.critical = false;
            return;
        }
        ctx.critical = match self.forced {
            Some(forced) => forced,
            None => match Self::denominator(ctx.move_data.flags.crit_stage) {
                1 => true,
                odds => rng.int_range(1, odds, "critical hit") == 1,
            },
        };
        if ctx.critical {
            ctx.base_damage = base_damage(ctx, true);
            ctx.multiplier *= 1.5;
        }
    }
}

// =================================================================
// Random factor
// =================================================================

pub struct RandomFactorStep {
    pub fixed: Option<f64>,
}

impl DamageStep for RandomFactorStep {
    fn name(&self) -> &'static str {
        "random factor"
    }

    fn apply(&self, ctx: &mut DamageContext, rng: &mut dyn RandomSource) {
        let factor = match self.fixed {
            Some(fixed) => fixed,
            None => rng.float_range(0.85, 1.0, "damage roll"),
        };
        ctx.random_factor = factor;
        ctx.multiplier *= factor;
    }
}

// =================================================================
// Attacker modifiers
// =================================================================

pub struct StabStep;

impl DamageStep for StabStep {
    fn name(&self) -> &'static str {
        "same-type bonus"
    }

    fn apply(&self, ctx: &mut DamageContext, _rng: &mut dyn RandomSource) {
        let element = ctx.move_element();
        if element == ElementType::Typeless || !ctx.attacker_combatant.has_type(element) {
            return;
        }
        ctx.stab = true;
        ctx.multiplier *= if ctx.attacker_combatant.has_ability(Ability::Adaptability) {
            2.0
        } else {
            1.5
        };
    }
}

/// Pinch abilities boost their element at a third of max HP or less.
pub struct AttackerAbilityStep;

impl DamageStep for AttackerAbilityStep {
    fn name(&self) -> &'static str {
        "attacker ability"
    }

    fn apply(&self, ctx: &mut DamageContext, _rng: &mut dyn RandomSource) {
        let attacker = ctx.attacker_combatant;
        let Some(element) = attacker.ability.and_then(|ability| ability.pinch_element()) else {
            return;
        };
        if element == ctx.move_element() && attacker.current_hp() as u32 * 3 <= attacker.max_hp() as u32 {
            ctx.multiplier *= 1.5;
        }
    }
}

pub struct AttackerItemStep;

impl DamageStep for AttackerItemStep {
    fn name(&self) -> &'static str {
        "attacker item"
    }

    fn apply(&self, ctx: &mut DamageContext, _rng: &mut dyn RandomSource) {
        match ctx.attacker_combatant.item {
            Some(Item::LifeOrb) => ctx.multiplier *= 1.3,
            Some(Item::ExpertBelt) if ctx.type_multiplier() > 1.0 => ctx.multiplier *= 1.2,
            Some(Item::TypeBoost(element)) if element == ctx.move_element() => {
                ctx.multiplier *= 1.2
            }
            _ => {}
        }
    }
}

// =================================================================
// Field modifiers
// =================================================================

pub struct WeatherStep;

impl DamageStep for WeatherStep {
    fn name(&self) -> &'static str {
        "weather"
    }

    fn apply(&self, ctx: &mut DamageContext, _rng: &mut dyn RandomSource) {
        let Some(weather) = ctx.field.weather() else {
            return;
        };
        let element = ctx.move_element();
        if weather.nullified_element() == Some(element) {
            ctx.nullified = true;
            return;
        }
        match element {
            ElementType::Fire if weather.is_sunny() => ctx.multiplier *= 1.5,
            ElementType::Fire if weather.is_rainy() => ctx.multiplier *= 0.5,
            ElementType::Water if weather.is_rainy() => ctx.multiplier *= 1.5,
            ElementType::Water if weather.is_sunny() => ctx.multiplier *= 0.5,
            _ => {}
        }
    }
}

pub struct TerrainStep;

impl DamageStep for TerrainStep {
    fn name(&self) -> &'static str {
        "terrain"
    }

    fn apply(&self, ctx: &mut DamageContext, _rng: &mut dyn RandomSource) {
        let Some(terrain) = ctx.field.terrain() else {
            return;
        };
        let element = ctx.move_element();
        if terrain.boosted_element() == Some(element) && ctx.attacker_combatant.is_grounded() {
            ctx.multiplier *= 1.3;
        }
        if terrain.weakened_element() == Some(element) && ctx.defender_combatant.is_grounded() {
            ctx.multiplier *= 0.5;
        }
    }
}

/// Screens on the defender's side. Critical hits go straight through, and
/// overlapping screens only count once.
pub struct ScreenStep;

impl DamageStep for ScreenStep {
    fn name(&self) -> &'static str {
        "screens"
    }

    fn apply(&self, ctx: &mut DamageContext, _rng: &mut dyn RandomSource) {
        if ctx.critical {
            return;
        }
        let category = ctx.move_data.category;
        let screened = ctx
            .field
            .side(ctx.defender.side)
            .conditions
            .keys()
            .any(|condition| condition.screens(category));
        if !screened {
            return;
        }
        ctx.multiplier *= if ctx.field.rules.multi_slot() {
            ctx.field.rules.multi_screen_multiplier
        } else {
            0.5
        };
    }
}

// =================================================================
// Defender modifiers
// =================================================================

pub struct TypeEffectivenessStep;

impl DamageStep for TypeEffectivenessStep {
    fn name(&self) -> &'static str {
        "type effectiveness"
    }

    fn apply(&self, ctx: &mut DamageContext, _rng: &mut dyn RandomSource) {
        let effectiveness = ctx.type_multiplier();
        ctx.effectiveness = effectiveness;
        ctx.multiplier *= effectiveness;
    }
}

pub struct BurnStep;

impl DamageStep for BurnStep {
    fn name(&self) -> &'static str {
        "burn"
    }

    fn apply(&self, ctx: &mut DamageContext, _rng: &mut dyn RandomSource) {
        if ctx.move_data.category == MoveCategory::Physical
            && ctx.attacker_combatant.status_type() == Some(StatusType::Burn)
        {
            ctx.multiplier *= 0.5;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::combatant::Combatant;
    use crate::battle::rng::ScriptedRng;
    use crate::battle::state::{CombatantId, Field, SlotRef, TerrainState, WeatherState};
    use crate::battle::tests::common::{flat_field, physical_move, singles, CombatantBuilder};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{MoveData, SideCondition, Terrain, Weather};

    fn attacker() -> SlotRef {
        SlotRef::player(0)
    }

    fn defender() -> SlotRef {
        SlotRef::opponent(0)
    }

    /// Multiplier left by one step run on a fresh context.
    fn step_multiplier(step: &dyn DamageStep, field: &Field, move_data: &MoveData) -> f64 {
        let mut ctx = DamageContext::new(field, attacker(), defender(), move_data)
            .expect("both slots occupied");
        step.apply(&mut ctx, &mut ScriptedRng::new_for_test(vec![]));
        ctx.multiplier
    }

    fn duel(user: Combatant, foe: Combatant) -> Field {
        singles(user, foe)
    }

    #[test]
    fn base_damage_step_pins_the_formula() {
        let field = flat_field(50, 50);
        let tackle = physical_move("Tackle", ElementType::Normal, 40);
        let mut ctx =
            DamageContext::new(&field, SlotRef::player(0), SlotRef::opponent(0), &tackle)
                .expect("both slots occupied");
        let mut rng = ScriptedRng::new_for_test(vec![]);

        BaseDamageStep.apply(&mut ctx, &mut rng);

        assert_eq!(ctx.base_damage, 19);
        assert_eq!(ctx.multiplier, 1.0);
    }

    #[test]
    fn cannot_crit_moves_never_roll() {
        let field = flat_field(50, 50);
        let mut tackle = physical_move("Tackle", ElementType::Normal, 40);
        tackle.flags.cannot_crit = true;
        let mut ctx =
            DamageContext::new(&field, SlotRef::player(0), SlotRef::opponent(0), &tackle)
                .expect("both slots occupied");
        let mut rng = ScriptedRng::new_for_test(vec![]);

        CriticalHitStep { forced: Some(true) }.apply(&mut ctx, &mut rng);

        assert!(!ctx.critical);
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn crit_stage_three_always_crits_without_drawing() {
        let field = flat_field(50, 50);
        let mut slash = physical_move("Slash", ElementType::Normal, 70);
        slash.flags.crit_stage = 3;
        let mut ctx =
            DamageContext::new(&field, SlotRef::player(0), SlotRef::opponent(0), &slash)
                .expect("both slots occupied");
        let mut rng = ScriptedRng::new_for_test(vec![]);

        CriticalHitStep { forced: None }.apply(&mut ctx, &mut rng);

        assert!(ctx.critical);
        assert_eq!(ctx.multiplier, 1.5);
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn screen_step_skips_critical_hits() {
        let mut field = flat_field(50, 50);
        field
            .side_mut(SlotRef::opponent(0).side)
            .conditions
            .insert(SideCondition::Reflect, 5);
        let tackle = physical_move("Tackle", ElementType::Normal, 40);
        let mut ctx =
            DamageContext::new(&field, SlotRef::player(0), SlotRef::opponent(0), &tackle)
                .expect("both slots occupied");
        let mut rng = ScriptedRng::new_for_test(vec![]);

        ctx.critical = true;
        ScreenStep.apply(&mut ctx, &mut rng);
        assert_eq!(ctx.multiplier, 1.0);

        ctx.critical = false;
        ScreenStep.apply(&mut ctx, &mut rng);
        assert_eq!(ctx.multiplier, 0.5);
    }

    #[test]
    fn primal_weather_nullifies_opposing_element() {
        let mut field = flat_field(50, 50);
        field.weather = Some(crate::battle::state::WeatherState {
            weather: Weather::HarshSunlight,
            turns_remaining: None,
        });
        let surf = physical_move("Surf", ElementType::Water, 90);
        let mut ctx =
            DamageContext::new(&field, SlotRef::player(0), SlotRef::opponent(0), &surf)
                .expect("both slots occupied");
        let mut rng = ScriptedRng::new_for_test(vec![]);

        BaseDamageStep.apply(&mut ctx, &mut rng);
        WeatherStep.apply(&mut ctx, &mut rng);

        assert!(ctx.nullified);
        assert_eq!(ctx.final_damage(), 0);
    }

    #[test]
    fn burn_halves_physical_only() {
        let mut field = flat_field(50, 50);
        if let Ok(Some(attacker)) = field.combatant_at_mut(SlotRef::player(0)) {
            attacker.status = Some(crate::battle::combatant::StatusCondition::Burn);
        }
        let tackle = physical_move("Tackle", ElementType::Normal, 40);
        let mut special = tackle.clone();
        special.category = MoveCategory::Special;
        let mut rng = ScriptedRng::new_for_test(vec![]);

        let mut ctx =
            DamageContext::new(&field, SlotRef::player(0), SlotRef::opponent(0), &tackle)
                .expect("both slots occupied");
        BurnStep.apply(&mut ctx, &mut rng);
        assert_eq!(ctx.multiplier, 0.5);

        let mut ctx =
            DamageContext::new(&field, SlotRef::player(0), SlotRef::opponent(0), &special)
                .expect("both slots occupied");
        BurnStep.apply(&mut ctx, &mut rng);
        assert_eq!(ctx.multiplier, 1.0);
    }

    #[rstest]
    #[case::sun_fire(Weather::Sun, ElementType::Fire, 1.5)]
    #[case::sun_water(Weather::Sun, ElementType::Water, 0.5)]
    #[case::rain_water(Weather::Rain, ElementType::Water, 1.5)]
    #[case::rain_fire(Weather::Rain, ElementType::Fire, 0.5)]
    #[case::sandstorm_fire(Weather::Sandstorm, ElementType::Fire, 1.0)]
    #[case::sun_normal(Weather::Sun, ElementType::Normal, 1.0)]
    fn weather_scales_fire_and_water(
        #[case] weather: Weather,
        #[case] element: ElementType,
        #[case] expected: f64,
    ) {
        let mut field = flat_field(50, 50);
        field.weather = Some(WeatherState {
            weather,
            turns_remaining: Some(5),
        });
        let move_data = physical_move("Blast", element, 60);

        assert_eq!(step_multiplier(&WeatherStep, &field, &move_data), expected);
    }

    #[rstest]
    #[case::grounded_attacker(vec![ElementType::Typeless], 1.3)]
    #[case::flying_attacker(vec![ElementType::Flying], 1.0)]
    fn terrain_boosts_grounded_attackers(
        #[case] attacker_types: Vec<ElementType>,
        #[case] expected: f64,
    ) {
        let mut field = duel(
            CombatantBuilder::new("Attacker").with_types(attacker_types).build(),
            CombatantBuilder::new("Defender").build(),
        );
        field.terrain = Some(TerrainState {
            terrain: Terrain::Electric,
            turns_remaining: 5,
        });
        let spark = physical_move("Spark", ElementType::Electric, 65);

        assert_eq!(step_multiplier(&TerrainStep, &field, &spark), expected);
    }

    #[rstest]
    #[case::grounded_defender(None, 0.5)]
    #[case::levitating_defender(Some(Ability::Levitate), 1.0)]
    fn misty_terrain_weakens_dragon_moves_on_grounded_defenders(
        #[case] ability: Option<Ability>,
        #[case] expected: f64,
    ) {
        let mut target = CombatantBuilder::new("Defender");
        if let Some(ability) = ability {
            target = target.with_ability(ability);
        }
        let mut field = duel(CombatantBuilder::new("Attacker").build(), target.build());
        field.terrain = Some(TerrainState {
            terrain: Terrain::Misty,
            turns_remaining: 5,
        });
        let dragon_claw = physical_move("Dragon Claw", ElementType::Dragon, 80);

        assert_eq!(step_multiplier(&TerrainStep, &field, &dragon_claw), expected);
    }

    #[rstest]
    #[case::at_a_third(66, ElementType::Fire, 1.5)]
    #[case::above_a_third(67, ElementType::Fire, 1.0)]
    #[case::other_element(10, ElementType::Water, 1.0)]
    fn pinch_abilities_boost_at_low_hp(
        #[case] hp: u16,
        #[case] element: ElementType,
        #[case] expected: f64,
    ) {
        let field = duel(
            CombatantBuilder::new("Attacker")
                .with_ability(Ability::Blaze)
                .with_hp(hp)
                .build(),
            CombatantBuilder::new("Defender").build(),
        );
        let move_data = physical_move("Blast", element, 60);

        assert_eq!(
            step_multiplier(&AttackerAbilityStep, &field, &move_data),
            expected
        );
    }

    #[rstest]
    #[case::matching_plate(Item::TypeBoost(ElementType::Fire), vec![ElementType::Typeless], 1.2)]
    #[case::other_plate(Item::TypeBoost(ElementType::Water), vec![ElementType::Typeless], 1.0)]
    #[case::expert_belt_super_effective(Item::ExpertBelt, vec![ElementType::Grass], 1.2)]
    #[case::expert_belt_neutral(Item::ExpertBelt, vec![ElementType::Typeless], 1.0)]
    #[case::life_orb(Item::LifeOrb, vec![ElementType::Typeless], 1.3)]
    fn attacker_items_scale_damage(
        #[case] item: Item,
        #[case] defender_types: Vec<ElementType>,
        #[case] expected: f64,
    ) {
        let field = duel(
            CombatantBuilder::new("Attacker").with_item(item).build(),
            CombatantBuilder::new("Defender")
                .with_types(defender_types)
                .build(),
        );
        let ember = physical_move("Ember", ElementType::Fire, 40);

        assert_eq!(step_multiplier(&AttackerItemStep, &field, &ember), expected);
    }

    #[rstest]
    #[case::weak_move(40, 28)]
    #[case::strong_move(70, 32)]
    fn technician_powers_up_weak_moves(#[case] power: u16, #[case] expected: u32) {
        let field = duel(
            CombatantBuilder::new("Attacker")
                .with_ability(Ability::Technician)
                .build(),
            CombatantBuilder::new("Defender").build(),
        );
        let move_data = physical_move("Strike", ElementType::Normal, power);
        let ctx = DamageContext::new(&field, attacker(), defender(), &move_data)
            .expect("both slots occupied");

        assert_eq!(base_damage(&ctx, false), expected);
    }

    #[rstest]
    #[case::plain_stab(None, 1.5)]
    #[case::adaptability(Some(Ability::Adaptability), 2.0)]
    fn same_type_bonus(#[case] ability: Option<Ability>, #[case] expected: f64) {
        let mut user = CombatantBuilder::new("Attacker").with_types(vec![ElementType::Fire]);
        if let Some(ability) = ability {
            user = user.with_ability(ability);
        }
        let field = duel(user.build(), CombatantBuilder::new("Defender").build());
        let ember = physical_move("Ember", ElementType::Fire, 40);
        let mut ctx = DamageContext::new(&field, attacker(), defender(), &ember)
            .expect("both slots occupied");

        StabStep.apply(&mut ctx, &mut ScriptedRng::new_for_test(vec![]));

        assert!(ctx.stab);
        assert_eq!(ctx.multiplier, expected);
    }

    #[test]
    fn typeless_attackers_get_no_same_type_bonus() {
        let field = flat_field(50, 50);
        let tackle = physical_move("Tackle", ElementType::Normal, 40);

        assert_eq!(step_multiplier(&StabStep, &field, &tackle), 1.0);
    }

    #[rstest]
    #[case::still_marked(true, 37)]
    #[case::mark_cleared(false, 19)]
    fn punish_on_switch_reads_the_outgoing_mark(#[case] marked: bool, #[case] expected: u32) {
        // Arrange: the defender's previous occupant left this turn
        let mut field = flat_field(100, 100);
        let side = field.side_mut(defender().side);
        side.party.push(CombatantBuilder::new("Relief").build());
        if marked {
            side.party[0].volatiles.insert(VolatileFlags::SWITCHING_OUT);
        }
        {
            let slot = field.slot_mut(defender()).expect("slot exists");
            slot.reset_for(Some(CombatantId(1)));
            slot.switched_out = Some(CombatantId(0));
        }
        let mut pursuit = physical_move("Pursuit", ElementType::Dark, 40);
        pursuit.flags.punishes_switch = true;

        // Act
        let ctx = DamageContext::new(&field, attacker(), defender(), &pursuit)
            .expect("both slots occupied");

        // Assert
        assert_eq!(base_damage(&ctx, false), expected);
    }
}

#[cfg(test)]
mod tests {
    use crate::battle::actions::Action;
    use crate::battle::combatant::StatusCondition;
    use crate::battle::conditions::VolatileFlags;
    use crate::battle::events::{BattleEvent, FailureReason};
    use crate::battle::rng::ScriptedRng;
    use crate::battle::state::{SlotRef, WeatherState};
    use crate::battle::tests::common::{
        deterministic_engine, physical_move, singles, CombatantBuilder, Harness, MoveBuilder,
    };
    use crate::errors::BattleError;
    use pretty_assertions::assert_eq;
    use schema::{
        Ability, ElementType, MoveData, MoveEffect, SemiInvulnerableLocation, StatusType,
        TargetScope, Weather,
    };

    fn user() -> SlotRef {
        SlotRef::player(0)
    }

    fn foe() -> SlotRef {
        SlotRef::opponent(0)
    }

    fn tackle() -> MoveData {
        physical_move("Tackle", ElementType::Normal, 40)
    }

    fn solar_beam() -> MoveData {
        MoveBuilder::special("Solar Beam", ElementType::Grass, 40)
            .effect(MoveEffect::ChargeUp)
            .flags(|flags| flags.skips_charge_in = vec![Weather::Sun])
            .build()
    }

    fn dig() -> MoveData {
        MoveBuilder::physical("Dig", ElementType::Ground, 40)
            .effect(MoveEffect::SemiInvulnerable(
                SemiInvulnerableLocation::Underground,
            ))
            .build()
    }

    fn protect() -> MoveData {
        MoveBuilder::status("Protect")
            .priority(4)
            .target(TargetScope::User)
            .effect(MoveEffect::Protect)
            .build()
    }

    fn focus_punch() -> MoveData {
        MoveBuilder::physical("Focus Punch", ElementType::Fighting, 40)
            .priority(-3)
            .effect(MoveEffect::Focus)
            .build()
    }

    /// Player uses `user_moves`, opponent knows Tackle and Earthquake.
    fn harness_with(user_moves: Vec<MoveData>) -> Harness {
        let earthquake = MoveBuilder::physical("Earthquake", ElementType::Ground, 40)
            .target(TargetScope::AllOthers)
            .flags(|flags| {
                flags.hits_semi_invulnerable = vec![SemiInvulnerableLocation::Underground]
            })
            .build();
        Harness::new(singles(
            CombatantBuilder::new("User").with_moves(user_moves).build(),
            CombatantBuilder::new("Foe")
                .with_moves(vec![tackle(), earthquake])
                .build(),
        ))
    }

    fn failures(events: &[BattleEvent]) -> Vec<FailureReason> {
        events
            .iter()
            .filter_map(|event| match event {
                BattleEvent::ActionFailed { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect()
    }

    fn damage_events(events: &[BattleEvent]) -> usize {
        events
            .iter()
            .filter(|event| matches!(event, BattleEvent::DamageDealt { .. }))
            .count()
    }

    #[test]
    fn charging_move_charges_then_strikes() {
        // Arrange
        let mut harness = harness_with(vec![solar_beam()]);

        // Act: first use
        let follow_ups = harness
            .execute(&Action::use_move(user(), 0, None))
            .expect("move use succeeds");

        // Assert: PP spent, charge announced, no damage
        assert_eq!(follow_ups, vec![]);
        assert_eq!(harness.combatant(user()).moves[0].pp, 9);
        assert_eq!(harness.combatant(foe()).current_hp(), 200);
        assert_eq!(damage_events(harness.events()), 0);
        assert!(harness.events().contains(&BattleEvent::MoveCharging {
            user: user(),
            name: "User".to_string(),
            move_name: "Solar Beam".to_string(),
            location: None,
        }));
        let slot = harness.field.slot(user()).expect("slot exists");
        assert!(slot.has(VolatileFlags::CHARGING));
        assert_eq!(slot.charging_move.as_deref(), Some("Solar Beam"));

        // Act: second use
        harness
            .run(vec![Action::use_move(user(), 0, None)])
            .expect("move use succeeds");

        // Assert: damage lands, no extra PP, charge state cleared
        assert_eq!(harness.combatant(foe()).current_hp(), 181);
        assert_eq!(harness.combatant(user()).moves[0].pp, 9);
        let slot = harness.field.slot(user()).expect("slot exists");
        assert!(!slot.has(VolatileFlags::CHARGING));
        assert_eq!(slot.charging_move, None);
    }

    #[test]
    fn charging_is_skipped_in_matching_weather() {
        let mut harness = harness_with(vec![solar_beam()]);
        harness.field.weather = Some(WeatherState {
            weather: Weather::Sun,
            turns_remaining: Some(5),
        });

        harness
            .run(vec![Action::use_move(user(), 0, None)])
            .expect("move use succeeds");

        assert_eq!(harness.combatant(foe()).current_hp(), 181);
        assert_eq!(harness.combatant(user()).moves[0].pp, 9);
        assert!(!harness
            .field
            .slot(user())
            .expect("slot exists")
            .has(VolatileFlags::CHARGING));
    }

    #[test]
    fn choosing_another_move_abandons_the_charge() {
        let mut harness = harness_with(vec![solar_beam(), tackle()]);

        harness
            .run(vec![
                Action::use_move(user(), 0, None),
                Action::use_move(user(), 1, None),
            ])
            .expect("move uses succeed");

        let slot = harness.field.slot(user()).expect("slot exists");
        assert!(!slot.has(VolatileFlags::CHARGING));
        assert_eq!(slot.charging_move, None);
        assert_eq!(harness.combatant(foe()).current_hp(), 181);
    }

    #[test]
    fn semi_invulnerable_user_dodges_all_but_allowed_moves() {
        // Arrange
        let mut harness = harness_with(vec![dig()]);

        // Act: dig underground, then the foe tries Tackle and Earthquake
        harness
            .run(vec![
                Action::use_move(user(), 0, None),
                Action::use_move(foe(), 0, None),
            ])
            .expect("move uses succeed");

        // Assert
        assert_eq!(harness.combatant(user()).current_hp(), 200);
        assert!(harness.events().contains(&BattleEvent::MoveMissed {
            user: foe(),
            target: user(),
            target_name: "User".to_string(),
        }));

        harness
            .run(vec![Action::use_move(foe(), 1, None)])
            .expect("move use succeeds");
        assert_eq!(harness.combatant(user()).current_hp(), 181);
    }

    #[test]
    fn protection_blocks_moves_and_decays() {
        // Arrange
        let mut harness =
            harness_with(vec![protect()]).with_rng(ScriptedRng::new_for_test(vec![50, 1]));

        // Act: the first protect always works
        harness
            .run(vec![
                Action::use_move(user(), 0, None),
                Action::use_move(foe(), 0, None),
            ])
            .expect("move uses succeed");

        // Assert
        assert_eq!(harness.combatant(user()).current_hp(), 200);
        assert!(harness.events().contains(&BattleEvent::MoveBlocked {
            target: user(),
            name: "User".to_string(),
        }));
        assert_eq!(harness.field.slot(user()).expect("slot exists").protect_streak, 1);

        // Act: a second protect in a row has 1/3 odds; 50 misses
        harness
            .field
            .slot_mut(user())
            .expect("slot exists")
            .volatiles
            .remove(VolatileFlags::PROTECTED);
        harness
            .run(vec![Action::use_move(user(), 0, None)])
            .expect("move use succeeds");

        // Assert
        let slot = harness.field.slot(user()).expect("slot exists");
        assert!(!slot.has(VolatileFlags::PROTECTED));
        assert_eq!(slot.protect_streak, 0);
        assert_eq!(failures(harness.events()), vec![FailureReason::ProtectFailed]);

        // Act: the streak was reset, so the next one works without a draw
        harness
            .run(vec![Action::use_move(user(), 0, None)])
            .expect("move use succeeds");
        assert_eq!(harness.field.slot(user()).expect("slot exists").protect_streak, 1);
        assert_eq!(harness.rng.consumed(), 1);
    }

    #[test]
    fn moves_that_bypass_protection_still_land() {
        let feint = MoveBuilder::physical("Feint", ElementType::Normal, 40)
            .flags(|flags| flags.bypasses_protection = true)
            .build();
        let mut harness = Harness::new(singles(
            CombatantBuilder::new("User").with_moves(vec![protect()]).build(),
            CombatantBuilder::new("Foe").with_moves(vec![feint]).build(),
        ));

        harness
            .run(vec![
                Action::use_move(user(), 0, None),
                Action::use_move(foe(), 0, None),
            ])
            .expect("move uses succeed");

        assert_eq!(harness.combatant(user()).current_hp(), 181);
    }

    #[test]
    fn flinch_stops_the_move_before_pp_is_spent() {
        let mut harness = harness_with(vec![tackle()]);
        harness
            .field
            .slot_mut(user())
            .expect("slot exists")
            .volatiles
            .insert(VolatileFlags::FLINCH);

        harness
            .run(vec![Action::use_move(user(), 0, None)])
            .expect("move use succeeds");

        assert_eq!(failures(harness.events()), vec![FailureReason::Flinched]);
        assert_eq!(harness.combatant(user()).moves[0].pp, 10);
        assert_eq!(harness.combatant(foe()).current_hp(), 200);
        assert!(!harness
            .field
            .slot(user())
            .expect("slot exists")
            .has(VolatileFlags::FLINCH));
    }

    #[test]
    fn sleep_counts_down_then_wakes() {
        // Arrange
        let mut harness = Harness::new(singles(
            CombatantBuilder::new("Sleeper")
                .with_status(StatusCondition::Sleep(1))
                .with_moves(vec![tackle()])
                .build(),
            CombatantBuilder::new("Foe").build(),
        ));

        // Act: still asleep
        harness
            .run(vec![Action::use_move(user(), 0, None)])
            .expect("move use succeeds");

        // Assert
        assert_eq!(failures(harness.events()), vec![FailureReason::Asleep]);
        assert_eq!(
            harness.combatant(user()).status,
            Some(StatusCondition::Sleep(0))
        );

        // Act: wakes up and attacks
        harness
            .run(vec![Action::use_move(user(), 0, None)])
            .expect("move use succeeds");

        // Assert
        assert_eq!(harness.combatant(user()).status, None);
        assert!(harness.events().contains(&BattleEvent::StatusCured {
            target: user(),
            name: "Sleeper".to_string(),
            status: StatusType::Sleep,
        }));
        assert_eq!(harness.combatant(foe()).current_hp(), 181);
    }

    #[test]
    fn frozen_combatants_thaw_on_a_low_roll() {
        let frozen = || {
            singles(
                CombatantBuilder::new("Frozen")
                    .with_status(StatusCondition::Freeze)
                    .with_moves(vec![tackle()])
                    .build(),
                CombatantBuilder::new("Foe").build(),
            )
        };

        let mut stays = Harness::new(frozen());
        stays
            .run(vec![Action::use_move(user(), 0, None)])
            .expect("move use succeeds");
        assert_eq!(failures(stays.events()), vec![FailureReason::Frozen]);
        assert_eq!(stays.combatant(user()).status, Some(StatusCondition::Freeze));

        let mut thaws = Harness::new(frozen()).with_rng(ScriptedRng::new_for_test(vec![20]));
        thaws
            .run(vec![Action::use_move(user(), 0, None)])
            .expect("move use succeeds");
        assert_eq!(thaws.combatant(user()).status, None);
        assert_eq!(thaws.combatant(foe()).current_hp(), 181);
    }

    #[test]
    fn paralysis_sometimes_prevents_action() {
        let paralyzed = || {
            singles(
                CombatantBuilder::new("Paralyzed")
                    .with_status(StatusCondition::Paralysis)
                    .with_moves(vec![tackle()])
                    .build(),
                CombatantBuilder::new("Foe").build(),
            )
        };

        let mut stuck = Harness::new(paralyzed()).with_rng(ScriptedRng::new_for_test(vec![25]));
        stuck
            .run(vec![Action::use_move(user(), 0, None)])
            .expect("move use succeeds");
        assert_eq!(failures(stuck.events()), vec![FailureReason::Paralyzed]);
        assert_eq!(stuck.combatant(foe()).current_hp(), 200);

        let mut acts = Harness::new(paralyzed());
        acts.run(vec![Action::use_move(user(), 0, None)])
            .expect("move use succeeds");
        assert_eq!(acts.combatant(foe()).current_hp(), 181);
    }

    #[test]
    fn moves_without_pp_fail() {
        let last_tackle = MoveBuilder::physical("Tackle", ElementType::Normal, 40)
            .pp(1)
            .build();
        let mut harness = harness_with(vec![last_tackle]);

        harness
            .run(vec![
                Action::use_move(user(), 0, None),
                Action::use_move(user(), 0, None),
            ])
            .expect("move uses succeed");

        assert_eq!(harness.combatant(user()).moves[0].pp, 0);
        assert_eq!(failures(harness.events()), vec![FailureReason::NoPpRemaining]);
        assert_eq!(harness.combatant(foe()).current_hp(), 181);
    }

    #[test]
    fn misses_still_spend_pp() {
        let wild_swing = MoveBuilder::physical("Wild Swing", ElementType::Normal, 40)
            .accuracy(Some(50))
            .build();
        let mut harness =
            harness_with(vec![wild_swing]).with_rng(ScriptedRng::new_for_test(vec![60]));

        harness
            .run(vec![Action::use_move(user(), 0, None)])
            .expect("move use succeeds");

        assert_eq!(harness.combatant(user()).moves[0].pp, 9);
        assert_eq!(harness.combatant(foe()).current_hp(), 200);
        assert!(harness
            .events()
            .iter()
            .any(|event| matches!(event, BattleEvent::MoveMissed { .. })));
    }

    #[test]
    fn truant_loafs_every_other_move() {
        let mut harness = Harness::new(singles(
            CombatantBuilder::new("Slacker")
                .with_ability(Ability::Truant)
                .with_moves(vec![tackle()])
                .build(),
            CombatantBuilder::new("Foe").build(),
        ));

        harness
            .run(vec![
                Action::use_move(user(), 0, None),
                Action::use_move(user(), 0, None),
                Action::use_move(user(), 0, None),
            ])
            .expect("move uses succeed");

        assert_eq!(failures(harness.events()), vec![FailureReason::Loafing]);
        assert_eq!(harness.combatant(foe()).current_hp(), 200 - 2 * 19);
    }

    #[test]
    fn no_living_target_fails_the_move() {
        let mut harness = harness_with(vec![tackle()]);
        harness
            .field
            .combatant_at_mut(foe())
            .expect("slot exists")
            .expect("slot is occupied")
            .set_hp(0);

        harness
            .run(vec![Action::use_move(user(), 0, None)])
            .expect("move use succeeds");

        assert_eq!(failures(harness.events()), vec![FailureReason::NoTarget]);
    }

    #[test]
    fn bad_references_are_usage_errors() {
        let mut harness = harness_with(vec![tackle()]);

        assert_eq!(
            harness.execute(&Action::use_move(user(), 3, None)),
            Err(BattleError::InvalidMoveIndex {
                slot: user(),
                index: 3,
            })
        );
        assert_eq!(
            harness.execute(&Action::use_move(SlotRef::player(2), 0, None)),
            Err(BattleError::InvalidSlot {
                slot: SlotRef::player(2),
            })
        );
    }

    #[test]
    fn focus_is_lost_when_hit_first() {
        // Arrange: the foe is faster and hits during the focus
        let field = singles(
            CombatantBuilder::new("User")
                .with_speed(50)
                .with_moves(vec![focus_punch()])
                .build(),
            CombatantBuilder::new("Foe")
                .with_speed(150)
                .with_moves(vec![tackle()])
                .build(),
        );
        let mut engine = deterministic_engine(field, ScriptedRng::repeating(50));

        // Act
        let log = engine
            .resolve_turn(vec![
                Action::use_move(user(), 0, None),
                Action::use_move(foe(), 0, None),
            ])
            .expect("turn resolves");

        // Assert
        assert!(log.events().contains(&BattleEvent::Message {
            text: "User is tightening its focus!".to_string(),
        }));
        assert_eq!(failures(log.events()), vec![FailureReason::FocusLost]);
        let field = engine.field();
        let focuser = field.combatant_at(user()).expect("slot exists").expect("occupied");
        assert_eq!(focuser.moves[0].pp, 9);
        assert_eq!(
            field
                .combatant_at(foe())
                .expect("slot exists")
                .expect("occupied")
                .current_hp(),
            200
        );
        let slot = field.slot(user()).expect("slot exists");
        assert!(!slot.has(VolatileFlags::FOCUSING));
        assert!(!slot.has(VolatileFlags::HIT_WHILE_FOCUSING));
    }

    #[test]
    fn undisturbed_focus_lands() {
        let field = singles(
            CombatantBuilder::new("User")
                .with_moves(vec![focus_punch()])
                .build(),
            CombatantBuilder::new("Foe").build(),
        );
        let mut engine = deterministic_engine(field, ScriptedRng::repeating(50));

        engine
            .resolve_turn(vec![Action::use_move(user(), 0, None)])
            .expect("turn resolves");

        let foe_hp = engine
            .field()
            .combatant_at(foe())
            .expect("slot exists")
            .expect("occupied")
            .current_hp();
        assert_eq!(foe_hp, 181);
    }
}

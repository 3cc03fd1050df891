#[cfg(test)]
mod tests {
    use crate::battle::actions::Action;
    use crate::battle::combatant::StatusCondition;
    use crate::battle::rng::{ScriptedRng, SeededRng};
    use crate::battle::state::{SideId, SlotRef};
    use crate::battle::tests::common::{physical_move, singles, CombatantBuilder, MoveBuilder};
    use crate::battle::turn_order::TurnOrderResolver;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{ElementType, Item, SideCondition, StatType};

    fn tackle() -> schema::MoveData {
        physical_move("Tackle", ElementType::Normal, 40)
    }

    #[test]
    fn higher_priority_goes_first_regardless_of_speed() {
        // Arrange
        let quick_attack = MoveBuilder::physical("Quick Attack", ElementType::Normal, 40)
            .priority(1)
            .build();
        let field = singles(
            CombatantBuilder::new("Slowpoke")
                .with_speed(50)
                .with_moves(vec![quick_attack])
                .build(),
            CombatantBuilder::new("Jolteon")
                .with_speed(200)
                .with_moves(vec![tackle()])
                .build(),
        );
        let fast = Action::use_move(SlotRef::opponent(0), 0, None);
        let priority = Action::use_move(SlotRef::player(0), 0, None);
        let mut rng = ScriptedRng::repeating(50);

        // Act
        let order = TurnOrderResolver::new()
            .order(&field, vec![fast.clone(), priority.clone()], &mut rng)
            .expect("ordering succeeds");

        // Assert
        assert_eq!(order, vec![priority, fast]);
    }

    #[test]
    fn faster_combatant_goes_first_within_a_priority_bracket() {
        let field = singles(
            CombatantBuilder::new("Fast")
                .with_speed(150)
                .with_moves(vec![tackle()])
                .build(),
            CombatantBuilder::new("Slow")
                .with_speed(100)
                .with_moves(vec![tackle()])
                .build(),
        );
        let fast = Action::use_move(SlotRef::player(0), 0, None);
        let slow = Action::use_move(SlotRef::opponent(0), 0, None);
        let mut rng = ScriptedRng::repeating(50);

        let order = TurnOrderResolver::new()
            .order(&field, vec![slow.clone(), fast.clone()], &mut rng)
            .expect("ordering succeeds");

        assert_eq!(order, vec![fast, slow]);
    }

    #[test]
    fn switching_outranks_priority_moves() {
        let extreme_speed = MoveBuilder::physical("Extreme Speed", ElementType::Normal, 80)
            .priority(2)
            .build();
        let mut field = singles(
            CombatantBuilder::new("Lead").with_speed(10).build(),
            CombatantBuilder::new("Rusher")
                .with_speed(300)
                .with_moves(vec![extreme_speed])
                .build(),
        );
        field
            .side_mut(SideId::Player)
            .party
            .push(CombatantBuilder::new("Reserve").build());
        let switch = Action::switch(SlotRef::player(0), 1);
        let attack = Action::use_move(SlotRef::opponent(0), 0, None);
        let mut rng = ScriptedRng::repeating(50);

        let order = TurnOrderResolver::new()
            .order(&field, vec![attack.clone(), switch.clone()], &mut rng)
            .expect("ordering succeeds");

        assert_eq!(order, vec![switch, attack]);
    }

    #[test]
    fn speed_ties_follow_the_fresh_draw_on_every_call() {
        // Arrange: identical speed and priority
        let field = singles(
            CombatantBuilder::new("Left").with_moves(vec![tackle()]).build(),
            CombatantBuilder::new("Right").with_moves(vec![tackle()]).build(),
        );
        let left = Action::use_move(SlotRef::player(0), 0, None);
        let right = Action::use_move(SlotRef::opponent(0), 0, None);
        let resolver = TurnOrderResolver::new();
        // Lower draws go first.
        let mut rng = ScriptedRng::new_for_test(vec![90, 10, 10, 90]);

        // Act
        let first = resolver
            .order(&field, vec![left.clone(), right.clone()], &mut rng)
            .expect("ordering succeeds");
        let second = resolver
            .order(&field, vec![left.clone(), right.clone()], &mut rng)
            .expect("ordering succeeds");

        // Assert
        assert_eq!(first, vec![right.clone(), left.clone()]);
        assert_eq!(second, vec![left, right]);
        assert_eq!(rng.consumed(), 4, "each call draws once per action");
    }

    #[test]
    fn speed_ties_are_always_totally_ordered() {
        let field = singles(
            CombatantBuilder::new("Left").with_moves(vec![tackle()]).build(),
            CombatantBuilder::new("Right").with_moves(vec![tackle()]).build(),
        );
        let left = Action::use_move(SlotRef::player(0), 0, None);
        let right = Action::use_move(SlotRef::opponent(0), 0, None);
        let resolver = TurnOrderResolver::new();
        let mut rng = SeededRng::new(42);
        let mut left_first = 0;
        let mut right_first = 0;

        for _ in 0..200 {
            let order = resolver
                .order(&field, vec![left.clone(), right.clone()], &mut rng)
                .expect("ordering succeeds");
            assert_eq!(order.len(), 2);
            assert!(order.contains(&left) && order.contains(&right));
            if order[0] == left {
                left_first += 1;
            } else {
                right_first += 1;
            }
        }

        assert!(left_first > 0, "left should win some ties");
        assert!(right_first > 0, "right should win some ties");
    }

    #[rstest]
    #[case::neutral(0, None, None, false, 100.0)]
    #[case::plus_one(1, None, None, false, 150.0)]
    #[case::minus_two(-2, None, None, false, 50.0)]
    #[case::paralysis(0, Some(StatusCondition::Paralysis), None, false, 50.0)]
    #[case::choice_scarf(0, None, Some(Item::ChoiceScarf), false, 150.0)]
    #[case::tailwind(0, None, None, true, 200.0)]
    fn effective_speed_folds_in_every_modifier(
        #[case] stage: i32,
        #[case] status: Option<StatusCondition>,
        #[case] item: Option<Item>,
        #[case] tailwind: bool,
        #[case] expected: f64,
    ) {
        let mut builder = CombatantBuilder::new("Runner").with_speed(100);
        if let Some(status) = status {
            builder = builder.with_status(status);
        }
        if let Some(item) = item {
            builder = builder.with_item(item);
        }
        let mut field = singles(builder.build(), CombatantBuilder::new("Other").build());
        let slot = SlotRef::player(0);
        field
            .slot_mut(slot)
            .expect("slot exists")
            .stages
            .apply(StatType::Spe, stage)
            .expect("speed has a stage");
        if tailwind {
            field
                .side_mut(slot.side)
                .conditions
                .insert(SideCondition::Tailwind, 4);
        }

        let speed = TurnOrderResolver::new()
            .effective_speed(&field, slot)
            .expect("slot exists");

        assert_eq!(speed, expected);
    }

    #[test]
    fn resolver_reports_zero_speed_for_empty_slots() {
        let mut field = singles(
            CombatantBuilder::new("Here").build(),
            CombatantBuilder::new("There").build(),
        );
        field
            .slot_mut(SlotRef::opponent(0))
            .expect("slot exists")
            .reset_for(None);

        let speed = TurnOrderResolver::new()
            .effective_speed(&field, SlotRef::opponent(0))
            .expect("slot exists");

        assert_eq!(speed, 0.0);
    }
}

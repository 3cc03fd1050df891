use crate::battle::rng::RandomSource;
use crate::battle::state::{Field, SlotRef};
use crate::errors::{BattleError, BattleResult};
use schema::{Ability, Item, MoveCategory, MoveData, StatType};

/// Stat stage multiplier: (2 + s) / 2 for s >= 0, 2 / (2 - s) below.
pub fn stage_multiplier(stage: i8) -> f64 {
    let stage = stage.clamp(-6, 6);
    if stage >= 0 {
        (2.0 + stage as f64) / 2.0
    } else {
        2.0 / (2.0 - stage as f64)
    }
}

/// Apply a stat stage to a stat, flooring the result.
pub fn apply_stat_stage_multiplier(base_stat: u16, stage: i8) -> u16 {
    if stage == 0 {
        return base_stat;
    }
    (base_stat as f64 * stage_multiplier(stage)).floor() as u16
}

/// Accuracy/evasion use thirds instead of halves.
pub fn accuracy_stage_multiplier(stage: i8) -> f64 {
    let stage = stage.clamp(-6, 6);
    if stage >= 0 {
        (3.0 + stage as f64) / 3.0
    } else {
        3.0 / (3.0 - stage as f64)
    }
}

/// Attack or special attack of the combatant in `slot` for a move of `category`,
/// with stages, abilities, items and boss scaling folded in.
///
/// A critical hit ignores the attacker's negative stages.
pub fn effective_attack(
    field: &Field,
    slot: SlotRef,
    category: MoveCategory,
    critical: bool,
) -> BattleResult<u16> {
    let combatant = field
        .combatant_at(slot)?
        .ok_or(BattleError::InvalidSlot { slot })?;
    let (base, stat) = match category {
        MoveCategory::Physical => (combatant.stats.attack, StatType::Atk),
        MoveCategory::Special => (combatant.stats.sp_attack, StatType::SpAtk),
        MoveCategory::Status => return Ok(0),
    };

    let mut stage = field.slot(slot)?.stages.get(stat);
    if critical {
        stage = stage.max(0);
    }
    let mut attack = apply_stat_stage_multiplier(base, stage) as f64;

    if category == MoveCategory::Physical && combatant.has_ability(Ability::HugePower) {
        attack *= 2.0;
    }
    match (combatant.item, category) {
        (Some(Item::ChoiceBand), MoveCategory::Physical)
        | (Some(Item::ChoiceSpecs), MoveCategory::Special) => attack *= 1.5,
        _ => {}
    }
    attack *= field.rules.boss_multiplier(slot.side);

    Ok((attack.floor() as u16).max(1))
}

/// Defense or special defense of the combatant in `slot` against a move of `category`.
///
/// A critical hit ignores the defender's positive stages.
pub fn effective_defense(
    field: &Field,
    slot: SlotRef,
    category: MoveCategory,
    critical: bool,
) -> BattleResult<u16> {
    let combatant = field
        .combatant_at(slot)?
        .ok_or(BattleError::InvalidSlot { slot })?;
    let (base, stat) = match category {
        MoveCategory::Physical => (combatant.stats.defense, StatType::Def),
        MoveCategory::Special => (combatant.stats.sp_defense, StatType::SpDef),
        MoveCategory::Status => return Ok(1),
    };

    let mut stage = field.slot(slot)?.stages.get(stat);
    if critical {
        stage = stage.min(0);
    }
    let mut defense = apply_stat_stage_multiplier(base, stage) as f64;

    if category == MoveCategory::Special && combatant.has_item(Item::AssaultVest) {
        defense *= 1.5;
    }
    defense *= field.rules.boss_multiplier(slot.side);

    Ok((defense.floor() as u16).max(1))
}

/// Roll whether a move used from `user` lands on `target`.
/// Moves without an accuracy value never miss and do not draw.
pub fn move_hits(
    field: &Field,
    user: SlotRef,
    target: SlotRef,
    move_data: &MoveData,
    rng: &mut dyn RandomSource,
) -> BattleResult<bool> {
    let Some(base_accuracy) = move_data.accuracy else {
        return Ok(true);
    };

    let accuracy_stage = field.slot(user)?.stages.get(StatType::Acc);
    let evasion_stage = field.slot(target)?.stages.get(StatType::Eva);
    let adjusted_stage = (accuracy_stage - evasion_stage).clamp(-6, 6);

    let modified_accuracy =
        (base_accuracy as f64 * accuracy_stage_multiplier(adjusted_stage)).round() as u32;
    let threshold = modified_accuracy.clamp(1, 100);
    if threshold >= 100 {
        return Ok(true);
    }

    Ok(rng.int_range(1, 100, "accuracy check") <= threshold)
}

use crate::battle::combatant::Combatant;
use crate::battle::conditions::VolatileFlags;
use crate::config::BattleRules;
use crate::errors::{BattleError, BattleResult};
use schema::{SemiInvulnerableLocation, SideCondition, StatType, Terrain, Weather};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideId {
    Player,
    Opponent,
}

impl SideId {
    pub const ALL: [SideId; 2] = [SideId::Player, SideId::Opponent];

    pub fn index(self) -> usize {
        match self {
            SideId::Player => 0,
            SideId::Opponent => 1,
        }
    }

    pub fn opponent(self) -> SideId {
        match self {
            SideId::Player => SideId::Opponent,
            SideId::Opponent => SideId::Player,
        }
    }
}

impl fmt::Display for SideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideId::Player => write!(f, "player"),
            SideId::Opponent => write!(f, "opponent"),
        }
    }
}

/// Handle to one active position on the field.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRef {
    pub side: SideId,
    pub index: usize,
}

impl SlotRef {
    pub fn new(side: SideId, index: usize) -> Self {
        Self { side, index }
    }

    pub fn player(index: usize) -> Self {
        Self::new(SideId::Player, index)
    }

    pub fn opponent(index: usize) -> Self {
        Self::new(SideId::Opponent, index)
    }

    pub fn is_opponent_of(&self, other: SlotRef) -> bool {
        self.side != other.side
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} slot {}", self.side, self.index)
    }
}

/// Index of a combatant inside its side's party.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CombatantId(pub usize);

/// Stat stage offsets for everything except HP, each clamped to [-6, 6].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatStages {
    stages: [i8; 7],
}

impl StatStages {
    fn position(stat: StatType) -> Option<usize> {
        match stat {
            StatType::Hp => None,
            StatType::Atk => Some(0),
            StatType::Def => Some(1),
            StatType::SpAtk => Some(2),
            StatType::SpDef => Some(3),
            StatType::Spe => Some(4),
            StatType::Acc => Some(5),
            StatType::Eva => Some(6),
        }
    }

    /// Current stage for a stat. HP has no stage and always reads 0.
    pub fn get(&self, stat: StatType) -> i8 {
        Self::position(stat).map_or(0, |position| self.stages[position])
    }

    /// Shift a stage by `delta`, clamping to the legal range.
    /// Returns the change actually applied (0 when already at the limit).
    pub fn apply(&mut self, stat: StatType, delta: i32) -> BattleResult<i8> {
        let position =
            Self::position(stat).ok_or(BattleError::HpStageModification { stat })?;
        let old = self.stages[position];
        let new = (old as i32 + delta).clamp(MIN_STAGE as i32, MAX_STAGE as i32) as i8;
        self.stages[position] = new;
        Ok(new - old)
    }

    pub fn reset(&mut self) {
        self.stages = [0; 7];
    }

    pub fn is_neutral(&self) -> bool {
        self.stages.iter().all(|stage| *stage == 0)
    }
}

/// One active combat position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Slot {
    pub combatant: Option<CombatantId>,
    pub stages: StatStages,
    pub volatiles: VolatileFlags,
    pub charging_move: Option<String>,
    pub semi_invulnerable: Option<SemiInvulnerableLocation>,
    pub protect_streak: u8,
    pub last_move: Option<String>,
    /// Occupant that left this slot during the current turn.
    pub switched_out: Option<CombatantId>,
}

impl Slot {
    pub fn occupied_by(id: CombatantId) -> Self {
        Slot {
            combatant: Some(id),
            ..Slot::default()
        }
    }

    /// Wipe all battle-local state and seat `incoming`.
    pub fn reset_for(&mut self, incoming: Option<CombatantId>) {
        *self = Slot {
            combatant: incoming,
            ..Slot::default()
        };
    }

    pub fn has(&self, flag: VolatileFlags) -> bool {
        self.volatiles.contains(flag)
    }

    pub fn clear_charge_state(&mut self) {
        self.volatiles
            .remove(VolatileFlags::CHARGING | VolatileFlags::SEMI_INVULNERABLE);
        self.charging_move = None;
        self.semi_invulnerable = None;
    }
}

/// One party's view of the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Side {
    pub id: SideId,
    pub party: Vec<Combatant>,
    pub slots: Vec<Slot>,
    /// Active side conditions with their remaining turns.
    pub conditions: HashMap<SideCondition, u8>,
}

impl Side {
    fn assemble(id: SideId, party: Vec<Combatant>, slot_count: usize) -> Self {
        let mut slots = Vec::with_capacity(slot_count);
        let mut candidates = party
            .iter()
            .enumerate()
            .filter(|(_, combatant)| !combatant.is_fainted())
            .map(|(index, _)| CombatantId(index));
        for _ in 0..slot_count {
            slots.push(match candidates.next() {
                Some(id) => Slot::occupied_by(id),
                None => Slot::default(),
            });
        }
        Side {
            id,
            party,
            slots,
            conditions: HashMap::new(),
        }
    }

    pub fn has_condition(&self, condition: SideCondition) -> bool {
        self.conditions.contains_key(&condition)
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.party.get(id.0)
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.party.get_mut(id.0)
    }

    pub fn is_active(&self, id: CombatantId) -> bool {
        self.slots.iter().any(|slot| slot.combatant == Some(id))
    }

    /// Whether any party member can still fight.
    pub fn has_usable_combatants(&self) -> bool {
        self.party.iter().any(|combatant| !combatant.is_fainted())
    }

    /// Party members not on the field that can still be sent in.
    pub fn bench(&self) -> Vec<CombatantId> {
        (0..self.party.len())
            .map(CombatantId)
            .filter(|id| !self.is_active(*id))
            .filter(|id| self.party[id.0].current_hp() > 0)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherState {
    pub weather: Weather,
    /// `None` lasts until something clears it.
    pub turns_remaining: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainState {
    pub terrain: Terrain,
    pub turns_remaining: u8,
}

/// The whole battle context.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub sides: [Side; 2],
    pub weather: Option<WeatherState>,
    pub terrain: Option<TerrainState>,
    pub rules: BattleRules,
    pub turn_number: u32,
}

impl Field {
    /// Assemble both sides, seating the first usable combatants of each party.
    pub fn new(
        rules: BattleRules,
        player_party: Vec<Combatant>,
        opponent_party: Vec<Combatant>,
    ) -> BattleResult<Self> {
        rules.validate()?;
        let slots = rules.slots_per_side;
        Ok(Field {
            sides: [
                Side::assemble(SideId::Player, player_party, slots),
                Side::assemble(SideId::Opponent, opponent_party, slots),
            ],
            weather: None,
            terrain: None,
            rules,
            turn_number: 0,
        })
    }

    pub fn side(&self, id: SideId) -> &Side {
        &self.sides[id.index()]
    }

    pub fn side_mut(&mut self, id: SideId) -> &mut Side {
        &mut self.sides[id.index()]
    }

    pub fn validate_slot(&self, slot: SlotRef) -> BattleResult<()> {
        self.slot(slot).map(|_| ())
    }

    pub fn slot(&self, slot: SlotRef) -> BattleResult<&Slot> {
        self.side(slot.side)
            .slots
            .get(slot.index)
            .ok_or(BattleError::InvalidSlot { slot })
    }

    pub fn slot_mut(&mut self, slot: SlotRef) -> BattleResult<&mut Slot> {
        self.side_mut(slot.side)
            .slots
            .get_mut(slot.index)
            .ok_or(BattleError::InvalidSlot { slot })
    }

    pub fn combatant_id_at(&self, slot: SlotRef) -> BattleResult<Option<CombatantId>> {
        Ok(self.slot(slot)?.combatant)
    }

    /// The combatant seated in `slot`, if any (fainted or not).
    pub fn combatant_at(&self, slot: SlotRef) -> BattleResult<Option<&Combatant>> {
        let id = self.combatant_id_at(slot)?;
        Ok(id.and_then(|id| self.side(slot.side).combatant(id)))
    }

    pub fn combatant_at_mut(&mut self, slot: SlotRef) -> BattleResult<Option<&mut Combatant>> {
        let id = self.combatant_id_at(slot)?;
        Ok(id.and_then(move |id| self.side_mut(slot.side).combatant_mut(id)))
    }

    /// The combatant in `slot` if it is present and still standing.
    pub fn living_combatant(&self, slot: SlotRef) -> BattleResult<Option<&Combatant>> {
        Ok(self
            .combatant_at(slot)?
            .filter(|combatant| !combatant.is_fainted()))
    }

    pub fn is_living(&self, slot: SlotRef) -> bool {
        matches!(self.living_combatant(slot), Ok(Some(_)))
    }

    pub fn slot_refs(&self, side: SideId) -> impl Iterator<Item = SlotRef> + '_ {
        (0..self.side(side).slots.len()).map(move |index| SlotRef::new(side, index))
    }

    /// Every slot on the field holding a combatant that can still act.
    pub fn occupied_slots(&self) -> Vec<SlotRef> {
        SideId::ALL
            .iter()
            .flat_map(|side| self.slot_refs(*side))
            .filter(|slot| self.is_living(*slot))
            .collect()
    }

    pub fn opponents_of(&self, slot: SlotRef) -> Vec<SlotRef> {
        self.slot_refs(slot.side.opponent())
            .filter(|other| self.is_living(*other))
            .collect()
    }

    pub fn allies_of(&self, slot: SlotRef) -> Vec<SlotRef> {
        self.slot_refs(slot.side)
            .filter(|other| *other != slot && self.is_living(*other))
            .collect()
    }

    pub fn weather(&self) -> Option<Weather> {
        self.weather.map(|state| state.weather)
    }

    pub fn terrain(&self) -> Option<Terrain> {
        self.terrain.map(|state| state.terrain)
    }
}

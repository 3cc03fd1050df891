use crate::battle::conditions::VolatileFlags;
use schema::{Ability, BaseStats, ElementType, Item, MoveData, SpeciesData, StatusType};
use std::fmt;
use std::sync::Arc;

pub const MAX_MOVES: usize = 4;

/// Persistent status with its bookkeeping payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusCondition {
    Burn,
    Paralysis,
    Sleep(u8), // turns left before waking
    Poison,
    BadlyPoisoned(u8), // residual counter, grows every end of turn
    Freeze,
}

impl StatusCondition {
    pub fn kind(&self) -> StatusType {
        match self {
            StatusCondition::Burn => StatusType::Burn,
            StatusCondition::Paralysis => StatusType::Paralysis,
            StatusCondition::Sleep(_) => StatusType::Sleep,
            StatusCondition::Poison => StatusType::Poison,
            StatusCondition::BadlyPoisoned(_) => StatusType::BadlyPoisoned,
            StatusCondition::Freeze => StatusType::Freeze,
        }
    }

    /// Builds the condition for a freshly applied status.
    pub fn fresh(status: StatusType, sleep_turns: u8) -> Self {
        match status {
            StatusType::Burn => StatusCondition::Burn,
            StatusType::Paralysis => StatusCondition::Paralysis,
            StatusType::Sleep => StatusCondition::Sleep(sleep_turns),
            StatusType::Poison => StatusCondition::Poison,
            StatusType::BadlyPoisoned => StatusCondition::BadlyPoisoned(1),
            StatusType::Freeze => StatusCondition::Freeze,
        }
    }
}

/// Battle stats derived once at party assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatantStats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub sp_attack: u16,
    pub sp_defense: u16,
    pub speed: u16,
}

impl CombatantStats {
    /// Standard stat formula with perfect IVs and no EVs or natures.
    pub fn from_base(base: &BaseStats, level: u8) -> Self {
        let level = level as u32;
        let other = |base: u8| ((2 * base as u32 + 31) * level / 100 + 5) as u16;
        Self {
            hp: ((2 * base.hp as u32 + 31) * level / 100 + level + 10) as u16,
            attack: other(base.attack),
            defense: other(base.defense),
            sp_attack: other(base.sp_attack),
            sp_defense: other(base.sp_defense),
            speed: other(base.speed),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveInstance {
    pub data: Arc<MoveData>,
    pub pp: u8,
}

impl MoveInstance {
    /// Create a new move instance with max PP
    pub fn new(data: Arc<MoveData>) -> Self {
        let pp = data.max_pp;
        MoveInstance { data, pp }
    }

    pub fn max_pp(&self) -> u8 {
        self.data.max_pp
    }

    /// Use the move (decrease PP)
    pub fn use_pp(&mut self) -> bool {
        if self.pp > 0 {
            self.pp -= 1;
            true
        } else {
            false
        }
    }

    pub fn restore_pp(&mut self, amount: u8) {
        self.pp = self.pp.saturating_add(amount).min(self.max_pp());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub name: String,
    pub species: Arc<SpeciesData>,
    pub level: u8,
    pub stats: CombatantStats,
    current_hp: u16,
    pub status: Option<StatusCondition>,
    pub volatiles: VolatileFlags,
    pub ability: Option<Ability>,
    pub item: Option<Item>,
    pub moves: Vec<MoveInstance>,
}

impl Combatant {
    /// Create a combatant whose stats come from the species' base stats.
    pub fn new(species: Arc<SpeciesData>, level: u8, moves: Vec<Arc<MoveData>>) -> Self {
        let stats = CombatantStats::from_base(&species.base_stats, level);
        Self::with_stats(species, level, stats, moves)
    }

    /// Create a combatant with explicit battle stats.
    pub fn with_stats(
        species: Arc<SpeciesData>,
        level: u8,
        stats: CombatantStats,
        moves: Vec<Arc<MoveData>>,
    ) -> Self {
        let moves = moves
            .into_iter()
            .take(MAX_MOVES)
            .map(MoveInstance::new)
            .collect();
        Combatant {
            name: species.name.clone(),
            ability: species.ability,
            species,
            level,
            current_hp: stats.hp,
            stats,
            status: None,
            volatiles: VolatileFlags::empty(),
            item: None,
            moves,
        }
    }

    pub fn current_hp(&self) -> u16 {
        self.current_hp
    }

    pub fn max_hp(&self) -> u16 {
        self.stats.hp
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Sets HP directly, clamped to `[0, max_hp]`.
    pub fn set_hp(&mut self, hp: u16) {
        self.current_hp = hp.min(self.max_hp());
    }

    /// Apply damage, returning the amount actually removed.
    pub fn take_damage(&mut self, amount: u16) -> u16 {
        let dealt = amount.min(self.current_hp);
        self.current_hp -= dealt;
        dealt
    }

    /// Restore HP, returning the amount actually restored.
    pub fn heal(&mut self, amount: u16) -> u16 {
        let restored = amount.min(self.max_hp() - self.current_hp);
        self.current_hp += restored;
        restored
    }

    pub fn types(&self) -> &[ElementType] {
        &self.species.types
    }

    pub fn has_type(&self, element: ElementType) -> bool {
        self.species.types.contains(&element)
    }

    pub fn status_type(&self) -> Option<StatusType> {
        self.status.map(|status| status.kind())
    }

    pub fn has_ability(&self, ability: Ability) -> bool {
        self.ability == Some(ability)
    }

    pub fn has_item(&self, item: Item) -> bool {
        self.item == Some(item)
    }

    /// Flying types and levitating combatants are not affected by terrain.
    pub fn is_grounded(&self) -> bool {
        !self.has_type(ElementType::Flying) && !self.has_ability(Ability::Levitate)
    }

    pub fn move_at(&self, index: usize) -> Option<&MoveInstance> {
        self.moves.get(index)
    }

    pub fn move_at_mut(&mut self, index: usize) -> Option<&mut MoveInstance> {
        self.moves.get_mut(index)
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Lv{}) {}/{} HP",
            self.name,
            self.level,
            self.current_hp,
            self.max_hp()
        )
    }
}

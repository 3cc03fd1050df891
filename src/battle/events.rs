use crate::battle::conditions::VolatileFlags;
use crate::battle::state::{SideId, SlotRef};
use schema::{
    SemiInvulnerableLocation, SideCondition, StatType, StatusType, Terrain, Weather,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a move or action did nothing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Asleep,
    Frozen,
    Paralyzed,
    Flinched,
    Loafing,
    NoPpRemaining,
    FocusLost,
    NoTarget,
    ProtectFailed,
    CannotSwitch,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum DamageSource {
    Move(String),
    Recoil,
    Contact,
    Status(StatusType),
    Weather(Weather),
    LifeOrb,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBlockReason {
    AlreadyAffected,
    Immune,
    Safeguard,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatBlockReason {
    AtLimit,
    Mist,
}

/// Final result of a battle, from the player side's point of view.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    Ongoing,
    Victory,
    Defeat,
    Draw,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Turn Management
    TurnStarted {
        turn_number: u32,
    },
    TurnEnded {
        turn_number: u32,
    },

    // Moves
    MoveUsed {
        user: SlotRef,
        name: String,
        move_name: String,
    },
    MoveCharging {
        user: SlotRef,
        name: String,
        move_name: String,
        location: Option<SemiInvulnerableLocation>,
    },
    ActionFailed {
        actor: SlotRef,
        name: String,
        reason: FailureReason,
    },
    MoveMissed {
        user: SlotRef,
        target: SlotRef,
        target_name: String,
    },
    MoveBlocked {
        target: SlotRef,
        name: String,
    },
    CriticalHit {
        target: SlotRef,
    },
    TypeEffectiveness {
        target: SlotRef,
        multiplier: f64,
    },

    // HP
    DamageDealt {
        target: SlotRef,
        name: String,
        amount: u16,
        remaining_hp: u16,
        max_hp: u16,
        source: DamageSource,
    },
    Healed {
        target: SlotRef,
        name: String,
        amount: u16,
        new_hp: u16,
        max_hp: u16,
    },
    Fainted {
        target: SlotRef,
        name: String,
    },

    // Status
    StatusApplied {
        target: SlotRef,
        name: String,
        status: StatusType,
    },
    StatusCured {
        target: SlotRef,
        name: String,
        status: StatusType,
    },
    StatusBlocked {
        target: SlotRef,
        name: String,
        status: StatusType,
        reason: StatusBlockReason,
    },
    VolatileApplied {
        target: SlotRef,
        name: String,
        flag: VolatileFlags,
    },

    // Stat Changes
    StatStageChanged {
        target: SlotRef,
        name: String,
        stat: StatType,
        delta: i8,
        new_stage: i8,
    },
    StatChangeBlocked {
        target: SlotRef,
        name: String,
        stat: StatType,
        rising: bool,
        reason: StatBlockReason,
    },

    // Field
    SideConditionStarted {
        side: SideId,
        condition: SideCondition,
    },
    SideConditionEnded {
        side: SideId,
        condition: SideCondition,
    },
    SideConditionFailed {
        side: SideId,
        condition: SideCondition,
    },
    WeatherChanged {
        weather: Option<Weather>,
    },
    WeatherBlocked {
        attempted: Weather,
        active: Weather,
    },
    TerrainChanged {
        terrain: Option<Terrain>,
    },

    // Switching
    Switched {
        slot: SlotRef,
        outgoing: Option<String>,
        incoming: String,
    },

    Message {
        text: String,
    },
    BattleEnded {
        outcome: BattleOutcome,
    },
}

impl BattleEvent {
    /// Human-readable text for the event.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn describe(&self) -> Option<String> {
        match self {
            // === Turn Management Events ===
            BattleEvent::TurnStarted { turn_number } => {
                Some(format!("=== Turn {} ===", turn_number))
            }
            BattleEvent::TurnEnded { .. } => None,

            // === Move Events ===
            BattleEvent::MoveUsed {
                name, move_name, ..
            } => Some(format!("{} used {}!", name, move_name)),
            BattleEvent::MoveCharging {
                name,
                move_name,
                location,
                ..
            } => Some(match location {
                Some(location) => format!("{} went {}!", name, location),
                None => format!("{} is charging {}!", name, move_name),
            }),
            BattleEvent::ActionFailed { name, reason, .. } => {
                Some(Self::format_failure_reason(name, *reason))
            }
            BattleEvent::MoveMissed { target_name, .. } => {
                Some(format!("{} avoided the attack!", target_name))
            }
            BattleEvent::MoveBlocked { name, .. } => Some(format!("{} protected itself!", name)),
            BattleEvent::CriticalHit { .. } => Some("A critical hit!".to_string()),
            BattleEvent::TypeEffectiveness { multiplier, .. } => match *multiplier {
                m if m == 0.0 => Some("It had no effect!".to_string()),
                m if m > 1.0 => Some("It's super effective!".to_string()),
                m if m < 1.0 => Some("It's not very effective...".to_string()),
                _ => None,
            },

            // === Damage and Healing Events ===
            BattleEvent::DamageDealt {
                name,
                amount,
                source,
                ..
            } => Some(match source {
                DamageSource::Move(_) => format!("{} took {} damage!", name, amount),
                DamageSource::Recoil => format!("{} is damaged by recoil! ({})", name, amount),
                DamageSource::Contact => format!("{} was hurt on contact! ({})", name, amount),
                DamageSource::Status(status) => {
                    format!("{} is hurt because it is {}! ({})", name, status, amount)
                }
                DamageSource::Weather(weather) => {
                    format!("{} is buffeted by the {}! ({})", name, weather, amount)
                }
                DamageSource::LifeOrb => format!("{} lost some of its HP! ({})", name, amount),
            }),
            BattleEvent::Healed { name, amount, .. } => {
                Some(format!("{} recovered {} HP!", name, amount))
            }
            BattleEvent::Fainted { name, .. } => Some(format!("{} fainted!", name)),

            // === Status Events ===
            BattleEvent::StatusApplied { name, status, .. } => {
                Some(format!("{} is {}!", name, status))
            }
            BattleEvent::StatusCured { name, status, .. } => match status {
                StatusType::Sleep => Some(format!("{} woke up!", name)),
                StatusType::Freeze => Some(format!("{} thawed out!", name)),
                _ => Some(format!("{} is no longer {}.", name, status)),
            },
            BattleEvent::StatusBlocked { name, reason, .. } => Some(match reason {
                StatusBlockReason::Safeguard => format!("{} is protected by Safeguard!", name),
                _ => format!("It doesn't affect {}...", name),
            }),
            BattleEvent::VolatileApplied { .. } => None,

            // === Stat Change Events ===
            BattleEvent::StatStageChanged {
                name, stat, delta, ..
            } => {
                let size = match delta.abs() {
                    1 => "",
                    2 => " sharply",
                    _ => " drastically",
                };
                let direction = if *delta > 0 { "rose" } else { "fell" };
                Some(format!("{}'s {}{} {}!", name, stat, size, direction))
            }
            BattleEvent::StatChangeBlocked {
                name,
                stat,
                rising,
                reason,
                ..
            } => Some(match reason {
                StatBlockReason::Mist => format!("{} is protected by the mist!", name),
                StatBlockReason::AtLimit if *rising => {
                    format!("{}'s {} won't go any higher!", name, stat)
                }
                StatBlockReason::AtLimit => format!("{}'s {} won't go any lower!", name, stat),
            }),

            // === Field Events ===
            BattleEvent::SideConditionStarted { side, condition } => {
                Some(format!("{} now protects the {} side!", condition, side))
            }
            BattleEvent::SideConditionEnded { side, condition } => {
                Some(format!("The {} side's {} wore off.", side, condition))
            }
            BattleEvent::SideConditionFailed { .. } => Some("But it failed!".to_string()),
            BattleEvent::WeatherChanged { weather } => Some(match weather {
                Some(weather) => format!("The weather became {}!", weather),
                None => "The weather returned to normal.".to_string(),
            }),
            BattleEvent::WeatherBlocked { active, .. } => {
                Some(format!("The {} was not lessened at all!", active))
            }
            BattleEvent::TerrainChanged { terrain } => Some(match terrain {
                Some(terrain) => format!("{} spread across the field!", terrain),
                None => "The terrain returned to normal.".to_string(),
            }),

            // === Switching ===
            BattleEvent::Switched {
                outgoing, incoming, ..
            } => Some(match outgoing {
                Some(outgoing) => format!("{} was withdrawn! Go, {}!", outgoing, incoming),
                None => format!("Go, {}!", incoming),
            }),

            BattleEvent::Message { text } => Some(text.clone()),
            BattleEvent::BattleEnded { outcome } => match outcome {
                BattleOutcome::Victory => Some("You won the battle!".to_string()),
                BattleOutcome::Defeat => Some("You lost the battle...".to_string()),
                BattleOutcome::Draw => Some("The battle ended in a draw!".to_string()),
                BattleOutcome::Ongoing => None,
            },
        }
    }

    fn format_failure_reason(name: &str, reason: FailureReason) -> String {
        match reason {
            FailureReason::Asleep => format!("{} is fast asleep.", name),
            FailureReason::Frozen => format!("{} is frozen solid!", name),
            FailureReason::Paralyzed => format!("{} is fully paralyzed!", name),
            FailureReason::Flinched => format!("{} flinched and couldn't move!", name),
            FailureReason::Loafing => format!("{} is loafing around!", name),
            FailureReason::NoPpRemaining => format!("{} has no PP left for that move!", name),
            FailureReason::FocusLost => format!("{} lost its focus and couldn't move!", name),
            FailureReason::NoTarget => "But there was no target...".to_string(),
            FailureReason::CannotSwitch => format!("{} can't be sent out!", name),
            _ => "But it failed!".to_string(),
        }
    }
}

/// Counters an external statistics collector needs, derived from events only.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BattleStatistics {
    pub damage_per_hit: Vec<u16>,
    pub critical_hits: u32,
    pub misses: u32,
    pub status_applications: u32,
    pub volatile_applications: u32,
    pub faints: u32,
}

impl BattleStatistics {
    pub fn record(&mut self, event: &BattleEvent) {
        match event {
            BattleEvent::DamageDealt {
                amount,
                source: DamageSource::Move(_),
                ..
            } => self.damage_per_hit.push(*amount),
            BattleEvent::CriticalHit { .. } => self.critical_hits += 1,
            BattleEvent::MoveMissed { .. } => self.misses += 1,
            BattleEvent::StatusApplied { .. } => self.status_applications += 1,
            BattleEvent::VolatileApplied { .. } => self.volatile_applications += 1,
            BattleEvent::Fainted { .. } => self.faints += 1,
            _ => {}
        }
    }

    pub fn merge(&mut self, other: &BattleStatistics) {
        self.damage_per_hit.extend_from_slice(&other.damage_per_hit);
        self.critical_hits += other.critical_hits;
        self.misses += other.misses;
        self.status_applications += other.status_applications;
        self.volatile_applications += other.volatile_applications;
        self.faints += other.faints;
    }

    pub fn total_damage(&self) -> u32 {
        self.damage_per_hit.iter().map(|amount| *amount as u32).sum()
    }
}

/// Event bus for collecting battle events in the order they happened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn statistics(&self) -> BattleStatistics {
        let mut statistics = BattleStatistics::default();
        for event in &self.events {
            statistics.record(event);
        }
        statistics
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            match event.describe() {
                Some(text) => writeln!(f, "{}", text)?,
                None => writeln!(f, "{:?}", event)?,
            }
        }
        Ok(())
    }
}

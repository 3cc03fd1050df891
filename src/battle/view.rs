use crate::battle::events::BattleEvent;
use crate::battle::state::SlotRef;
use async_trait::async_trait;
use schema::{StatType, StatusType};
use tokio::sync::Mutex;

/// Presentation collaborator.
///
/// The engine awaits each call before making the next one and never looks at
/// anything beyond completion.
#[async_trait]
pub trait BattleView: Send + Sync {
    async fn show_message(&self, text: &str);
    async fn animate_move(&self, user: SlotRef, move_name: &str);
    async fn animate_damage(&self, target: SlotRef, amount: u16, hp: u16, max_hp: u16);
    async fn animate_faint(&self, target: SlotRef);
    async fn animate_switch(&self, slot: SlotRef, incoming: &str);
    async fn animate_status(&self, target: SlotRef, status: StatusType);
    async fn show_stat_change(&self, target: SlotRef, stat: StatType, delta: i8);
}

/// Headless view for simulation: every call completes immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

#[async_trait]
impl BattleView for NullView {
    async fn show_message(&self, _text: &str) {}
    async fn animate_move(&self, _user: SlotRef, _move_name: &str) {}
    async fn animate_damage(&self, _target: SlotRef, _amount: u16, _hp: u16, _max_hp: u16) {}
    async fn animate_faint(&self, _target: SlotRef) {}
    async fn animate_switch(&self, _slot: SlotRef, _incoming: &str) {}
    async fn animate_status(&self, _target: SlotRef, _status: StatusType) {}
    async fn show_stat_change(&self, _target: SlotRef, _stat: StatType, _delta: i8) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    Message(String),
    Move { user: SlotRef, move_name: String },
    Damage { target: SlotRef, amount: u16, hp: u16, max_hp: u16 },
    Faint(SlotRef),
    Switch { slot: SlotRef, incoming: String },
    Status { target: SlotRef, status: StatusType },
    StatChange { target: SlotRef, stat: StatType, delta: i8 },
}

/// Records every call in order.
#[derive(Debug, Default)]
pub struct RecordingView {
    calls: Mutex<Vec<ViewCall>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn calls(&self) -> Vec<ViewCall> {
        self.calls.lock().await.clone()
    }

    pub async fn messages(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                ViewCall::Message(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, call: ViewCall) {
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl BattleView for RecordingView {
    async fn show_message(&self, text: &str) {
        self.record(ViewCall::Message(text.to_string())).await;
    }

    async fn animate_move(&self, user: SlotRef, move_name: &str) {
        self.record(ViewCall::Move {
            user,
            move_name: move_name.to_string(),
        })
        .await;
    }

    async fn animate_damage(&self, target: SlotRef, amount: u16, hp: u16, max_hp: u16) {
        self.record(ViewCall::Damage {
            target,
            amount,
            hp,
            max_hp,
        })
        .await;
    }

    async fn animate_faint(&self, target: SlotRef) {
        self.record(ViewCall::Faint(target)).await;
    }

    async fn animate_switch(&self, slot: SlotRef, incoming: &str) {
        self.record(ViewCall::Switch {
            slot,
            incoming: incoming.to_string(),
        })
        .await;
    }

    async fn animate_status(&self, target: SlotRef, status: StatusType) {
        self.record(ViewCall::Status { target, status }).await;
    }

    async fn show_stat_change(&self, target: SlotRef, stat: StatType, delta: i8) {
        self.record(ViewCall::StatChange {
            target,
            stat,
            delta,
        })
        .await;
    }
}

/// Play one recorded event against the view: the matching animation first,
/// then its text if it has any.
pub async fn present_event(event: &BattleEvent, view: &dyn BattleView) {
    match event {
        BattleEvent::MoveUsed {
            user, move_name, ..
        } => view.animate_move(*user, move_name).await,
        BattleEvent::DamageDealt {
            target,
            amount,
            remaining_hp,
            max_hp,
            ..
        } => {
            view.animate_damage(*target, *amount, *remaining_hp, *max_hp)
                .await
        }
        BattleEvent::Fainted { target, .. } => view.animate_faint(*target).await,
        BattleEvent::Switched { slot, incoming, .. } => {
            view.animate_switch(*slot, incoming).await
        }
        BattleEvent::StatusApplied { target, status, .. } => {
            view.animate_status(*target, *status).await
        }
        BattleEvent::StatStageChanged {
            target,
            stat,
            delta,
            ..
        } => view.show_stat_change(*target, *stat, *delta).await,
        _ => {}
    }
    if let Some(text) = event.describe() {
        view.show_message(&text).await;
    }
}

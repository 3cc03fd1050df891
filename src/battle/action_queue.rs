use crate::battle::actions::Action;
use crate::battle::context::BattleContext;
use crate::battle::events::{BattleEvent, BattleStatistics, EventBus};
use crate::battle::rng::RandomSource;
use crate::battle::state::Field;
use crate::battle::turn_order::TurnOrderResolver;
use crate::battle::view::{present_event, BattleView};
use crate::errors::BattleResult;
use std::collections::VecDeque;
use std::ops::Range;
use tracing::trace;

#[derive(Debug, Clone)]
struct PendingAction {
    action: Action,
    parent: Option<usize>,
}

/// Actions waiting to run. Follow-ups jump the line: they are spliced in
/// directly after the action that produced them.
#[derive(Debug, Clone, Default)]
pub struct ActionQueue {
    pending: VecDeque<PendingAction>,
}

/// One executed action with the events its logic phase recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedAction {
    pub action: Action,
    /// Index of the action that produced this one as a follow-up.
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Range into the turn's event list.
    pub events: Range<usize>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the given order. Used for system actions that are already ordered.
    pub fn in_order(actions: Vec<Action>) -> Self {
        let mut queue = Self::new();
        for action in actions {
            queue.push_back(action);
        }
        queue
    }

    /// Sort chosen actions with the resolver. Anything that does not take part
    /// in ordering runs afterwards in the order it was given.
    pub fn ordered(
        actions: Vec<Action>,
        field: &Field,
        resolver: &TurnOrderResolver,
        rng: &mut dyn RandomSource,
    ) -> BattleResult<Self> {
        let (chosen, system): (Vec<Action>, Vec<Action>) =
            actions.into_iter().partition(Action::requires_ordering);
        let mut queue = Self::in_order(resolver.order(field, chosen, rng)?);
        for action in system {
            queue.push_back(action);
        }
        Ok(queue)
    }

    pub fn push_back(&mut self, action: Action) {
        self.pending.push_back(PendingAction {
            action,
            parent: None,
        });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run logic phases until the queue is empty, appending to `log`.
    pub fn run(&mut self, ctx: &mut BattleContext, log: &mut Vec<LoggedAction>) -> BattleResult<()> {
        while let Some(PendingAction { action, parent }) = self.pending.pop_front() {
            let start = ctx.bus.len();
            let follow_ups = action.execute(ctx)?;
            let end = ctx.bus.len();

            let index = log.len();
            if let Some(parent) = parent {
                log[parent].children.push(index);
            }
            trace!(
                index,
                action = action.label(),
                follow_ups = follow_ups.len(),
                "action resolved"
            );
            log.push(LoggedAction {
                action,
                parent,
                children: Vec::new(),
                events: start..end,
            });

            for follow_up in follow_ups.into_iter().rev() {
                self.pending.push_front(PendingAction {
                    action: follow_up,
                    parent: Some(index),
                });
            }
        }
        Ok(())
    }
}

/// Everything one turn (or one batch of system actions) produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnLog {
    pub turn_number: u32,
    bus: EventBus,
    entries: Vec<LoggedAction>,
}

impl TurnLog {
    pub fn new(turn_number: u32, bus: EventBus, entries: Vec<LoggedAction>) -> Self {
        Self {
            turn_number,
            bus,
            entries,
        }
    }

    pub fn events(&self) -> &[BattleEvent] {
        self.bus.events()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn entries(&self) -> &[LoggedAction] {
        &self.entries
    }

    pub fn events_for(&self, index: usize) -> &[BattleEvent] {
        match self.entries.get(index) {
            Some(entry) => &self.bus.events()[entry.events.clone()],
            None => &[],
        }
    }

    /// Follow-ups produced directly by the action at `index`.
    pub fn follow_ups(&self, index: usize) -> Vec<&LoggedAction> {
        self.entries
            .get(index)
            .map(|entry| entry.children.iter().map(|child| &self.entries[*child]).collect())
            .unwrap_or_default()
    }

    pub fn statistics(&self) -> BattleStatistics {
        self.bus.statistics()
    }

    /// Indices in presentation order: an action is presented after every
    /// reaction it triggered has been presented.
    pub fn presentation_order(&self) -> Vec<usize> {
        fn visit(entries: &[LoggedAction], index: usize, order: &mut Vec<usize>) {
            for child in &entries[index].children {
                visit(entries, *child, order);
            }
            order.push(index);
        }

        let mut order = Vec::with_capacity(self.entries.len());
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.parent.is_none() {
                visit(&self.entries, index, &mut order);
            }
        }
        order
    }

    /// Presentation phase for the whole log. Events recorded outside any
    /// action (turn start, end of battle) open and close the sequence.
    pub async fn present(&self, view: &dyn BattleView) {
        let events = self.bus.events();
        let first = self
            .entries
            .first()
            .map_or(events.len(), |entry| entry.events.start);
        let last = self
            .entries
            .iter()
            .map(|entry| entry.events.end)
            .max()
            .unwrap_or(first)
            .max(first);

        for event in &events[..first] {
            present_event(event, view).await;
        }
        for index in self.presentation_order() {
            let entry = &self.entries[index];
            entry.action.present(&events[entry.events.clone()], view).await;
        }
        for event in &events[last..] {
            present_event(event, view).await;
        }
    }
}

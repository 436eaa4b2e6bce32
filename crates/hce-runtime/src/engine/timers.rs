use std::collections::{BTreeMap, BTreeSet};

use hce_core::{Bindings, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum TurnStep {
    BeginReveal,
    RevealMessage { index: usize },
    Complete,
    Navigate { link: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum TimerAction {
    Turn {
        turn_id: u64,
        node_id: NodeId,
        step: TurnStep,
    },
    Persist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) struct TimerHandle {
    due_ms: u64,
    seq: u64,
}

/// Virtual-time timer queue. Timers due at the same instant fire in scheduling order.
#[derive(Debug, Default)]
pub(super) struct Scheduler {
    now_ms: u64,
    next_seq: u64,
    queue: BTreeMap<TimerHandle, TimerAction>,
}

impl Scheduler {
    pub(super) fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub(super) fn pending(&self) -> usize {
        self.queue.len()
    }

    pub(super) fn schedule(&mut self, delay_ms: u64, action: TimerAction) -> TimerHandle {
        let handle = TimerHandle {
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.queue.insert(handle, action);
        handle
    }

    pub(super) fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.queue.remove(&handle).is_some()
    }

    pub(super) fn next_due_ms(&self) -> Option<u64> {
        self.queue.keys().next().map(|handle| handle.due_ms)
    }

    /// Pops the earliest timer due at or before `limit_ms` and moves the clock to it.
    pub(super) fn pop_due(&mut self, limit_ms: u64) -> Option<(TimerHandle, TimerAction)> {
        let handle = *self.queue.keys().next()?;
        if handle.due_ms > limit_ms {
            return None;
        }
        let action = self.queue.remove(&handle)?;
        self.now_ms = self.now_ms.max(handle.due_ms);
        Some((handle, action))
    }

    pub(super) fn advance_to(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

/// Everything one engine turn owns: its bindings, the nodes it has entered and its timers.
#[derive(Debug)]
pub(super) struct TurnScope {
    id: u64,
    bindings: Bindings,
    visited: BTreeSet<NodeId>,
    timers: Vec<TimerHandle>,
}

impl TurnScope {
    pub(super) fn open(id: u64, bindings: Bindings) -> Self {
        Self {
            id,
            bindings,
            visited: BTreeSet::new(),
            timers: Vec::new(),
        }
    }

    pub(super) fn id(&self) -> u64 {
        self.id
    }

    pub(super) fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Returns false when the node was already entered during this turn.
    pub(super) fn visit(&mut self, node_id: &str) -> bool {
        self.visited.insert(node_id.to_string())
    }

    pub(super) fn track(&mut self, handle: TimerHandle) {
        self.timers.push(handle);
    }

    pub(super) fn release(&mut self, handle: TimerHandle) {
        self.timers.retain(|tracked| *tracked != handle);
    }

    pub(super) fn close(self, scheduler: &mut Scheduler) -> usize {
        self.timers
            .into_iter()
            .filter(|handle| scheduler.cancel(*handle))
            .count()
    }
}

#[cfg(test)]
mod timers_tests {
    use super::*;

    #[test]
    fn pop_due_respects_due_time_then_schedule_order() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(600, TimerAction::Persist);
        scheduler.schedule(300, TimerAction::Persist);
        let second_at_300 = scheduler.schedule(
            300,
            TimerAction::Turn {
                turn_id: 1,
                node_id: "start".to_string(),
                step: TurnStep::Complete,
            },
        );

        assert_eq!(scheduler.next_due_ms(), Some(300));
        assert!(scheduler.pop_due(299).is_none());

        let (_, first) = scheduler.pop_due(300).expect("first timer");
        assert_eq!(first, TimerAction::Persist);
        let (handle, _) = scheduler.pop_due(300).expect("second timer");
        assert_eq!(handle, second_at_300);
        assert_eq!(scheduler.now_ms(), 300);
        assert!(scheduler.pop_due(300).is_none());
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn closing_a_turn_cancels_only_its_own_timers() {
        let mut scheduler = Scheduler::default();
        let mut turn = TurnScope::open(7, Bindings::new());
        for delay in [300, 900] {
            let handle = scheduler.schedule(
                delay,
                TimerAction::Turn {
                    turn_id: 7,
                    node_id: "start".to_string(),
                    step: TurnStep::BeginReveal,
                },
            );
            turn.track(handle);
        }
        scheduler.schedule(500, TimerAction::Persist);

        let (fired, _) = scheduler.pop_due(300).expect("first turn timer");
        turn.release(fired);

        assert_eq!(turn.close(&mut scheduler), 1);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.next_due_ms(), Some(500));
    }

    #[test]
    fn visit_reports_revisits() {
        let mut turn = TurnScope::open(1, Bindings::new());
        assert!(turn.visit("a"));
        assert!(turn.visit("b"));
        assert!(!turn.visit("a"));
    }

    #[test]
    fn advance_to_never_moves_backwards() {
        let mut scheduler = Scheduler::default();
        scheduler.advance_to(1_000);
        scheduler.advance_to(10);
        assert_eq!(scheduler.now_ms(), 1_000);
        let handle = scheduler.schedule(5, TimerAction::Persist);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
    }
}

use std::rc::Rc;

use hce_core::{
    AssistantConfig, Bindings, ChatOption, DialogueTree, Message, MessageDraft, Node, NodeId,
    SessionState,
};
use log::{debug, error};

use super::timers::{Scheduler, TimerAction, TimerHandle, TurnScope};
use crate::{load_snapshot, save_snapshot, LocalWallClock, MemorySessionStore, SessionStore, WallClock};

/// Context keys mirrored from the name and project bindings.
pub const CONTEXT_USER_KEY: &str = "userName";
pub const CONTEXT_PROJECT_KEY: &str = "projectType";

const MAX_TIMERS_PER_DRAIN: usize = 10_000;

/// Side effects the presentation shell must carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantEffect {
    Navigate { link: String },
}

#[derive(Clone, Default)]
pub struct ChatAssistantOptions {
    pub tree: Option<DialogueTree>,
    pub config: AssistantConfig,
    pub store: Option<Rc<dyn SessionStore>>,
    pub wall_clock: Option<Rc<dyn WallClock>>,
}

pub struct ChatAssistant {
    pub(super) config: AssistantConfig,
    pub(super) tree: Option<DialogueTree>,
    pub(super) store: Rc<dyn SessionStore>,
    pub(super) wall_clock: Rc<dyn WallClock>,

    pub(super) state: SessionState,
    pub(super) scheduler: Scheduler,
    pub(super) turn: Option<TurnScope>,
    pub(super) turn_counter: u64,
    pub(super) pending_persist: Option<TimerHandle>,
    pub(super) typing: bool,
    pub(super) open: bool,
    pub(super) effects: Vec<AssistantEffect>,
}

impl ChatAssistant {
    /// Builds the assistant and restores any persisted session.
    pub fn new(options: ChatAssistantOptions) -> Self {
        let store: Rc<dyn SessionStore> = options
            .store
            .unwrap_or_else(|| Rc::new(MemorySessionStore::new()));
        let wall_clock: Rc<dyn WallClock> = options
            .wall_clock
            .unwrap_or_else(|| Rc::new(LocalWallClock));
        let state = match load_snapshot(store.as_ref()) {
            Some(snapshot) => snapshot.into_state(),
            None => SessionState::fresh(&options.config.start_node),
        };

        Self {
            config: options.config,
            tree: options.tree,
            store,
            wall_clock,
            state,
            scheduler: Scheduler::default(),
            turn: None,
            turn_counter: 0,
            pending_persist: None,
            typing: false,
            open: false,
            effects: Vec::new(),
        }
    }

    /// Installs the dialogue tree once it has been fetched.
    pub fn install_tree(&mut self, tree: DialogueTree) {
        debug!("dialogue tree installed with {} nodes", tree.len());
        self.tree = Some(tree);
    }

    pub fn has_tree(&self) -> bool {
        self.tree.is_some()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    pub fn node_id(&self) -> &NodeId {
        &self.state.node_id
    }

    pub fn bindings(&self) -> &Bindings {
        &self.state.bindings
    }

    pub fn history(&self) -> &[NodeId] {
        &self.state.history
    }

    pub fn context(&self) -> &Bindings {
        &self.state.context
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn current_node(&self) -> Option<&Node> {
        self.tree.as_ref()?.get(&self.state.node_id)
    }

    /// The free-text field is shown once typing stops on an input node.
    pub fn input_visible(&self) -> bool {
        !self.typing && self.current_node().is_some_and(Node::awaits_input)
    }

    pub fn file_upload_visible(&self) -> bool {
        self.input_visible() && self.current_node().is_some_and(|node| node.requests_file_upload)
    }

    pub fn can_go_back(&self) -> bool {
        !self.state.history.is_empty()
    }

    pub fn active_options(&self) -> Option<&[ChatOption]> {
        self.state.active_options()
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Milliseconds until the next scheduled step, if any.
    pub fn next_due_in(&self) -> Option<u64> {
        self.scheduler
            .next_due_ms()
            .map(|due| due.saturating_sub(self.scheduler.now_ms()))
    }

    pub fn drain_effects(&mut self) -> Vec<AssistantEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Moves virtual time forward, firing every step that falls due.
    pub fn advance_clock(&mut self, elapsed_ms: u64) -> usize {
        let target = self.scheduler.now_ms().saturating_add(elapsed_ms);
        let mut fired = 0usize;
        while let Some((handle, action)) = self.scheduler.pop_due(target) {
            self.dispatch(handle, action);
            fired += 1;
        }
        self.scheduler.advance_to(target);
        fired
    }

    /// Fires scheduled steps until nothing is pending.
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0usize;
        while let Some((handle, action)) = self.scheduler.pop_due(u64::MAX) {
            self.dispatch(handle, action);
            fired += 1;
            if fired >= MAX_TIMERS_PER_DRAIN {
                error!(
                    "stopped draining after {} timers; {} still pending",
                    fired,
                    self.scheduler.pending()
                );
                break;
            }
        }
        fired
    }

    /// Writes any debounced snapshot immediately.
    pub fn flush(&mut self) {
        if let Some(handle) = self.pending_persist.take() {
            self.scheduler.cancel(handle);
            self.persist_now();
        }
    }

    fn dispatch(&mut self, handle: TimerHandle, action: TimerAction) {
        match action {
            TimerAction::Persist => {
                if self.pending_persist == Some(handle) {
                    self.pending_persist = None;
                    self.persist_now();
                }
            }
            TimerAction::Turn {
                turn_id,
                node_id,
                step,
            } => {
                let Some(turn) = self.turn.as_mut() else {
                    return;
                };
                if turn.id() != turn_id {
                    return;
                }
                turn.release(handle);
                self.run_step(&node_id, step);
            }
        }
    }

    pub(super) fn push_message(&mut self, draft: MessageDraft) -> u64 {
        let ts = self.wall_clock.label();
        let id = self.state.push_message(draft, ts);
        self.touch();
        id
    }

    /// Schedules a debounced persist once the log is non-empty.
    pub(super) fn touch(&mut self) {
        if self.state.messages.is_empty() {
            return;
        }
        if let Some(handle) = self.pending_persist.take() {
            self.scheduler.cancel(handle);
        }
        self.pending_persist = Some(
            self.scheduler
                .schedule(self.config.persist_debounce_ms, TimerAction::Persist),
        );
    }

    pub(super) fn cancel_persist(&mut self) {
        if let Some(handle) = self.pending_persist.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn persist_now(&self) {
        save_snapshot(
            self.store.as_ref(),
            &self.state,
            self.config.max_persisted_messages,
        );
    }
}

use hce_core::{Bindings, LinkAffordance, MessageDraft, Node, NodeKind};
use log::{debug, error};

use super::lifecycle::{AssistantEffect, ChatAssistant};
use super::timers::{TimerAction, TurnScope, TurnStep};
use crate::{build_deep_link, interpolate};

impl ChatAssistant {
    /// Starts a new turn at `node_id`, cancelling whatever the previous turn still had pending.
    ///
    /// Returns false when no turn was started: the tree is not loaded or the node does not exist.
    /// In both cases the running turn is left alone.
    pub fn advance(&mut self, node_id: &str, bindings: Bindings) -> bool {
        let Some(tree) = self.tree.as_ref() else {
            debug!("dialogue tree not loaded; ignoring advance to {}", node_id);
            return false;
        };
        if !tree.contains(node_id) {
            error!("Node {} not found", node_id);
            return false;
        }

        self.close_turn();
        self.turn_counter += 1;
        self.turn = Some(TurnScope::open(self.turn_counter, bindings));
        debug!("turn {} started at {}", self.turn_counter, node_id);
        self.enter_node(node_id);
        true
    }

    pub(super) fn close_turn(&mut self) {
        if let Some(turn) = self.turn.take() {
            let turn_id = turn.id();
            let cancelled = turn.close(&mut self.scheduler);
            debug!("turn {} closed, {} timers cancelled", turn_id, cancelled);
        }
        self.typing = false;
    }

    fn enter_node(&mut self, node_id: &str) {
        let Some(turn) = self.turn.as_mut() else {
            return;
        };
        if !turn.visit(node_id) {
            error!(
                "dialogue cycle: node {} was reached twice in turn {}; halting",
                node_id,
                turn.id()
            );
            return;
        }

        self.state.node_entry_mark = self.state.next_message_id;
        self.typing = true;
        self.schedule_step(node_id, TurnStep::BeginReveal, self.config.typing_delay_ms);
    }

    fn schedule_step(&mut self, node_id: &str, step: TurnStep, delay_ms: u64) {
        let Some(turn) = self.turn.as_mut() else {
            return;
        };
        let handle = self.scheduler.schedule(
            delay_ms,
            TimerAction::Turn {
                turn_id: turn.id(),
                node_id: node_id.to_string(),
                step,
            },
        );
        turn.track(handle);
    }

    pub(super) fn run_step(&mut self, node_id: &str, step: TurnStep) {
        let Some(node) = self.tree.as_ref().and_then(|tree| tree.get(node_id)).cloned() else {
            error!("Node {} not found", node_id);
            return;
        };

        match step {
            TurnStep::BeginReveal => self.reveal_from(node_id, &node, 0),
            TurnStep::RevealMessage { index } => {
                if let Some(template) = node.bot_messages.get(index) {
                    let text = interpolate(template, &self.turn_bindings());
                    self.push_message(MessageDraft::bot_text(text));
                }
                self.reveal_from(node_id, &node, index + 1);
            }
            TurnStep::Complete => self.complete_node(node_id, &node),
            TurnStep::Navigate { link } => {
                debug!("navigating to {}", link);
                self.effects.push(AssistantEffect::Navigate { link });
            }
        }
    }

    fn reveal_from(&mut self, node_id: &str, node: &Node, index: usize) {
        if index < node.bot_messages.len() {
            self.schedule_step(
                node_id,
                TurnStep::RevealMessage { index },
                self.config.message_delay_ms,
            );
        } else {
            self.schedule_step(node_id, TurnStep::Complete, self.config.typing_delay_ms);
        }
    }

    fn complete_node(&mut self, node_id: &str, node: &Node) {
        self.typing = false;

        if node.kind == NodeKind::QuestionWithInput {
            return;
        }

        if node.kind == NodeKind::InternalRedirect {
            if let (Some(link), Some(next)) = (&node.link, &node.next_node) {
                self.schedule_step(
                    node_id,
                    TurnStep::Navigate { link: link.clone() },
                    self.config.redirect_delay_ms,
                );
                self.continue_with(next);
                return;
            }
        }

        if node.kind == NodeKind::MessageWithLink {
            if let Some(next) = &node.next_node {
                let url = build_deep_link(&self.config.deep_link, &self.turn_bindings());
                self.push_message(MessageDraft::bot_link(LinkAffordance {
                    text: node.link_text.clone().unwrap_or_default(),
                    url,
                    external: node.external,
                    icon: node.icon.clone(),
                }));
                self.continue_with(next);
                return;
            }
        }

        if !node.options.is_empty() {
            self.push_message(MessageDraft::bot_options(node.options.clone()));
            return;
        }

        if let Some(next) = &node.next_node {
            self.continue_with(next);
        }
    }

    /// Moves the session to `next` and keeps going on the current turn.
    fn continue_with(&mut self, next: &str) {
        self.state.node_id = next.to_string();
        self.touch();

        if !self.tree.as_ref().is_some_and(|tree| tree.contains(next)) {
            error!("Node {} not found", next);
            return;
        }
        self.enter_node(next);
    }

    fn turn_bindings(&self) -> Bindings {
        self.turn
            .as_ref()
            .map(|turn| turn.bindings().clone())
            .unwrap_or_else(|| self.state.bindings.clone())
    }
}

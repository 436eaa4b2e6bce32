use hce_core::{AssistantError, BackRemoval, Bindings, ChatOption, MessageDraft, SessionState};

use super::lifecycle::{ChatAssistant, CONTEXT_PROJECT_KEY, CONTEXT_USER_KEY};
use crate::{clear_snapshot, validate_file, FileCandidate};

impl ChatAssistant {
    pub fn select_option(&mut self, option: &ChatOption) {
        self.state.strip_options();
        self.state.push_history();
        self.push_message(MessageDraft::user_text(option.text.clone()));
        self.state.node_id = option.next_node.clone();
        self.touch();

        let bindings = self.state.bindings.clone();
        self.advance(&option.next_node, bindings);
    }

    /// Selects from the options currently on screen by position.
    pub fn select_option_at(&mut self, index: usize) -> Result<(), AssistantError> {
        let options = self.state.active_options().ok_or_else(|| {
            AssistantError::new("NO_PENDING_CHOICE", "No options are currently offered.")
        })?;
        let option = options.get(index).cloned().ok_or_else(|| {
            AssistantError::new(
                "CHOICE_INDEX",
                format!("Option index \"{}\" is out of range.", index),
            )
        })?;
        self.select_option(&option);
        Ok(())
    }

    /// Stores a free-text answer. Returns false when the current node takes no text.
    pub fn submit_text(&mut self, raw: &str) -> bool {
        let text = raw.trim();
        if text.is_empty() {
            return false;
        }
        let Some(node) = self.current_node() else {
            return false;
        };
        let (Some(next), Some(key)) = (node.next_node.clone(), node.next_state_key.clone()) else {
            return false;
        };

        self.push_message(MessageDraft::user_text(text));
        self.state.bindings.insert(key.clone(), text.to_string());
        if key == self.config.name_key {
            self.state
                .context
                .insert(CONTEXT_USER_KEY.to_string(), text.to_string());
        }
        if key == self.config.project_key {
            self.state
                .context
                .insert(CONTEXT_PROJECT_KEY.to_string(), text.to_string());
        }
        self.transition(next);
        true
    }

    /// Records an attachment by name; its contents are never read.
    pub fn submit_file(&mut self, file: &FileCandidate) -> Result<bool, AssistantError> {
        if self.tree.is_none() {
            return Ok(false);
        }
        validate_file(&self.config, file)?;

        let Some(next) = self.current_node().and_then(|node| node.next_node.clone()) else {
            return Ok(false);
        };

        self.push_message(MessageDraft::user_text(format!("📎 {}", file.name)));
        self.state
            .bindings
            .insert(self.config.file_key.clone(), file.name.clone());
        self.transition(next);
        Ok(true)
    }

    /// Returns to the previous node. Bindings collected since then are kept.
    pub fn back(&mut self) -> bool {
        let Some(previous) = self.state.history.pop() else {
            return false;
        };
        let mark = self.state.history_marks.pop();
        self.state.node_id = previous.clone();

        match (self.config.back_removal, mark) {
            (BackRemoval::ToNodeEntry, Some(mark)) => {
                self.state.messages.retain(|message| message.id < mark);
            }
            _ => {
                let keep = self.state.messages.len().saturating_sub(2);
                self.state.messages.truncate(keep);
            }
        }
        self.touch();

        let bindings = self.state.bindings.clone();
        self.advance(&previous, bindings);
        true
    }

    pub fn reset(&mut self) {
        self.close_turn();
        self.cancel_persist();
        clear_snapshot(self.store.as_ref());
        self.state = SessionState::fresh(&self.config.start_node);

        let start = self.config.start_node.clone();
        self.advance(&start, Bindings::new());
    }

    fn transition(&mut self, next: String) {
        self.state.push_history();
        self.state.node_id = next.clone();
        self.touch();

        let bindings = self.state.bindings.clone();
        self.advance(&next, bindings);
    }
}

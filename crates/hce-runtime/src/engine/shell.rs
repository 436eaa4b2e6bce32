use hce_core::Bindings;

use super::lifecycle::ChatAssistant;
use crate::load_snapshot;

impl ChatAssistant {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns whether the panel is open afterwards.
    pub fn toggle(&mut self) -> bool {
        if self.open {
            self.close();
        } else {
            self.open();
        }
        self.open
    }

    /// Opening restores the persisted session and starts the conversation when the log is empty.
    pub fn open(&mut self) {
        if self.open {
            return;
        }
        self.flush();

        let start = self.config.start_node.clone();
        if let Some(snapshot) = load_snapshot(self.store.as_ref()) {
            self.state = snapshot.into_state();
            if self.state.messages.is_empty() {
                let bindings = self.state.bindings.clone();
                self.advance(&start, bindings);
            }
        } else if self.state.messages.is_empty() {
            self.advance(&start, Bindings::new());
        }
        self.open = true;
    }

    /// Closing keeps the session as it is.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Escape closes the panel. Returns false when it was already closed.
    pub fn handle_escape(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.close();
        true
    }

    /// Cancels the live turn and writes any pending snapshot.
    pub fn shutdown(&mut self) {
        self.close_turn();
        self.flush();
    }
}

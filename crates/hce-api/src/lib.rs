use std::fs;
use std::path::Path;
use std::rc::Rc;

use hce_core::{AssistantConfig, AssistantError, DialogueTree};
use hce_runtime::{ChatAssistant, ChatAssistantOptions, SessionStore, WallClock};
use log::error;

mod validate;

pub use validate::{validate_tree, TreeIssue, TreeIssueKind};

#[derive(Clone, Default)]
pub struct CreateAssistantOptions {
    pub tree: Option<DialogueTree>,
    pub config: Option<AssistantConfig>,
    pub store: Option<Rc<dyn SessionStore>>,
    pub wall_clock: Option<Rc<dyn WallClock>>,
}

pub fn parse_tree(json: &str) -> Result<DialogueTree, AssistantError> {
    serde_json::from_str(json).map_err(|source| {
        AssistantError::new(
            "TREE_INVALID",
            format!("Dialogue tree is not valid: {}", source),
        )
    })
}

/// Reads and parses a dialogue tree file. Failures are logged as well as returned.
pub fn load_tree_from_path(path: &Path) -> Result<DialogueTree, AssistantError> {
    let raw = fs::read_to_string(path).map_err(|source| {
        let error = AssistantError::new(
            "TREE_READ",
            format!("Failed to read dialogue tree {}: {}", path.display(), source),
        );
        error!("{}", error);
        error
    })?;
    parse_tree(&raw).inspect_err(|error| error!("{}", error))
}

pub fn parse_config(json: &str) -> Result<AssistantConfig, AssistantError> {
    serde_json::from_str(json).map_err(|source| {
        AssistantError::new(
            "CONFIG_INVALID",
            format!("Assistant config is not valid: {}", source),
        )
    })
}

/// Missing path means defaults.
pub fn load_config(path: Option<&Path>) -> Result<AssistantConfig, AssistantError> {
    let Some(path) = path else {
        return Ok(AssistantConfig::default());
    };
    let raw = fs::read_to_string(path).map_err(|source| {
        AssistantError::new(
            "CONFIG_READ",
            format!("Failed to read config {}: {}", path.display(), source),
        )
    })?;
    parse_config(&raw)
}

pub fn create_assistant(options: CreateAssistantOptions) -> ChatAssistant {
    ChatAssistant::new(ChatAssistantOptions {
        tree: options.tree,
        config: options.config.unwrap_or_default(),
        store: options.store,
        wall_clock: options.wall_clock,
    })
}

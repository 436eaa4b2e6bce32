use serde::{Deserialize, Serialize};

pub const DEFAULT_START_NODE: &str = "start";
pub const DEFAULT_STORAGE_KEY: &str = "hceChatState";
pub const DEFAULT_TREE_PATH: &str = "chatbot-data.json";
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// How much of the log a back navigation removes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackRemoval {
    /// Drop the last two messages: the prompt and the answer that followed it.
    #[default]
    LastPair,
    /// Drop every message produced since the restored node was entered.
    ToNodeEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeepLinkConfig {
    pub base_url: String,
    pub phone_number: String,
    pub template: String,
}

impl Default for DeepLinkConfig {
    fn default() -> Self {
        Self {
            base_url: "https://wa.me".to_string(),
            phone_number: "5561993619554".to_string(),
            template: "Olá! Meu nome é {userName} e gostaria de falar sobre: {projectInfo}"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssistantConfig {
    pub start_node: String,
    pub tree_path: String,
    pub storage_key: String,
    pub max_persisted_messages: usize,
    pub message_delay_ms: u64,
    pub typing_delay_ms: u64,
    pub redirect_delay_ms: u64,
    pub persist_debounce_ms: u64,
    pub max_file_bytes: u64,
    pub allowed_mime_types: Vec<String>,
    pub name_key: String,
    pub project_key: String,
    pub file_key: String,
    pub back_removal: BackRemoval,
    pub deep_link: DeepLinkConfig,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            start_node: DEFAULT_START_NODE.to_string(),
            tree_path: DEFAULT_TREE_PATH.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            max_persisted_messages: 100,
            message_delay_ms: 600,
            typing_delay_ms: 300,
            redirect_delay_ms: 800,
            persist_debounce_ms: 500,
            max_file_bytes: MAX_FILE_BYTES,
            allowed_mime_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
                "application/pdf".to_string(),
            ],
            name_key: "userName".to_string(),
            project_key: "projectInfo".to_string(),
            file_key: "file".to_string(),
            back_removal: BackRemoval::LastPair,
            deep_link: DeepLinkConfig::default(),
        }
    }
}

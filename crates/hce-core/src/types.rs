use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type NodeId = String;
pub type Bindings = BTreeMap<String, String>;

pub const SESSION_SNAPSHOT_SCHEMA: &str = "hce-session.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    QuestionWithOptions,
    QuestionWithInput,
    Message,
    MessageWithLink,
    InternalRedirect,
    ExternalRedirect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOption {
    pub text: String,
    pub next_node: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// One vertex of the dialogue graph as authored in the tree JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub bot_messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChatOption>,
    #[serde(default)]
    pub requests_file_upload: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_state_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_node: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_text: Option<String>,
    #[serde(default)]
    pub external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Node {
    /// Whether a free-text answer can be stored for this node.
    pub fn accepts_text(&self) -> bool {
        self.next_node.is_some() && self.next_state_key.is_some()
    }

    pub fn awaits_input(&self) -> bool {
        self.kind == NodeKind::QuestionWithInput
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogueTree {
    nodes: BTreeMap<NodeId, Node>,
}

impl DialogueTree {
    pub fn get(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Node)> {
        self.nodes.iter()
    }
}

/// Presentation icons a node or option may reference by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Quote,
    WhatsApp,
    Services,
    Portfolio,
    Question,
    Cog,
    UserTie,
    ArrowLeft,
}

impl Icon {
    /// Unknown tags resolve to `None` and render without an icon.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "QuoteIcon" => Some(Self::Quote),
            "WhatsAppIcon" => Some(Self::WhatsApp),
            "ServicesIcon" => Some(Self::Services),
            "PortfolioIcon" => Some(Self::Portfolio),
            "QuestionIcon" => Some(Self::Question),
            "CogIcon" => Some(Self::Cog),
            "UserTieIcon" => Some(Self::UserTie),
            "ArrowLeftIcon" => Some(Self::ArrowLeft),
            _ => None,
        }
    }

    pub fn resolve(tag: Option<&str>) -> Option<Self> {
        tag.and_then(Self::from_tag)
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Quote => "❝",
            Self::WhatsApp => "✆",
            Self::Services => "⚒",
            Self::Portfolio => "▦",
            Self::Question => "?",
            Self::Cog => "⚙",
            Self::UserTie => "☺",
            Self::ArrowLeft => "←",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Bot,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAffordance {
    pub text: String,
    pub url: String,
    #[serde(default)]
    pub external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ChatOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkAffordance>,
    pub ts: String,
}

/// Message content before the session assigns an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub sender: Sender,
    pub text: Option<String>,
    pub options: Option<Vec<ChatOption>>,
    pub link: Option<LinkAffordance>,
}

impl MessageDraft {
    pub fn bot_text(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: Some(text.into()),
            options: None,
            link: None,
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: Some(text.into()),
            options: None,
            link: None,
        }
    }

    pub fn bot_options(options: Vec<ChatOption>) -> Self {
        Self {
            sender: Sender::Bot,
            text: None,
            options: Some(options),
            link: None,
        }
    }

    pub fn bot_link(link: LinkAffordance) -> Self {
        Self {
            sender: Sender::Bot,
            text: None,
            options: None,
            link: Some(link),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub messages: Vec<Message>,
    pub node_id: NodeId,
    pub bindings: Bindings,
    pub history: Vec<NodeId>,
    /// Message id that was next when each history entry's node was entered.
    pub history_marks: Vec<u64>,
    pub context: Bindings,
    pub next_message_id: u64,
    pub node_entry_mark: u64,
}

impl SessionState {
    pub fn fresh(start_node: &str) -> Self {
        Self {
            messages: Vec::new(),
            node_id: start_node.to_string(),
            bindings: Bindings::new(),
            history: Vec::new(),
            history_marks: Vec::new(),
            context: Bindings::new(),
            next_message_id: 1,
            node_entry_mark: 1,
        }
    }

    pub fn push_message(&mut self, draft: MessageDraft, ts: String) -> u64 {
        let id = self.next_message_id;
        self.next_message_id += 1;
        self.messages.push(Message {
            id,
            sender: draft.sender,
            text: draft.text,
            options: draft.options,
            link: draft.link,
            ts,
        });
        id
    }

    /// Records the current node on the history stack before a transition.
    pub fn push_history(&mut self) {
        self.history.push(self.node_id.clone());
        self.history_marks.push(self.node_entry_mark);
    }

    pub fn strip_options(&mut self) {
        for message in &mut self.messages {
            message.options = None;
        }
    }

    pub fn active_options(&self) -> Option<&[ChatOption]> {
        self.messages
            .iter()
            .rev()
            .find_map(|message| message.options.as_deref())
    }
}

/// Persisted form of [`SessionState`], with the log truncated to the most recent messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub schema_version: String,
    pub messages: Vec<Message>,
    pub node_id: NodeId,
    #[serde(default)]
    pub bindings: Bindings,
    #[serde(default)]
    pub history: Vec<NodeId>,
    #[serde(default)]
    pub history_marks: Vec<u64>,
    #[serde(default)]
    pub context: Bindings,
    #[serde(default)]
    pub next_message_id: u64,
    #[serde(default)]
    pub node_entry_mark: u64,
}

impl SessionSnapshot {
    pub fn capture(state: &SessionState, max_messages: usize) -> Self {
        let skip = state.messages.len().saturating_sub(max_messages);
        Self {
            schema_version: SESSION_SNAPSHOT_SCHEMA.to_string(),
            messages: state.messages[skip..].to_vec(),
            node_id: state.node_id.clone(),
            bindings: state.bindings.clone(),
            history: state.history.clone(),
            history_marks: state.history_marks.clone(),
            context: state.context.clone(),
            next_message_id: state.next_message_id,
            node_entry_mark: state.node_entry_mark,
        }
    }

    pub fn into_state(self) -> SessionState {
        let floor = self
            .messages
            .iter()
            .map(|message| message.id + 1)
            .max()
            .unwrap_or(1);
        let history_marks = if self.history_marks.len() == self.history.len() {
            self.history_marks
        } else {
            Vec::new()
        };
        SessionState {
            messages: self.messages,
            node_id: self.node_id,
            bindings: self.bindings,
            history: self.history,
            history_marks,
            context: self.context,
            next_message_id: self.next_message_id.max(floor),
            node_entry_mark: self.node_entry_mark,
        }
    }
}

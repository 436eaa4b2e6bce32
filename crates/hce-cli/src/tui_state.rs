use hce_core::{Icon, Message, Sender};
use hce_runtime::ChatAssistant;

#[derive(Debug, Default)]
pub(crate) struct TuiUiState {
    pub(crate) input_buffer: String,
    pub(crate) selected_choice_index: usize,
    pub(crate) choice_scroll_offset: usize,
    pub(crate) attach_mode: bool,
    pub(crate) help_visible: bool,
    pub(crate) status: String,
}

impl TuiUiState {
    pub(crate) fn new() -> Self {
        Self {
            status: "ready".to_string(),
            ..Self::default()
        }
    }

    /// Clears per-prompt state after the conversation moved on.
    pub(crate) fn reset_interaction(&mut self) {
        self.input_buffer.clear();
        self.selected_choice_index = 0;
        self.choice_scroll_offset = 0;
        self.attach_mode = false;
    }
}

/// Option rows on screen, with the icon glyph when the tag is known.
pub(crate) fn choice_rows(assistant: &ChatAssistant) -> Vec<String> {
    if assistant.is_typing() {
        return Vec::new();
    }
    assistant
        .active_options()
        .map(|options| {
            options
                .iter()
                .map(|option| match Icon::resolve(option.icon.as_deref()) {
                    Some(icon) => format!("{} {}", icon.glyph(), option.text),
                    None => option.text.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// A log entry as one display line. Option lists are shown in the choice area instead.
pub(crate) fn message_line(message: &Message) -> Option<String> {
    let who = match message.sender {
        Sender::Bot => "bot",
        Sender::User => "you",
    };
    if let Some(text) = &message.text {
        return Some(format!("[{}] {}: {}", message.ts, who, text));
    }
    let link = message.link.as_ref()?;
    let glyph = Icon::resolve(link.icon.as_deref())
        .map(|icon| format!("{} ", icon.glyph()))
        .unwrap_or_default();
    let target = if link.external { "external" } else { "internal" };
    Some(format!(
        "[{}] {}: {}{} <{}> ({})",
        message.ts, who, glyph, link.text, link.url, target
    ))
}

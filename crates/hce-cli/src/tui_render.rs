use hce_runtime::ChatAssistant;

use crate::tui_actions::CHOICE_VIEWPORT_ROWS;
use crate::tui_state::{choice_rows, message_line, TuiUiState};

const ELLIPSIS: &str = "…";
const TYPING_LINE: &str = "bot is typing…";

/// Plain rows for one frame, top to bottom, with the role used to style each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RowRole {
    Header,
    Meta,
    Message,
    Typing,
    Divider,
    Prompt,
    Choice { selected: bool },
    Keys,
    Help,
}

pub(crate) fn layout_rows(
    assistant: &ChatAssistant,
    ui: &TuiUiState,
    state_path: &str,
    width: usize,
    height: usize,
) -> Vec<(RowRole, String)> {
    let content_width = width.saturating_sub(2).max(16);
    let mut rows = vec![
        (
            RowRole::Header,
            truncate_to_width("HCE Esquadrias | assistente", content_width),
        ),
        (
            RowRole::Meta,
            truncate_to_width(&format!("state: {}", state_path), content_width),
        ),
        (
            RowRole::Meta,
            truncate_to_width(&format!("status: {}", ui.status), content_width),
        ),
    ];

    if !assistant.is_open() {
        rows.push((
            RowRole::Prompt,
            truncate_to_width("[ chat ] press F2 or enter to talk to us", content_width),
        ));
        rows.push((
            RowRole::Keys,
            truncate_to_width("keys: F2/enter open | esc quit", content_width),
        ));
        return rows;
    }

    let mut text_rows: Vec<(RowRole, String)> = assistant
        .messages()
        .iter()
        .filter_map(message_line)
        .flat_map(|line| wrap_line_to_width(&line, content_width))
        .map(|row| (RowRole::Message, row))
        .collect();
    if assistant.is_typing() {
        text_rows.push((RowRole::Typing, TYPING_LINE.to_string()));
    }

    let choices = choice_rows(assistant);
    let input_mode = ui.attach_mode || assistant.input_visible();
    let prompt = if ui.attach_mode {
        "attach file path (enter send, esc cancel):".to_string()
    } else if assistant.input_visible() {
        if assistant.file_upload_visible() {
            "your answer (ctrl+a to attach a file):".to_string()
        } else {
            "your answer:".to_string()
        }
    } else if !choices.is_empty() {
        "choices (up/down + enter):".to_string()
    } else {
        String::new()
    };

    let mut reserved = rows.len() + 1 + CHOICE_VIEWPORT_ROWS + 1;
    if !prompt.is_empty() {
        reserved += 1;
    }
    if ui.help_visible {
        reserved += 1;
    }
    // Keep the latest messages in view.
    let visible_text_rows = height.saturating_sub(reserved).max(1);
    if text_rows.len() > visible_text_rows {
        text_rows.drain(..text_rows.len() - visible_text_rows);
    }
    rows.extend(text_rows);
    rows.push((RowRole::Divider, "─".repeat(content_width)));
    if !prompt.is_empty() {
        rows.push((RowRole::Prompt, truncate_to_width(&prompt, content_width)));
    }

    let choice_width = content_width.saturating_sub(2).max(8);
    for row_index in 0..CHOICE_VIEWPORT_ROWS {
        if input_mode {
            let text = if row_index == 0 {
                truncate_to_width(&ui.input_buffer, choice_width)
            } else {
                " ".to_string()
            };
            rows.push((RowRole::Choice { selected: row_index == 0 }, text));
            continue;
        }
        let absolute = ui.choice_scroll_offset + row_index;
        match choices.get(absolute) {
            Some(text) => rows.push((
                RowRole::Choice {
                    selected: absolute == ui.selected_choice_index,
                },
                truncate_to_width(text, choice_width),
            )),
            None => rows.push((RowRole::Choice { selected: false }, " ".to_string())),
        }
    }

    let back_key = if assistant.can_go_back() {
        " | ctrl+b back"
    } else {
        ""
    };
    rows.push((
        RowRole::Keys,
        truncate_to_width(
            &format!(
                "keys: up/down move | enter send{} | ctrl+r restart | ctrl+a attach | ctrl+h help | F2/esc close",
                back_key
            ),
            content_width,
        ),
    ));
    if ui.help_visible {
        rows.push((
            RowRole::Help,
            truncate_to_width(
                "the session is saved automatically; esc on the launcher quits.",
                content_width,
            ),
        ));
    }
    rows
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let chars = value.chars().collect::<Vec<_>>();
    if chars.len() <= width {
        return value.to_string();
    }
    if width == 1 {
        return ELLIPSIS.to_string();
    }
    let mut out = chars.into_iter().take(width - 1).collect::<String>();
    out.push_str(ELLIPSIS);
    out
}

/// Breaks on embedded newlines first, then chunks each line to `width`.
pub(crate) fn wrap_line_to_width(value: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![String::new()];
    }
    let mut rows = Vec::new();
    for line in value.split('\n') {
        let chars = line.chars().collect::<Vec<_>>();
        if chars.is_empty() {
            rows.push(String::new());
            continue;
        }
        rows.extend(chars.chunks(width).map(|chunk| chunk.iter().collect::<String>()));
    }
    rows
}

#[cfg(not(coverage))]
pub(crate) fn render_tui(
    frame: &mut ratatui::Frame<'_>,
    assistant: &ChatAssistant,
    ui: &TuiUiState,
    state_path: &str,
) {
    use ratatui::style::{Color, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Paragraph, Wrap};

    let area = frame.area();
    let lines = layout_rows(
        assistant,
        ui,
        state_path,
        area.width as usize,
        area.height as usize,
    )
    .into_iter()
    .map(|(role, text)| {
        let (text, style) = match role {
            RowRole::Header | RowRole::Message => (text, Style::default()),
            RowRole::Meta | RowRole::Divider => (text, Style::default().fg(Color::Gray)),
            RowRole::Typing => (text, Style::default().fg(Color::DarkGray)),
            RowRole::Prompt => (text, Style::default().fg(Color::Cyan)),
            RowRole::Choice { selected: true } => {
                (format!("> {}", text), Style::default().fg(Color::Green))
            }
            RowRole::Choice { selected: false } => (format!("  {}", text), Style::default()),
            RowRole::Keys => (text, Style::default().fg(Color::Yellow)),
            RowRole::Help => (text, Style::default().fg(Color::Magenta)),
        };
        Line::from(Span::styled(text, style))
    })
    .collect::<Vec<_>>();

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tui_render_tests {
    use super::*;
    use crate::cli_test_support::*;

    #[test]
    fn truncate_and_wrap_respect_width() {
        assert_eq!(truncate_to_width("abcdef", 4), "abc…");
        assert_eq!(truncate_to_width("abc", 4), "abc");
        assert_eq!(truncate_to_width("abc", 1), "…");
        assert_eq!(wrap_line_to_width("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(wrap_line_to_width("", 4), vec![""]);
        assert_eq!(
            wrap_line_to_width("ab\ncdefg\n\nh", 4),
            vec!["ab", "cdef", "g", "", "h"]
        );
    }

    #[test]
    fn back_key_is_listed_only_when_there_is_history() {
        let mut assistant = demo_assistant();
        assistant.open();
        assistant.run_until_idle();
        let ui = TuiUiState::new();
        let keys = |assistant: &ChatAssistant| {
            layout_rows(assistant, &ui, "state.json", 200, 24)
                .into_iter()
                .find(|(role, _)| *role == RowRole::Keys)
                .map(|(_, text)| text)
                .expect("keys row")
        };
        assert!(!keys(&assistant).contains("ctrl+b back"));

        assistant.select_option_at(0).expect("quote option");
        assistant.run_until_idle();
        assert!(keys(&assistant).contains("ctrl+b back"));
    }

    #[test]
    fn closed_panel_shows_only_the_launcher() {
        let assistant = demo_assistant();
        let rows = layout_rows(&assistant, &TuiUiState::new(), "state.json", 80, 24);
        assert!(rows
            .iter()
            .any(|(role, text)| *role == RowRole::Prompt && text.contains("F2")));
        assert!(!rows.iter().any(|(role, _)| *role == RowRole::Message));
    }

    #[test]
    fn open_panel_shows_typing_then_choices() {
        let mut assistant = demo_assistant();
        assistant.open();
        let ui = TuiUiState::new();
        let rows = layout_rows(&assistant, &ui, "state.json", 80, 24);
        assert!(rows.iter().any(|(role, _)| *role == RowRole::Typing));

        assistant.run_until_idle();
        let rows = layout_rows(&assistant, &ui, "state.json", 80, 24);
        assert!(!rows.iter().any(|(role, _)| *role == RowRole::Typing));
        let selected: Vec<&String> = rows
            .iter()
            .filter(|(role, _)| *role == RowRole::Choice { selected: true })
            .map(|(_, text)| text)
            .collect();
        assert_eq!(selected.len(), 1);
        assert!(selected[0].ends_with("Solicitar orçamento"));
    }

    #[test]
    fn small_screens_keep_the_latest_messages() {
        let mut assistant = demo_assistant();
        assistant.open();
        assistant.run_until_idle();
        let rows = layout_rows(&assistant, &TuiUiState::new(), "state.json", 80, 12);
        let messages: Vec<&String> = rows
            .iter()
            .filter(|(role, _)| *role == RowRole::Message)
            .map(|(_, text)| text)
            .collect();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Como posso ajudar"));
    }
}

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hce_core::AssistantError;
use hce_runtime::ChatAssistant;

use crate::tui_state::{choice_rows, TuiUiState};
use crate::file_candidate;

pub(crate) const CHOICE_VIEWPORT_ROWS: usize = 5;

/// Applies one key press. Returns true when the shell should quit.
pub(crate) fn handle_key(
    key: KeyEvent,
    assistant: &mut ChatAssistant,
    ui: &mut TuiUiState,
) -> Result<bool, AssistantError> {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    if control && key.code == KeyCode::Char('c') {
        return Ok(true);
    }

    match key.code {
        KeyCode::F(2) => {
            let opened = assistant.toggle();
            ui.status = if opened { "opened" } else { "closed" }.to_string();
            return Ok(false);
        }
        KeyCode::Esc => {
            if ui.attach_mode {
                ui.attach_mode = false;
                ui.input_buffer.clear();
                ui.status = "attach cancelled".to_string();
                return Ok(false);
            }
            if assistant.handle_escape() {
                ui.status = "closed".to_string();
                return Ok(false);
            }
            return Ok(true);
        }
        _ => {}
    }

    if !assistant.is_open() {
        if matches!(key.code, KeyCode::Enter) {
            assistant.open();
            ui.status = "opened".to_string();
        } else if key.code == KeyCode::Char('q') {
            return Ok(true);
        }
        return Ok(false);
    }

    if control {
        match key.code {
            KeyCode::Char('b') => {
                ui.reset_interaction();
                ui.status = if assistant.back() {
                    "went back"
                } else {
                    "nothing to go back to"
                }
                .to_string();
            }
            KeyCode::Char('r') => {
                assistant.reset();
                ui.reset_interaction();
                ui.status = "restarted".to_string();
            }
            KeyCode::Char('a') => {
                if assistant.file_upload_visible() {
                    ui.attach_mode = true;
                    ui.input_buffer.clear();
                    ui.status = "attach: type a file path, enter to send".to_string();
                } else {
                    ui.status = "attachments are not accepted here".to_string();
                }
            }
            KeyCode::Char('h') => ui.help_visible = !ui.help_visible,
            _ => {}
        }
        return Ok(false);
    }

    let typing_in_progress = assistant.is_typing();
    let input_pending = ui.attach_mode || assistant.input_visible();
    let choices = choice_rows(assistant);

    match key.code {
        KeyCode::Up => {
            if choices.is_empty() {
                ui.status = "no pending choice".to_string();
                return Ok(false);
            }
            ui.selected_choice_index = ui.selected_choice_index.saturating_sub(1);
            if ui.selected_choice_index < ui.choice_scroll_offset {
                ui.choice_scroll_offset = ui.selected_choice_index;
            }
        }
        KeyCode::Down => {
            if choices.is_empty() {
                ui.status = "no pending choice".to_string();
                return Ok(false);
            }
            let last = choices.len().saturating_sub(1);
            ui.selected_choice_index = (ui.selected_choice_index + 1).min(last);
            if choices.len() > CHOICE_VIEWPORT_ROWS
                && ui.selected_choice_index >= ui.choice_scroll_offset + CHOICE_VIEWPORT_ROWS
            {
                ui.choice_scroll_offset = ui.selected_choice_index - CHOICE_VIEWPORT_ROWS + 1;
            }
        }
        KeyCode::Backspace | KeyCode::Delete => {
            if input_pending {
                ui.input_buffer.pop();
            }
        }
        KeyCode::Enter => {
            if typing_in_progress {
                ui.status = "assistant is typing...".to_string();
                return Ok(false);
            }
            if ui.attach_mode {
                let path = ui.input_buffer.trim().to_string();
                let file = file_candidate(Path::new(&path))?;
                if assistant.submit_file(&file)? {
                    ui.reset_interaction();
                    ui.status = format!("sent {}", file.name);
                }
                return Ok(false);
            }
            if assistant.input_visible() {
                if assistant.submit_text(&ui.input_buffer) {
                    ui.reset_interaction();
                    ui.status = "sent".to_string();
                } else {
                    ui.status = "type an answer first".to_string();
                }
                return Ok(false);
            }
            if choices.is_empty() {
                ui.status = "no pending choice".to_string();
                return Ok(false);
            }
            let index = ui.selected_choice_index;
            assistant.select_option_at(index)?;
            ui.reset_interaction();
            ui.status = format!("chose {}", index);
        }
        KeyCode::Char(ch) => {
            if input_pending && !key.modifiers.contains(KeyModifiers::ALT) {
                ui.input_buffer.push(ch);
            }
        }
        _ => {}
    }

    Ok(false)
}

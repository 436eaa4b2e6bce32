use std::io::Write;
use std::path::Path;

use hce_core::AssistantError;
use hce_runtime::{AssistantEffect, ChatAssistant};

use crate::{json_string, map_cli_output, map_tui_io, BoundaryEvent, BoundaryResult};

pub(crate) fn last_message_id(assistant: &ChatAssistant) -> u64 {
    assistant
        .messages()
        .last()
        .map(|message| message.id)
        .unwrap_or(0)
}

/// Runs pending steps to completion and reports what appeared after `after_id`.
pub(crate) fn run_to_boundary(assistant: &mut ChatAssistant, after_id: u64) -> BoundaryResult {
    assistant.run_until_idle();
    collect_boundary(assistant, after_id)
}

pub(crate) fn collect_boundary(assistant: &mut ChatAssistant, after_id: u64) -> BoundaryResult {
    let navigations = assistant
        .drain_effects()
        .into_iter()
        .map(|effect| match effect {
            AssistantEffect::Navigate { link } => link,
        })
        .collect();
    let messages = assistant
        .messages()
        .iter()
        .filter(|message| message.id > after_id)
        .cloned()
        .collect();

    if assistant.input_visible() {
        return BoundaryResult {
            event: BoundaryEvent::Input,
            messages,
            choices: Vec::new(),
            navigations,
            file_upload: assistant.file_upload_visible(),
        };
    }

    match assistant.active_options() {
        Some(options) if !assistant.is_typing() => BoundaryResult {
            event: BoundaryEvent::Choices,
            messages,
            choices: options
                .iter()
                .enumerate()
                .map(|(index, option)| (index, option.text.clone()))
                .collect(),
            navigations,
            file_upload: false,
        },
        _ => BoundaryResult {
            event: BoundaryEvent::Idle,
            messages,
            choices: Vec::new(),
            navigations,
            file_upload: false,
        },
    }
}

pub(crate) fn emit_boundary(
    boundary: &BoundaryResult,
    state_path: &Path,
    out: &mut dyn Write,
) -> Result<(), AssistantError> {
    for line in boundary_lines(boundary, state_path)? {
        writeln!(out, "{}", line).map_err(map_tui_io)?;
    }
    Ok(())
}

pub(crate) fn boundary_lines(
    boundary: &BoundaryResult,
    state_path: &Path,
) -> Result<Vec<String>, AssistantError> {
    let mut lines = vec!["RESULT:OK".to_string()];
    lines.push(
        match boundary.event {
            BoundaryEvent::Choices => "EVENT:CHOICES",
            BoundaryEvent::Input => "EVENT:INPUT",
            BoundaryEvent::Idle => "EVENT:IDLE",
        }
        .to_string(),
    );

    for message in &boundary.messages {
        lines.push(format!(
            "MESSAGE_JSON:{}",
            serde_json::to_string(message).map_err(map_cli_output)?
        ));
        if let Some(link) = &message.link {
            lines.push(format!(
                "LINK_JSON:{}",
                serde_json::to_string(link).map_err(map_cli_output)?
            ));
        }
    }

    for (index, text) in &boundary.choices {
        lines.push(format!("CHOICE:{}|{}", index, json_string(text)));
    }
    if boundary.file_upload {
        lines.push("FILE_UPLOAD:YES".to_string());
    }
    for link in &boundary.navigations {
        lines.push(format!("NAVIGATE:{}", link));
    }
    lines.push(format!("STATE_DIR:{}", state_dir_of(state_path)));
    Ok(lines)
}

fn state_dir_of(state_path: &Path) -> String {
    state_path
        .parent()
        .map(|parent| parent.display().to_string())
        .unwrap_or_else(|| ".".to_string())
}

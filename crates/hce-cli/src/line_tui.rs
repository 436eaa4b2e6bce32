use std::io::{self, BufRead, Write};
use std::path::Path;

use hce_core::AssistantError;
use hce_runtime::ChatAssistant;

use crate::tui_state::message_line;
use crate::{
    file_candidate, last_message_id, map_tui_io, run_to_boundary, BoundaryEvent, LoadedSession,
    TuiCommandAction,
};

const LINE_HELP: &str = "commands: :help :back :reset :attach <path> :quit";

pub(crate) fn run_tui_line_mode(session: &mut LoadedSession) -> Result<i32, AssistantError> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    run_tui_line_mode_with_io(&mut session.assistant, &mut reader, &mut writer)
}

pub(crate) fn run_tui_line_mode_with_io(
    assistant: &mut ChatAssistant,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<i32, AssistantError> {
    writeln!(writer, "HCE assistant").map_err(map_tui_io)?;
    writeln!(writer, "{}", LINE_HELP).map_err(map_tui_io)?;
    assistant.open();

    let mut printed_id = 0u64;
    loop {
        let boundary = run_to_boundary(assistant, printed_id);
        for message in &boundary.messages {
            if let Some(line) = message_line(message) {
                writeln!(writer, "{}", line).map_err(map_tui_io)?;
            }
        }
        printed_id = last_message_id(assistant);
        for link in &boundary.navigations {
            writeln!(writer, "(navigate: {})", link).map_err(map_tui_io)?;
        }
        match boundary.event {
            BoundaryEvent::Choices => {
                for (index, text) in &boundary.choices {
                    writeln!(writer, "  [{}] {}", index, text).map_err(map_tui_io)?;
                }
            }
            BoundaryEvent::Input if boundary.file_upload => {
                writeln!(writer, "(type your answer, or :attach <path>)").map_err(map_tui_io)?;
            }
            BoundaryEvent::Input => {
                writeln!(writer, "(type your answer)").map_err(map_tui_io)?;
            }
            BoundaryEvent::Idle => {
                writeln!(writer, "(nothing to answer; :back, :reset or :quit)")
                    .map_err(map_tui_io)?;
            }
        }

        let Some(raw) = prompt_input_from("> ", reader, writer)? else {
            break;
        };
        let mut emitted = Vec::new();
        let mut emit = |line: String| emitted.push(line);
        let outcome = handle_line_cmd(raw.as_str(), boundary.event, assistant, &mut emit);
        for line in emitted {
            writeln!(writer, "{}", line).map_err(map_tui_io)?;
        }
        match outcome {
            Ok(TuiCommandAction::Quit) => break,
            Ok(_) => {}
            Err(error) => writeln!(writer, "error: {}", error).map_err(map_tui_io)?,
        }
        if assistant.messages().is_empty() {
            printed_id = 0;
        }
    }

    assistant.shutdown();
    Ok(0)
}

/// Handles `:` commands, then treats anything else as an answer to the current prompt.
pub(crate) fn handle_line_cmd(
    raw: &str,
    event: BoundaryEvent,
    assistant: &mut ChatAssistant,
    emit: &mut dyn FnMut(String),
) -> Result<TuiCommandAction, AssistantError> {
    match raw.trim() {
        ":help" => {
            emit(LINE_HELP.to_string());
            return Ok(TuiCommandAction::Continue);
        }
        ":back" => {
            if !assistant.back() {
                emit("nothing to go back to".to_string());
            }
            return Ok(TuiCommandAction::Continue);
        }
        ":reset" => {
            assistant.reset();
            emit("restarted".to_string());
            return Ok(TuiCommandAction::Continue);
        }
        ":quit" => {
            emit("bye".to_string());
            return Ok(TuiCommandAction::Quit);
        }
        _ => {}
    }

    if let Some(path) = raw.trim().strip_prefix(":attach ") {
        let file = file_candidate(Path::new(path.trim()))?;
        if !assistant.submit_file(&file)? {
            emit("attachments are not accepted here".to_string());
        }
        return Ok(TuiCommandAction::Continue);
    }

    match event {
        BoundaryEvent::Choices => {
            let choice = raw.trim().parse::<usize>().map_err(|_| {
                AssistantError::new("TUI_CHOICE_PARSE", format!("Invalid choice index: {}", raw))
            })?;
            assistant.select_option_at(choice)?;
            Ok(TuiCommandAction::Continue)
        }
        BoundaryEvent::Input => {
            if !assistant.submit_text(raw) {
                emit("type an answer first".to_string());
            }
            Ok(TuiCommandAction::Continue)
        }
        BoundaryEvent::Idle => Ok(TuiCommandAction::NotHandled),
    }
}

/// Returns `None` at end of input.
pub(crate) fn prompt_input_from(
    prefix: &str,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<Option<String>, AssistantError> {
    write!(writer, "{}", prefix).map_err(map_tui_io)?;
    writer.flush().map_err(map_tui_io)?;
    let mut input = String::new();
    let read = reader.read_line(&mut input).map_err(map_tui_io)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(&['\r', '\n'][..]).to_string()))
}

use std::io;
use std::path::Path;

use hce_core::AssistantError;
use hce_runtime::ChatAssistant;
use log::debug;

use crate::{
    emit_boundary, file_candidate, last_message_id, open_session, run_to_boundary, AgentArgs,
    AgentCommand, SessionArgs,
};

pub(super) fn run_agent(args: AgentArgs) -> Result<i32, AssistantError> {
    match args.command {
        AgentCommand::Start(session) | AgentCommand::Reset(session) => run_fresh(&session),
        AgentCommand::Choose(args) => run_action(&args.session, |assistant| {
            assistant.select_option_at(args.choice)
        }),
        AgentCommand::Input(args) => run_action(&args.session, |assistant| {
            if assistant.submit_text(&args.text) {
                Ok(())
            } else {
                Err(AssistantError::new(
                    "CLI_INPUT_REJECTED",
                    "The current step does not take a text answer.",
                ))
            }
        }),
        AgentCommand::File(args) => {
            let file = file_candidate(Path::new(&args.path))?;
            run_action(&args.session, |assistant| {
                if assistant.submit_file(&file)? {
                    Ok(())
                } else {
                    Err(AssistantError::new(
                        "CLI_FILE_REJECTED",
                        "The current step does not take an attachment.",
                    ))
                }
            })
        }
        AgentCommand::Back(session) => run_action(&session, |assistant| {
            if !assistant.back() {
                debug!("nothing to go back to");
            }
            Ok(())
        }),
    }
}

/// Throws away any stored session and runs the start node.
pub(super) fn run_fresh(session: &SessionArgs) -> Result<i32, AssistantError> {
    let mut loaded = open_session(session)?;
    loaded.assistant.open();
    loaded.assistant.reset();
    finish(&mut loaded.assistant, &loaded.state_path, 0)
}

/// Restores the stored session, lets it settle, then applies one user action.
pub(super) fn run_action(
    session: &SessionArgs,
    action: impl FnOnce(&mut ChatAssistant) -> Result<(), AssistantError>,
) -> Result<i32, AssistantError> {
    let mut loaded = open_session(session)?;
    let assistant = &mut loaded.assistant;
    assistant.open();
    assistant.run_until_idle();
    assistant.drain_effects();

    let after_id = last_message_id(assistant);
    if let Err(error) = action(assistant) {
        assistant.shutdown();
        return Err(error);
    }
    finish(assistant, &loaded.state_path, after_id)
}

fn finish(
    assistant: &mut ChatAssistant,
    state_path: &Path,
    after_id: u64,
) -> Result<i32, AssistantError> {
    let boundary = run_to_boundary(assistant, after_id);
    assistant.shutdown();
    emit_boundary(&boundary, state_path, &mut io::stdout())?;
    Ok(0)
}

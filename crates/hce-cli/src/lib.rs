use std::ffi::OsString;

use clap::Parser;
use hce_core::AssistantError;

mod agent;
mod boundary_runner;
mod check;
mod cli_args;
mod error_map;
mod line_tui;
mod logging;
mod models;
mod session_ops;
mod tui;
mod tui_actions;
mod tui_render;
mod tui_state;

pub(crate) use boundary_runner::{emit_boundary, last_message_id, run_to_boundary};
pub(crate) use cli_args::{AgentArgs, AgentCommand, CheckArgs, Cli, Mode, SessionArgs, TuiArgs};
pub(crate) use error_map::{
    emit_error, json_string, map_cli_file_read, map_cli_log_file, map_cli_output, map_tui_io,
};
pub(crate) use line_tui::run_tui_line_mode;
pub(crate) use logging::{default_log_file, init_logging, LogTarget};
pub(crate) use models::{BoundaryEvent, BoundaryResult, TuiCommandAction};
pub(crate) use session_ops::{file_candidate, open_session, open_shell_session, LoadedSession};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, AssistantError> {
    match cli.command {
        Mode::Agent(args) => {
            init_logging(&LogTarget::Stderr)?;
            agent::run_agent(args)
        }
        Mode::Tui(args) => run_tui(args),
        Mode::Check(args) => {
            init_logging(&LogTarget::Stderr)?;
            check::run_check(args)
        }
    }
}

fn run_tui(args: TuiArgs) -> Result<i32, AssistantError> {
    let log_file = args
        .log_file
        .map(Into::into)
        .unwrap_or_else(|| default_log_file(&args.session.state_dir));
    init_logging(&LogTarget::File(log_file))?;

    let mut session = open_shell_session(&args.session)?;
    tui::run_tui_ratatui_mode(&mut session)
}

#[cfg(test)]
pub(crate) mod cli_test_support {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;
    use std::time::{SystemTime, UNIX_EPOCH};

    use hce_api::{create_assistant, load_tree_from_path, CreateAssistantOptions};
    use hce_runtime::{ChatAssistant, FixedWallClock, MemorySessionStore, SessionStore, WallClock};

    use crate::SessionArgs;

    /// The timestamp comes first so the name keeps its extension.
    pub(crate) fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("hce-cli-{}-{}", nanos, name))
    }

    pub(crate) fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent should be created");
        }
        fs::write(path, content).expect("file should be written");
    }

    pub(crate) fn demo_tree_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("demos")
            .join("chatbot-data.json")
    }

    pub(crate) fn session_args(state_dir: &Path) -> SessionArgs {
        SessionArgs {
            tree: Some(demo_tree_path().to_string_lossy().to_string()),
            state_dir: state_dir.to_string_lossy().to_string(),
            config: None,
        }
    }

    pub(crate) fn demo_assistant() -> ChatAssistant {
        create_assistant(CreateAssistantOptions {
            tree: Some(load_tree_from_path(&demo_tree_path()).expect("demo tree should load")),
            config: None,
            store: Some(Rc::new(MemorySessionStore::new()) as Rc<dyn SessionStore>),
            wall_clock: Some(Rc::new(FixedWallClock::new("10:00")) as Rc<dyn WallClock>),
        })
    }
}

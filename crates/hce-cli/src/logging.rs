use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use env_logger::{Builder, Env, Target};
use hce_core::AssistantError;

use crate::map_cli_log_file;

pub(crate) const LOG_FILE_NAME: &str = "hce-cli.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LogTarget {
    Stderr,
    /// The full-screen shell owns the terminal, so records go to a file.
    File(PathBuf),
}

pub(crate) fn default_log_file(state_dir: &str) -> PathBuf {
    Path::new(state_dir).join(LOG_FILE_NAME)
}

/// `RUST_LOG` overrides the default `warn` filter. A second call keeps the first logger.
pub(crate) fn init_logging(target: &LogTarget) -> Result<(), AssistantError> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let LogTarget::File(path) = target {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(map_cli_log_file)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(map_cli_log_file)?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    if builder.try_init().is_err() {
        log::debug!("logger already installed");
    }
    Ok(())
}

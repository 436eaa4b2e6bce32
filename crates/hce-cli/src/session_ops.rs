use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use hce_api::{create_assistant, load_config, load_tree_from_path, CreateAssistantOptions};
use hce_core::{AssistantConfig, AssistantError, DialogueTree};
use hce_runtime::{mime_from_path, ChatAssistant, FileCandidate, FileSessionStore, SessionStore};
use log::warn;

use crate::{map_cli_file_read, SessionArgs};

/// An assistant wired to the tree and state directory named on the command line.
pub(crate) struct LoadedSession {
    pub(crate) assistant: ChatAssistant,
    pub(crate) state_path: PathBuf,
}

pub(crate) fn open_session(args: &SessionArgs) -> Result<LoadedSession, AssistantError> {
    let config = load_config(args.config.as_deref().map(Path::new))?;
    let tree = load_tree_from_path(Path::new(&tree_path_for(args, &config)))?;
    Ok(build_session(args, config, Some(tree)))
}

/// Like [`open_session`], but a tree that fails to load leaves the assistant without one.
/// The failure is only logged; the shell still runs with nothing to say.
pub(crate) fn open_shell_session(args: &SessionArgs) -> Result<LoadedSession, AssistantError> {
    let config = load_config(args.config.as_deref().map(Path::new))?;
    let tree = load_tree_from_path(Path::new(&tree_path_for(args, &config))).ok();
    if tree.is_none() {
        warn!("starting without a dialogue tree");
    }
    Ok(build_session(args, config, tree))
}

fn tree_path_for(args: &SessionArgs, config: &AssistantConfig) -> String {
    args.tree
        .clone()
        .unwrap_or_else(|| config.tree_path.clone())
}

fn build_session(
    args: &SessionArgs,
    config: AssistantConfig,
    tree: Option<DialogueTree>,
) -> LoadedSession {
    let store = FileSessionStore::new(&args.state_dir, &config.storage_key);
    let state_path = store.path().to_path_buf();
    let assistant = create_assistant(CreateAssistantOptions {
        tree,
        config: Some(config),
        store: Some(Rc::new(store) as Rc<dyn SessionStore>),
        wall_clock: None,
    });

    LoadedSession {
        assistant,
        state_path,
    }
}

/// Describes a local file the way an upload picker would.
pub(crate) fn file_candidate(path: &Path) -> Result<FileCandidate, AssistantError> {
    let metadata = fs::metadata(path).map_err(map_cli_file_read)?;
    if !metadata.is_file() {
        return Err(AssistantError::new(
            "CLI_FILE_NOT_FILE",
            format!("Not a regular file: {}", path.display()),
        ));
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(FileCandidate::new(
        name,
        metadata.len(),
        mime_from_path(path),
    ))
}

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "hce-cli")]
#[command(about = "HCE guided chat assistant CLI")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Agent(AgentArgs),
    Tui(TuiArgs),
    Check(CheckArgs),
}

/// Where the session comes from and where it is kept.
#[derive(Debug, Clone, Args)]
pub(crate) struct SessionArgs {
    #[arg(long = "tree")]
    pub(crate) tree: Option<String>,
    #[arg(long = "state-dir", default_value = ".hce")]
    pub(crate) state_dir: String,
    #[arg(long = "config")]
    pub(crate) config: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct AgentArgs {
    #[command(subcommand)]
    pub(crate) command: AgentCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum AgentCommand {
    Start(SessionArgs),
    Choose(ChooseArgs),
    Input(InputArgs),
    File(FileArgs),
    Back(SessionArgs),
    Reset(SessionArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ChooseArgs {
    #[command(flatten)]
    pub(crate) session: SessionArgs,
    #[arg(long = "choice")]
    pub(crate) choice: usize,
}

#[derive(Debug, Args)]
pub(crate) struct InputArgs {
    #[command(flatten)]
    pub(crate) session: SessionArgs,
    #[arg(long = "text")]
    pub(crate) text: String,
}

#[derive(Debug, Args)]
pub(crate) struct FileArgs {
    #[command(flatten)]
    pub(crate) session: SessionArgs,
    #[arg(long = "path")]
    pub(crate) path: String,
}

#[derive(Debug, Args)]
pub(crate) struct TuiArgs {
    #[command(flatten)]
    pub(crate) session: SessionArgs,
    #[arg(long = "log-file")]
    pub(crate) log_file: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    #[arg(long = "path")]
    pub(crate) path: String,
    #[arg(long = "start", default_value = hce_core::DEFAULT_START_NODE)]
    pub(crate) start: String,
}

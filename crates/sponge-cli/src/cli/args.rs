use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sponge",
    version,
    about = "Scores AI-assisted coding sessions against a fixed test suite and rubric"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Split a marker-delimited code blob into its files
    Parse(ParseArgs),
    /// Run the candidate overlay against the test suite in a sandbox
    RunTests(RunTestsArgs),
    /// Score a recorded session from precomputed evaluator outputs
    Score(ScoreArgs),
    /// Evaluate, test and score a session end to end
    Submit(SubmitArgs),
    Init(InitArgs),
    Version,
}

#[derive(Parser, Clone)]
pub struct ParseArgs {
    #[arg(long)]
    pub overlay: PathBuf,

    /// Output format: text | json
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Parser, Clone)]
pub struct RunTestsArgs {
    #[arg(long, default_value = "sponge.yaml")]
    pub config: PathBuf,

    #[arg(long)]
    pub overlay: PathBuf,

    /// include the hidden suite (submission mode)
    #[arg(long)]
    pub hidden: bool,

    #[arg(long)]
    pub junit: Option<PathBuf>,

    /// reject unknown config keys
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Clone)]
pub struct ScoreArgs {
    #[arg(long)]
    pub session: PathBuf,

    /// vocabulary source; built-in terms are used when unset
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub conversation_eval: Option<PathBuf>,

    #[arg(long)]
    pub code_eval: Option<PathBuf>,

    #[arg(long)]
    pub test_results: Option<PathBuf>,

    /// Output format: text | json
    #[arg(long, default_value = "json")]
    pub format: String,
}

#[derive(Parser, Clone)]
pub struct SubmitArgs {
    #[arg(long, default_value = "sponge.yaml")]
    pub config: PathBuf,

    #[arg(long)]
    pub session: PathBuf,

    #[arg(long)]
    pub overlay: PathBuf,

    /// where to write the scored session; defaults to overwriting --session
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "sponge.yaml")]
    pub config: PathBuf,
}

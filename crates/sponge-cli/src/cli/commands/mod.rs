use super::args::{Cli, Command, InitArgs};
use serde::de::DeserializeOwned;
use std::path::Path;

mod parse;
mod score;
mod submit;
mod wiring;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const TEST_FAILED: i32 = 1;
    /// Empty overlay, or the sandbox produced no result.
    pub const NO_RESULT: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Parse(args) => parse::run(args),
        Command::RunTests(args) => run_tests::run(args).await,
        Command::Score(args) => score::run(args),
        Command::Submit(args) => submit::run(args).await,
        Command::Init(args) => cmd_init(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    if !args.config.exists() {
        ensure_parent_dir(&args.config)?;
        sponge_core::config::write_sample_config(&args.config).map_err(|e| anyhow::anyhow!(e))?;
        eprintln!("created {}", args.config.display());
    } else {
        eprintln!("note: {} already exists", args.config.display());
    }
    Ok(exit_codes::OK)
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    use anyhow::Context;
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {} {}", what, path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid {} JSON in {}", what, path.display()))
}

pub(crate) fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

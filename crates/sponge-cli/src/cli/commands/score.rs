use sponge_core::config::Vocabulary;
use sponge_core::model::{CodeEval, ConvEval, Session, TestSuiteResult};
use sponge_core::report::console;

use super::{exit_codes, read_json, wiring};
use crate::cli::args::ScoreArgs;

/// Offline scoring: evaluator outputs and test results come from files, so
/// nothing here calls a model or starts a sandbox.
pub fn run(args: ScoreArgs) -> anyhow::Result<i32> {
    let vocabulary = match &args.config {
        Some(path) => match wiring::load(path, false) {
            Ok(cfg) => cfg.vocabulary,
            Err(code) => return Ok(code),
        },
        None => Vocabulary::default(),
    };

    let session: Session = read_json(&args.session, "session")?;
    let conv = args
        .conversation_eval
        .as_deref()
        .map(|p| read_json::<ConvEval>(p, "conversation eval"))
        .transpose()?
        .map(ConvEval::clamped);
    let code = args
        .code_eval
        .as_deref()
        .map(|p| read_json::<CodeEval>(p, "code eval"))
        .transpose()?
        .map(CodeEval::clamped);
    let tests = args
        .test_results
        .as_deref()
        .map(|p| read_json::<TestSuiteResult>(p, "test results"))
        .transpose()?;

    let aggregator = sponge_metrics::default_aggregator(&vocabulary);
    let score = aggregator.aggregate(&session, conv.as_ref(), code.as_ref(), tests.as_ref());

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&score)?);
    } else {
        console::print_score_summary(&score);
    }
    Ok(exit_codes::OK)
}

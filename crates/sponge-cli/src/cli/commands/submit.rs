use sponge_core::model::Session;
use sponge_core::report::console;

use super::{exit_codes, read_json, wiring};
use crate::cli::args::SubmitArgs;

pub async fn run(args: SubmitArgs) -> anyhow::Result<i32> {
    use anyhow::Context;
    let cfg = match wiring::load(&args.config, args.strict) {
        Ok(c) => c,
        Err(code) => return Ok(code),
    };
    let mut session: Session = read_json(&args.session, "session")?;
    let final_code = std::fs::read_to_string(&args.overlay)
        .with_context(|| format!("failed to read overlay {}", args.overlay.display()))?;

    let service = wiring::build_service(&cfg);
    let score = service
        .submit(&mut session, &final_code, args.username.as_deref())
        .await;

    if let Some(suite) = &score.test_suite {
        console::print_test_summary(suite);
    }
    console::print_score_summary(&score);

    let out = args.out.as_ref().unwrap_or(&args.session);
    super::ensure_parent_dir(out)?;
    std::fs::write(out, serde_json::to_string_pretty(&session)?)
        .with_context(|| format!("failed to write {}", out.display()))?;
    eprintln!("wrote {}", out.display());

    Ok(exit_codes::OK)
}

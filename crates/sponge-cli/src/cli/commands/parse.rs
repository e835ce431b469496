use sponge_core::overlay::Overlay;

use super::exit_codes;
use crate::cli::args::ParseArgs;

pub fn run(args: ParseArgs) -> anyhow::Result<i32> {
    use anyhow::Context;
    let blob = std::fs::read_to_string(&args.overlay)
        .with_context(|| format!("failed to read overlay {}", args.overlay.display()))?;
    let overlay = Overlay::parse(&blob);

    if args.format == "json" {
        let files: serde_json::Map<String, serde_json::Value> = overlay
            .iter()
            .map(|(path, content)| (path.to_string(), serde_json::Value::from(content)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&files)?);
    } else {
        for (path, content) in overlay.iter() {
            println!("{}\t{} lines", path, content.lines().count());
        }
    }

    if overlay.is_empty() {
        eprintln!("nothing to evaluate: no file markers found");
        return Ok(exit_codes::NO_RESULT);
    }
    Ok(exit_codes::OK)
}

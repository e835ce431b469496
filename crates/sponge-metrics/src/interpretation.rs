use sponge_core::model::{HeadlineMetrics, PenaltyDetail, RubricBreakdown};

/// Category total rescaled to a 0-10 band.
fn band(value: f64, max: f64) -> i64 {
    ((value / max * 10.0).round() as i64).clamp(0, 10)
}

fn pick(score: i64, high: &'static str, mid: &'static str, low: &'static str) -> &'static str {
    if score >= 8 {
        high
    } else if score >= 5 {
        mid
    } else {
        low
    }
}

/// Template paragraph used when the conversation evaluator gave none: one
/// sentence per category, then a note per applied penalty.
pub fn build(rubric: &RubricBreakdown, metrics: &HeadlineMetrics, penalties: &PenaltyDetail) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(
        pick(
            band(rubric.problem_solving, 25.0),
            "You explored the codebase before asking the AI and framed your questions with clear constraints.",
            "You planned reasonably before using the AI, though reading more of the code first would have sharpened your prompts.",
            "Open the relevant files before your first prompt; it leads to more targeted questions and better answers.",
        )
        .to_string(),
    );
    parts.push(
        pick(
            band(rubric.communication, 25.0),
            "Your prompts were specific, grounded in the code, and showed that you owned the reasoning.",
            "Your prompts were decent but could be more grounded. Naming files and explaining tradeoffs helps the AI help you.",
            "Work on prompt quality: name the files and functions you are asking about and say what you already tried.",
        )
        .to_string(),
    );
    parts.push(
        pick(
            band(rubric.code_quality, 25.0),
            "You reviewed and reshaped AI suggestions before applying them, taking real ownership of the generated code.",
            "You modified some AI output but adopted other suggestions as-is. Make editing every suggestion a habit.",
            "Most AI suggestions went in unchanged. Reviewing and adapting code before keeping it is a core collaboration skill.",
        )
        .to_string(),
    );
    parts.push(
        pick(
            band(rubric.verification, 25.0),
            "Verification was strong: you ran tests iteratively and used them to check AI output.",
            "You ran some tests. Running them right after each AI suggestion would raise your score.",
            "Testing was minimal. Run the tests after every meaningful change, especially after accepting AI output.",
        )
        .to_string(),
    );
    parts.push(
        pick(
            band(rubric.problem_solving + rubric.communication, 50.0),
            "Your multi-turn dialogue built on earlier answers instead of repeating questions.",
            "The dialogue was reasonable. Aim for follow-ups that build on what the AI just said.",
            "Lean into iterative dialogue: ask for clarification, challenge suggestions and refine your approach across turns.",
        )
        .to_string(),
    );

    if penalties.p1_over_reliance != 0 {
        parts.push(format!(
            "Penalty applied: {}% of AI responses were followed by no code edits.",
            (metrics.blind_adoption_rate * 100.0).round() as i64
        ));
    }
    if penalties.p2_no_run != 0 {
        parts.push("Penalty applied: no test runs were detected during the session.".to_string());
    }
    if penalties.p3_critical_miss != 0 {
        parts.push("Penalty applied: a core requirement is not working.".to_string());
    }

    parts.join(" ")
}

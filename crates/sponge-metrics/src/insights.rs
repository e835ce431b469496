use sponge_core::model::{
    HeadlineMetrics, Insight, InsightKind, PenaltyDetail, RubricBreakdown, RubricCategory,
    TestSuiteResult,
};

pub const MAX_INSIGHTS: usize = 6;

/// Everything the coaching notes are derived from.
pub struct InsightInputs<'a> {
    pub prompt_count: usize,
    pub total: u32,
    pub metrics: &'a HeadlineMetrics,
    pub rubric: &'a RubricBreakdown,
    pub penalties: &'a PenaltyDetail,
    pub tests: Option<&'a TestSuiteResult>,
}

fn insight(
    category: RubricCategory,
    kind: InsightKind,
    title: &str,
    description: impl Into<String>,
) -> Insight {
    Insight {
        category,
        kind,
        title: title.to_string(),
        description: description.into(),
    }
}

fn pct(rate: f64) -> i64 {
    (rate * 100.0).round() as i64
}

/// Deterministic coaching notes. The list always holds an improvement, a
/// strength when anything was scored, and a weakness when the total is
/// below 30.
pub fn generate(input: &InsightInputs<'_>) -> Vec<Insight> {
    use InsightKind::*;
    use RubricCategory::*;

    let m = input.metrics;
    let mut out = Vec::new();

    if input.prompt_count == 0 {
        out.push(insight(
            Communication,
            Weakness,
            "Session incomplete",
            "No prompts were sent to the AI during this session. Use the assistant to explore the codebase and talk through your approach.",
        ));
        out.push(insight(
            ProblemSolving,
            Weakness,
            "No code changes detected",
            "The session ended without meaningful changes. Start by reading the code and asking the AI about the structure of the problem.",
        ));
        if let Some(t) = input.tests.filter(|t| t.pass_rate.unwrap_or(0.0) > 0.0) {
            out.push(insight(
                Verification,
                Improvement,
                "Some tests passing",
                format!(
                    "{}/{} tests passed on the base code. Editing and re-running the tests can raise that.",
                    t.passed, t.total
                ),
            ));
        }
    } else {
        if m.grounded_prompt_rate >= 0.5 {
            out.push(insight(
                Communication,
                Strength,
                "Grounded prompts",
                format!(
                    "{}% of your prompts named specific files or functions, which lets the AI answer precisely.",
                    pct(m.grounded_prompt_rate)
                ),
            ));
        }
        if m.ai_modification_rate >= 0.6 {
            out.push(insight(
                CodeQuality,
                Strength,
                "Active code ownership",
                format!(
                    "You edited code after {}% of AI responses instead of accepting them as-is.",
                    pct(m.ai_modification_rate)
                ),
            ));
        }
        if m.test_after_ai_rate >= 0.4 {
            out.push(insight(
                Verification,
                Strength,
                "Testing after AI suggestions",
                format!(
                    "You ran tests after {}% of AI interactions.",
                    pct(m.test_after_ai_rate)
                ),
            ));
        }
        if input.rubric.problem_solving >= 8.0 {
            out.push(insight(
                ProblemSolving,
                Strength,
                "Strong problem analysis",
                "You explored the codebase and framed clear questions before starting to implement.",
            ));
        }

        if m.blind_adoption_rate > 0.7 {
            out.push(insight(
                CodeQuality,
                Weakness,
                "Accepting AI output uncritically",
                format!(
                    "{}% of AI suggestions were applied with no edits. Review and adapt generated code to match your understanding.",
                    pct(m.blind_adoption_rate)
                ),
            ));
        }
        if m.grounded_prompt_rate < 0.15 && input.prompt_count > 2 {
            out.push(insight(
                Communication,
                Weakness,
                "Prompts lack code context",
                "Almost none of your prompts referenced specific files or functions.",
            ));
        }
        if input.rubric.verification < 3.6 {
            out.push(insight(
                Verification,
                Weakness,
                "Minimal testing effort",
                "Your verification score is very low. Run the tests after each change and check AI suggestions against them.",
            ));
        }

        if m.blind_adoption_rate > 0.5 && m.blind_adoption_rate <= 0.7 {
            out.push(insight(
                CodeQuality,
                Improvement,
                "Review AI output before applying",
                format!(
                    "{}% of AI suggestions were used without edits. Try adapting each one to fit your understanding.",
                    pct(m.blind_adoption_rate)
                ),
            ));
        }
        if m.test_after_ai_rate < 0.2 {
            out.push(insight(
                Verification,
                Improvement,
                "Run tests more frequently",
                "Running the tests after each AI suggestion catches problems early.",
            ));
        }
        if m.grounded_prompt_rate < 0.3 {
            out.push(insight(
                Communication,
                Improvement,
                "Reference specific code in prompts",
                "Mention file names, function names or line numbers so the AI can give precise answers.",
            ));
        }
        if input.penalties.p2_no_run != 0 {
            out.push(insight(
                Verification,
                Improvement,
                "Run the test suite",
                "No test runs were detected. Running the tests validates your changes and weighs heavily in scoring.",
            ));
        }
        if m.passive_reprompt_rate > 0.3 {
            out.push(insight(
                Communication,
                Improvement,
                "Vary your follow-up prompts",
                format!(
                    "{}% of consecutive prompts were nearly identical. Build on the previous answer instead of re-asking.",
                    pct(m.passive_reprompt_rate)
                ),
            ));
        }
    }

    if input.total > 0 && !out.iter().any(|i| i.kind == Strength) {
        out.insert(
            0,
            insight(
                ProblemSolving,
                Strength,
                "You gave it a shot",
                format!(
                    "You engaged with the exercise and scored {}/100.",
                    input.total
                ),
            ),
        );
    }
    if !out.iter().any(|i| i.kind == Improvement) {
        out.push(insight(
            Communication,
            Improvement,
            "Keep iterating",
            "Build longer back-and-forth conversations with the AI: challenge its suggestions and refine your approach.",
        ));
    }
    if input.total < 30 && !out.iter().any(|i| i.kind == Weakness) {
        out.push(insight(
            ProblemSolving,
            Weakness,
            "Score below expectations",
            format!(
                "A total of {}/100 leaves a lot of room. Break the problem into smaller steps and verify each one.",
                input.total
            ),
        ));
    }

    out.truncate(MAX_INSIGHTS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs<'a>(
        prompt_count: usize,
        total: u32,
        metrics: &'a HeadlineMetrics,
        rubric: &'a RubricBreakdown,
        penalties: &'a PenaltyDetail,
    ) -> InsightInputs<'a> {
        InsightInputs {
            prompt_count,
            total,
            metrics,
            rubric,
            penalties,
            tests: None,
        }
    }

    fn titles(list: &[Insight]) -> Vec<&str> {
        list.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_empty_session_notes() {
        let m = HeadlineMetrics::default();
        let r = RubricBreakdown::default();
        let p = PenaltyDetail::default();
        let out = generate(&inputs(0, 0, &m, &r, &p));
        assert_eq!(
            titles(&out),
            vec!["Session incomplete", "No code changes detected", "Keep iterating"]
        );
    }

    #[test]
    fn test_strong_session_notes() {
        let m = HeadlineMetrics {
            grounded_prompt_rate: 0.8,
            ai_modification_rate: 0.9,
            test_after_ai_rate: 0.5,
            ..HeadlineMetrics::default()
        };
        let r = RubricBreakdown {
            problem_solving: 20.0,
            code_quality: 20.0,
            verification: 20.0,
            communication: 20.0,
        };
        let p = PenaltyDetail::default();
        let out = generate(&inputs(6, 80, &m, &r, &p));
        assert_eq!(
            titles(&out),
            vec![
                "Grounded prompts",
                "Active code ownership",
                "Testing after AI suggestions",
                "Strong problem analysis",
                "Keep iterating",
            ]
        );
        assert_eq!(out[0].description, "80% of your prompts named specific files or functions, which lets the AI answer precisely.");
    }

    #[test]
    fn test_weak_session_gets_every_kind_and_is_capped() {
        let m = HeadlineMetrics {
            blind_adoption_rate: 0.9,
            passive_reprompt_rate: 0.5,
            ..HeadlineMetrics::default()
        };
        let r = RubricBreakdown::default();
        let p = PenaltyDetail {
            p1_over_reliance: -15,
            p2_no_run: -10,
            p3_critical_miss: 0,
        };
        let out = generate(&inputs(5, 12, &m, &r, &p));
        assert_eq!(out.len(), MAX_INSIGHTS);
        assert_eq!(out[0].title, "You gave it a shot");
        assert!(out.iter().any(|i| i.kind == InsightKind::Weakness));
        assert!(out.iter().any(|i| i.kind == InsightKind::Improvement));
    }
}

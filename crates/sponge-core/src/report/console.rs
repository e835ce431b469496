use crate::model::{Score, SubCriteria, TestSuiteResult};

pub fn print_test_summary(result: &TestSuiteResult) {
    eprintln!("\nRan {} tests", result.total);
    for r in &result.results {
        let icon = if r.passed { "✅" } else { "❌" };
        let core = if r.is_core { " [core]" } else { "" };
        eprintln!("{} {}{}", icon, r.name, core);
        if let Some(err) = r.error.as_deref().filter(|_| !r.passed) {
            eprintln!("    {}", first_line(err));
        }
    }
    let rate = result
        .pass_rate
        .map(|p| format!("{:.0}%", p * 100.0))
        .unwrap_or_else(|| "n/a".into());
    eprintln!(
        "\nSummary: {} passed, {} failed ({})",
        result.passed, result.failed, rate
    );
    if !result.core_failures.is_empty() {
        eprintln!("Core failures: {}", result.core_failures.join(", "));
    }
}

pub fn print_score_summary(score: &Score) {
    let rb = &score.rubric_breakdown;
    eprintln!("\nScore: {}/100  [{}]", score.total_score, score.badge);
    eprintln!("  Problem Solving  {:>5.1} / 25", rb.problem_solving);
    eprintln!("  Code Quality     {:>5.1} / 25", rb.code_quality);
    eprintln!("  Verification     {:>5.1} / 25", rb.verification);
    eprintln!("  Communication    {:>5.1} / 25", rb.communication);

    let pd = &score.penalty_detail;
    if pd.sum() != 0 {
        eprintln!(
            "  Penalties        P1 {} / P2 {} / P3 {}",
            pd.p1_over_reliance, pd.p2_no_run, pd.p3_critical_miss
        );
    }

    eprintln!("\nSub-criteria:");
    for ((name, max), value) in SubCriteria::MAXIMA
        .iter()
        .zip(score.sub_criteria.values().iter())
    {
        eprintln!("  {:<22} {:>4.1} / {}", name, value, max);
    }

    if !score.interpretation.is_empty() {
        eprintln!("\n{}", score.interpretation);
    }
    for insight in &score.insights {
        eprintln!("  - {}: {}", insight.title, insight.description);
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

use crate::signals::{blend, SessionView};
use sponge_core::model::{clamp, round1, CodeEval, ConvEval, TestSuiteResult};

const DEFAULT_CLARITY: f64 = 4.0;
const DEFAULT_CORRECTNESS: f64 = 3.5;
const DEFAULT_EFFICIENCY: f64 = 2.5;

/// Highest correctness the measured pass rate allows. No test run, no gate.
pub fn correctness_cap(tests: Option<&TestSuiteResult>) -> f64 {
    let Some(rate) = tests.map(|t| t.pass_rate.unwrap_or(0.0)) else {
        return 7.0;
    };
    if rate >= 1.0 {
        7.0
    } else if rate >= 0.8 {
        5.0
    } else if rate >= 0.5 {
        3.0
    } else {
        1.0
    }
}

/// B1..B4: clarity, correctness, efficiency, ownership.
pub fn score(
    view: &SessionView<'_>,
    conv: Option<&ConvEval>,
    code: Option<&CodeEval>,
    tests: Option<&TestSuiteResult>,
) -> [f64; 4] {
    let clarity = code.map_or(DEFAULT_CLARITY, |c| clamp(c.b1_clarity, 0.0, 8.0));

    let semantic = code.map_or(DEFAULT_CORRECTNESS, |c| clamp(c.b2_correctness, 0.0, 7.0));
    let correctness = correctness_cap(tests).min(semantic);

    let efficiency = match (conv, code) {
        (Some(cv), Some(cd)) => clamp(
            round1(0.4 * cv.b3_efficiency_discussion + 0.6 * cd.b3_efficiency_code),
            0.0,
            5.0,
        ),
        (None, Some(cd)) => clamp(cd.b3_efficiency_code, 0.0, 5.0),
        (Some(cv), None) => clamp(cv.b3_efficiency_discussion, 0.0, 5.0),
        (None, None) => DEFAULT_EFFICIENCY,
    };

    let ownership = blend(
        ownership_metric(view),
        conv.map(|c| c.b4_ownership_dialogue),
        (0.4, 0.6),
        0.0,
        5.0,
    );

    [clarity, correctness, efficiency, ownership].map(round1)
}

fn ownership_metric(view: &SessionView<'_>) -> f64 {
    if view.prompt_events.is_empty() {
        return 0.0;
    }
    let rate = view.windows_containing(&view.edits) as f64 / view.prompt_events.len() as f64;
    let mut metric = if rate >= 0.75 {
        3.0
    } else if rate >= 0.5 {
        2.0
    } else if rate >= 0.25 {
        1.0
    } else {
        0.0
    };

    if view.apply_without_edit_rate().is_some_and(|r| r < 0.3) {
        metric += 1.0;
    }

    metric += match view.evidence_followup_rate() {
        Some(f) if f >= 0.5 => 1.5,
        Some(f) if f >= 0.25 => 1.0,
        Some(f) if f > 0.0 => 0.5,
        _ => 0.0,
    };
    metric
}

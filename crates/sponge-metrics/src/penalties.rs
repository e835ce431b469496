use sponge_core::model::{CodeEval, ConvEval, HeadlineMetrics, PenaltyDetail, TestSuiteResult};

pub const OVER_RELIANCE_STEP: i32 = 5;
pub const NO_RUN: i32 = -10;
pub const CRITICAL_MISS: i32 = -10;

pub fn compute(
    metrics: &HeadlineMetrics,
    test_runs: usize,
    conv: Option<&ConvEval>,
    code: Option<&CodeEval>,
    tests: Option<&TestSuiteResult>,
) -> PenaltyDetail {
    PenaltyDetail {
        p1_over_reliance: over_reliance(metrics.blind_adoption_rate, conv),
        p2_no_run: if test_runs == 0 { NO_RUN } else { 0 },
        p3_critical_miss: critical_miss(code, tests),
    }
}

/// Tiered on blind adoption; an ownership-heavy conversation buys back one tier.
fn over_reliance(blind_rate: f64, conv: Option<&ConvEval>) -> i32 {
    let mut p = if blind_rate > 0.8 {
        -15
    } else if blind_rate > 0.6 {
        -10
    } else if blind_rate > 0.4 {
        -5
    } else {
        0
    };
    if p < 0 && conv.is_some_and(|c| c.b4_ownership_dialogue >= 3.0) {
        p = (p + OVER_RELIANCE_STEP).min(0);
    }
    p
}

/// Measured core failures decide when tests ran; the code evaluator's flag is
/// consulted only without a test result.
fn critical_miss(code: Option<&CodeEval>, tests: Option<&TestSuiteResult>) -> i32 {
    let missed = match tests {
        Some(t) => !t.core_failures.is_empty(),
        None => code.is_some_and(|c| c.p3_critical_miss),
    };
    if missed {
        CRITICAL_MISS
    } else {
        0
    }
}

use crate::config::TestSpec;
use crate::model::{round2, TestResult, TestSuiteResult};
use std::collections::HashMap;

pub const NOT_FOUND_MESSAGE: &str = "Test not found in output";

/// Outcome of one test case as read from the runner's artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutcome {
    pub passed: bool,
    pub message: Option<String>,
}

impl RawOutcome {
    pub fn passed() -> Self {
        Self {
            passed: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: Some(message.into()),
        }
    }
}

/// Maps raw outcomes onto the canonical expected list. Canonical names missing
/// from `raw` are recorded as failures; names outside the list are ignored.
/// Returns `None` when the canonical list is empty.
pub fn normalize(raw: &HashMap<String, RawOutcome>, expected: &[TestSpec]) -> Option<TestSuiteResult> {
    if expected.is_empty() {
        return None;
    }

    let mut results = Vec::with_capacity(expected.len());
    let mut core_failures = Vec::new();

    for spec in expected {
        let result = match raw.get(&spec.name) {
            Some(outcome) => TestResult {
                name: spec.name.clone(),
                passed: outcome.passed,
                error: if outcome.passed {
                    None
                } else {
                    outcome.message.clone()
                },
                is_core: spec.core,
            },
            None => TestResult {
                name: spec.name.clone(),
                passed: false,
                error: Some(NOT_FOUND_MESSAGE.to_string()),
                is_core: spec.core,
            },
        };
        if result.is_core && !result.passed {
            core_failures.push(result.name.clone());
        }
        results.push(result);
    }

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();

    Some(TestSuiteResult {
        total,
        passed,
        failed: total - passed,
        pass_rate: Some(round2(passed as f64 / total as f64)),
        results,
        core_failures,
    })
}

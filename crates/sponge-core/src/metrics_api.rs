use crate::model::{CodeEval, ConvEval, Score, Session, TestSuiteResult};

/// Folds a session and its optional evaluator outputs into a bounded score.
///
/// Implementations must be total: every combination of absent inputs yields a
/// fully populated `Score`, and identical inputs yield identical scores.
pub trait Aggregator: Send + Sync {
    fn name(&self) -> &'static str;

    fn aggregate(
        &self,
        session: &Session,
        conv: Option<&ConvEval>,
        code: Option<&CodeEval>,
        tests: Option<&TestSuiteResult>,
    ) -> Score;
}

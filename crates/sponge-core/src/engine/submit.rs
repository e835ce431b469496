use crate::config::SpongeConfig;
use crate::evaluators::{CodeAnalyzer, ConversationEvaluator};
use crate::metrics_api::Aggregator;
use crate::model::{Score, Session, TestSuiteResult};
use crate::overlay::Overlay;
use crate::sandbox::TestExecutor;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

/// Extra time the orchestrator grants the sandbox beyond its own subprocess
/// timeout, covering the reference copy and artifact parsing.
const SANDBOX_GRACE: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub conversation: Duration,
    pub code: Duration,
    pub sandbox: Duration,
}

impl Timeouts {
    pub fn from_config(cfg: &SpongeConfig) -> Self {
        let eval = Duration::from_secs(cfg.evaluators.timeout_secs);
        Self {
            conversation: eval,
            code: eval,
            sandbox: Duration::from_secs(cfg.sandbox.timeout_secs) + SANDBOX_GRACE,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::from_config(&SpongeConfig::default())
    }
}

/// Owns a submission: fans out the three evaluator calls, waits for all of
/// them to settle, then aggregates.
pub struct SubmitService {
    pub conversation: Arc<dyn ConversationEvaluator>,
    pub code: Arc<dyn CodeAnalyzer>,
    pub executor: Arc<dyn TestExecutor>,
    pub aggregator: Arc<dyn Aggregator>,
    pub timeouts: Timeouts,
}

impl SubmitService {
    /// Scores the session once. A session that already carries a score gets
    /// it back unchanged and no evaluator is invoked.
    pub async fn submit(
        &self,
        session: &mut Session,
        final_code: &str,
        username: Option<&str>,
    ) -> Score {
        if let Some(score) = &session.score {
            tracing::info!(
                event = "sponge.submit.cached",
                session = %session.id,
                total = score.total_score,
            );
            return score.clone();
        }

        session.final_code = Some(final_code.to_string());
        session.completed_at = Some(chrono::Utc::now());
        if let Some(name) = username {
            session.username = Some(name.to_string());
        }

        let overlay = Overlay::parse(final_code);
        if overlay.is_empty() {
            tracing::warn!(
                event = "sponge.submit.empty_overlay",
                session = %session.id,
                "no files in final code, scoring without test results"
            );
        }

        let conv_task = {
            let ev = self.conversation.clone();
            let turns = session.conversation.clone();
            tokio::spawn(async move { ev.evaluate_conversation(&turns).await })
        };
        let code_task = {
            let an = self.code.clone();
            let blob = final_code.to_string();
            tokio::spawn(async move { an.analyze_code(&blob).await })
        };
        let test_task = {
            let ex = self.executor.clone();
            tokio::spawn(async move { ex.run(&overlay, true).await })
        };

        let (conv, code, tests) = tokio::join!(
            settle("conversation", conv_task, self.timeouts.conversation),
            settle("code", code_task, self.timeouts.code),
            settle("sandbox", test_task, self.timeouts.sandbox),
        );

        let score = self
            .aggregator
            .aggregate(session, conv.as_ref(), code.as_ref(), tests.as_ref());

        tracing::info!(
            event = "sponge.submit.scored",
            session = %session.id,
            aggregator = self.aggregator.name(),
            total = score.total_score,
            badge = %score.badge,
            conversation_eval = conv.is_some(),
            code_eval = code.is_some(),
            test_results = tests.is_some(),
        );

        session.score = Some(score.clone());
        score
    }

    /// Interactive run against the visible suite only. Never scores.
    pub async fn run_tests(&self, blob: &str) -> Option<TestSuiteResult> {
        let overlay = Overlay::parse(blob);
        if overlay.is_empty() {
            tracing::info!(event = "sponge.run_tests.empty_overlay");
            return None;
        }
        match timeout(self.timeouts.sandbox, self.executor.run(&overlay, false)).await {
            Ok(res) => res,
            Err(_) => {
                tracing::warn!(
                    event = "sponge.run_tests.timeout",
                    limit_secs = self.timeouts.sandbox.as_secs(),
                );
                None
            }
        }
    }
}

/// Waits for one evaluator task. Timeouts and panics both become `None`;
/// a timed-out task is aborted.
async fn settle<T>(label: &'static str, mut handle: JoinHandle<Option<T>>, limit: Duration) -> Option<T> {
    match timeout(limit, &mut handle).await {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            tracing::warn!(
                event = "sponge.submit.evaluator_failed",
                evaluator = label,
                error = %e,
            );
            None
        }
        Err(_) => {
            handle.abort();
            tracing::warn!(
                event = "sponge.submit.evaluator_timeout",
                evaluator = label,
                limit_ms = limit.as_millis() as u64,
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_settle_converts_panic_to_none() {
        let h: JoinHandle<Option<u8>> = tokio::spawn(async { panic!("boom") });
        assert_eq!(settle("t", h, Duration::from_secs(1)).await, None);
    }

    #[tokio::test]
    async fn test_settle_times_out() {
        let h = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Some(1u8)
        });
        assert_eq!(settle("t", h, Duration::from_millis(20)).await, None);
    }

    #[tokio::test]
    async fn test_settle_passes_value() {
        let h = tokio::spawn(async { Some(7u8) });
        assert_eq!(settle("t", h, Duration::from_secs(1)).await, Some(7));
    }
}

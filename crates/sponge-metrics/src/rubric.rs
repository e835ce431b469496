use crate::insights::{self, InsightInputs};
use crate::signals::SessionView;
use crate::vocabulary::Matcher;
use crate::{badge, code_quality, communication, headline, interpretation, penalties};
use crate::{problem_solving, verification};
use sponge_core::config::Vocabulary;
use sponge_core::fingerprint::compute_inputs_digest;
use sponge_core::metrics_api::Aggregator;
use sponge_core::model::{
    clamp, round1, CodeEval, ConvEval, RubricBreakdown, Score, Session, SubCriteria,
    TestSuiteResult,
};

pub const CATEGORY_MAX: f64 = 25.0;

/// Four-category, sixteen-criterion rubric with three penalties.
pub struct RubricAggregator {
    vocab: Matcher,
}

impl RubricAggregator {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        Self {
            vocab: Matcher::new(vocabulary),
        }
    }
}

impl Default for RubricAggregator {
    fn default() -> Self {
        Self::new(&Vocabulary::default())
    }
}

fn category(parts: &[f64; 4]) -> f64 {
    clamp(round1(parts.iter().sum()), 0.0, CATEGORY_MAX)
}

impl Aggregator for RubricAggregator {
    fn name(&self) -> &'static str {
        "rubric_v2"
    }

    fn aggregate(
        &self,
        session: &Session,
        conv: Option<&ConvEval>,
        code: Option<&CodeEval>,
        tests: Option<&TestSuiteResult>,
    ) -> Score {
        let view = SessionView::new(session);
        let metrics = headline::compute(&view, &self.vocab, tests);

        let a = problem_solving::score(&view, &self.vocab, conv);
        let b = code_quality::score(&view, conv, code, tests);
        let c = verification::score(&view, conv);
        let d = communication::score(&view, &self.vocab, conv);
        let penalty = penalties::compute(&metrics, view.test_runs.len(), conv, code, tests);

        let rubric = RubricBreakdown {
            problem_solving: category(&a),
            code_quality: category(&b),
            verification: category(&c),
            communication: category(&d),
        };
        let raw = rubric.sum() + penalty.sum() as f64;
        let total = clamp(raw.round(), 0.0, 100.0) as u32;

        let interpretation = match conv.map(|c| c.interpretation.trim()) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => interpretation::build(&rubric, &metrics, &penalty),
        };

        let insights = insights::generate(&InsightInputs {
            prompt_count: view.prompts.len(),
            total,
            metrics: &metrics,
            rubric: &rubric,
            penalties: &penalty,
            tests,
        });

        tracing::debug!(
            total,
            problem_solving = rubric.problem_solving,
            code_quality = rubric.code_quality,
            verification = rubric.verification,
            communication = rubric.communication,
            penalties = penalty.sum(),
            "score aggregated"
        );

        Score {
            total_score: total,
            badge: badge::assign(total),
            rubric_breakdown: rubric,
            sub_criteria: SubCriteria {
                a1_understanding: a[0],
                a2_decomposition: a[1],
                a3_justification: a[2],
                a4_edge_cases: a[3],
                b1_clarity: b[0],
                b2_correctness: b[1],
                b3_efficiency: b[2],
                b4_ownership: b[3],
                c1_exec_frequency: c[0],
                c2_test_coverage: c[1],
                c3_ai_validation: c[2],
                c4_debug_discipline: c[3],
                d1_narration: d[0],
                d2_tradeoffs: d[1],
                d3_ai_balance: d[2],
                d4_status_summaries: d[3],
            },
            penalty_detail: penalty,
            headline_metrics: metrics,
            interpretation,
            insights,
            test_suite: tests.cloned(),
            inputs_digest: compute_inputs_digest(session, conv, code, tests),
        }
    }
}

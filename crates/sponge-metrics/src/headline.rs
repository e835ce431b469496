use crate::signals::SessionView;
use crate::vocabulary::Matcher;
use sponge_core::model::{round2, HeadlineMetrics, TestSuiteResult};

/// Behavioral rates derived from the event log and the conversation, each
/// rounded to two decimals.
pub fn compute(view: &SessionView<'_>, vocab: &Matcher, tests: Option<&TestSuiteResult>) -> HeadlineMetrics {
    let turns = view.prompts.len().min(view.responses.len());

    let (blind, modified, test_after) = if turns == 0 {
        (0.0, 0.0, 0.0)
    } else {
        let n = view.prompt_events.len().max(1) as f64;
        let with_edit = view.windows_containing(&view.edits);
        let without_edit = view.prompt_events.len() - with_edit;
        let with_test = view.windows_containing(&view.test_runs);
        (
            round2(without_edit as f64 / n),
            round2(with_edit as f64 / n),
            round2(with_test as f64 / n),
        )
    };

    let grounded = if view.prompts.is_empty() {
        0.0
    } else {
        let hits = view.prompts.iter().filter(|p| vocab.is_grounded(p)).count();
        round2(hits as f64 / view.prompts.len() as f64)
    };

    HeadlineMetrics {
        blind_adoption_rate: blind,
        ai_modification_rate: modified,
        test_after_ai_rate: test_after,
        passive_reprompt_rate: view.passive_reprompt_rate().map(round2).unwrap_or(0.0),
        grounded_prompt_rate: grounded,
        evidence_grounded_followup_rate: view.evidence_followup_rate().map(round2).unwrap_or(0.0),
        ai_apply_without_edit_rate: view.apply_without_edit_rate().map(round2).unwrap_or(0.0),
        test_pass_rate: tests.and_then(|t| t.pass_rate),
    }
}

use crate::signals::{blend, SessionView};
use sponge_core::model::{round1, ConvEval, EventKind};

/// C1..C4: execution frequency, test coverage, AI validation, debug discipline.
pub fn score(view: &SessionView<'_>, conv: Option<&ConvEval>) -> [f64; 4] {
    let runs = view.test_runs.len();

    let frequency = match runs {
        n if n >= 4 => 8.0,
        n if n >= 2 => 6.0,
        1 => 3.0,
        _ => 0.0,
    };

    let ran = if runs >= 1 { 3.0 } else { 0.0 };
    let coverage = blend(ran, conv.map(|c| c.c2_test_mentions), (0.3, 0.7), ran, 9.0);

    let validation = blend(
        validation_metric(view),
        conv.map(|c| c.c3_ai_questioning),
        (0.5, 0.5),
        0.0,
        4.0,
    );

    [frequency, coverage, validation, debug_discipline(view)].map(round1)
}

fn validation_metric(view: &SessionView<'_>) -> f64 {
    let mut metric = 0.0;
    if !view.prompt_events.is_empty() && !view.test_runs.is_empty() {
        let rate =
            view.windows_containing(&view.test_runs) as f64 / view.prompt_events.len() as f64;
        if rate >= 0.5 {
            metric = 2.0;
        } else if rate >= 0.25 {
            metric = 1.0;
        }
    }
    if !view.edits.is_empty() && view.apply_without_edit_rate().is_some_and(|r| r < 0.3) {
        metric += 1.0;
    }
    metric
}

/// Looks at the first test run only: an edit and a re-run after it earn full
/// marks, an edit alone half.
fn debug_discipline(view: &SessionView<'_>) -> f64 {
    let Some(idx) = view
        .timeline
        .iter()
        .position(|e| e.kind == EventKind::TestRun)
    else {
        return 0.0;
    };
    let rest = &view.timeline[idx + 1..];
    let edited = rest.iter().any(|e| e.kind == EventKind::FileEdit);
    let reran = rest.iter().any(|e| e.kind == EventKind::TestRun);
    match (edited, reran) {
        (true, true) => 4.0,
        (true, false) => 2.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sponge_core::model::Session;

    fn session() -> Session {
        let start = chrono::Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Session::new("s", start)
    }

    #[test]
    fn test_no_runs_scores_zero() {
        let s = session();
        assert_eq!(score(&SessionView::new(&s), None), [0.0; 4]);
    }

    #[test]
    fn test_coverage_floor_holds_against_low_semantic() {
        let mut s = session();
        s.record_event(EventKind::TestRun, None, 10);
        let conv = ConvEval::default();
        let [c1, c2, _, _] = score(&SessionView::new(&s), Some(&conv));
        assert_eq!(c1, 3.0);
        assert_eq!(c2, 3.0);

        let conv = ConvEval {
            c2_test_mentions: 9.0,
            ..ConvEval::default()
        };
        let [_, c2, _, _] = score(&SessionView::new(&s), Some(&conv));
        assert_eq!(c2, 7.2);
    }

    #[test]
    fn test_debug_discipline_ladder() {
        let mut s = session();
        s.record_event(EventKind::TestRun, None, 10);
        s.record_event(EventKind::FileEdit, Some("a"), 20);
        assert_eq!(score(&SessionView::new(&s), None)[3], 2.0);
        s.record_event(EventKind::TestRun, None, 30);
        assert_eq!(score(&SessionView::new(&s), None)[3], 4.0);
    }

    #[test]
    fn test_validation_counts_windows_with_runs() {
        let mut s = session();
        s.record_event(EventKind::PromptSent, None, 100);
        s.record_event(EventKind::TestRun, None, 150);
        s.record_event(EventKind::PromptSent, None, 200);
        s.record_event(EventKind::AiApply, None, 210);
        s.record_event(EventKind::FileEdit, Some("a"), 220);
        // half the windows ran tests, every apply was edited
        assert_eq!(score(&SessionView::new(&s), None)[2], 3.0);
    }
}

use crate::signals::{blend, word_count, SessionView};
use crate::vocabulary::Matcher;
use sponge_core::model::{clamp, round1, ConvEval};

/// A1..A4: understanding, decomposition, justification, edge cases.
pub fn score(view: &SessionView<'_>, vocab: &Matcher, conv: Option<&ConvEval>) -> [f64; 4] {
    [
        understanding(view, vocab, conv),
        decomposition(view, conv),
        justification(view, conv),
        edge_cases(view, vocab, conv),
    ]
    .map(round1)
}

fn understanding(view: &SessionView<'_>, vocab: &Matcher, conv: Option<&ConvEval>) -> f64 {
    let mut metric = 0.0;
    let mut floor = 0.0;
    let mut ceiling = 6.0;
    if let Some(first) = view.prompts.first() {
        let words = word_count(first);
        metric = match words {
            w if w >= 50 => 4.0,
            w if w >= 20 => 3.0,
            w if w >= 8 => 2.0,
            _ => 0.0,
        };
        if words >= 20 && vocab.is_grounded(first) {
            floor = 2.0;
        }
        if words < 8 {
            ceiling = 2.0;
        }
    }
    blend(metric, conv.map(|c| c.a1_understanding), (0.4, 0.6), floor, ceiling)
}

fn decomposition(view: &SessionView<'_>, conv: Option<&ConvEval>) -> f64 {
    let mut metric = 0.0;
    let mut floor = 0.0;
    if let Some(first) = view.prompt_events.first() {
        let files_before = view.opens.iter().filter(|e| e.ts < first.ts).count();
        let minutes = (first.ts - view.start_ms) as f64 / 60_000.0;

        if files_before >= 3 {
            metric += 3.0;
        } else if files_before >= 1 {
            metric += 2.0;
        }
        if (2.0..=20.0).contains(&minutes) {
            metric += 2.0;
        } else if minutes > 0.0 {
            metric += 1.0;
        }

        if files_before >= 3 && minutes >= 2.0 {
            floor = 3.0;
        } else if files_before >= 1 && minutes >= 1.0 {
            floor = 2.0;
        }
    }
    blend(metric, conv.map(|c| c.a2_decomposition), (0.3, 0.7), floor, 7.0)
}

fn justification(view: &SessionView<'_>, conv: Option<&ConvEval>) -> f64 {
    if let Some(c) = conv {
        return clamp(c.a3_justification, 0.0, 7.0);
    }
    // Dialogue depth stands in for reasoning quality.
    match view.prompts.len() {
        n if n >= 7 => 3.0,
        n if n >= 4 => 2.0,
        n if n >= 2 => 1.0,
        _ => 0.0,
    }
}

fn edge_cases(view: &SessionView<'_>, vocab: &Matcher, conv: Option<&ConvEval>) -> f64 {
    let hits = view.prompts.iter().filter(|p| vocab.has_edge_case(p)).count();
    let metric = match hits {
        n if n >= 4 => 3.0,
        n if n >= 2 => 2.0,
        1 => 1.0,
        _ => 0.0,
    };
    blend(metric, conv.map(|c| c.a4_edge_cases), (0.5, 0.5), 0.0, 5.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sponge_core::model::{EventKind, Role, Session};

    fn session() -> Session {
        let start = chrono::Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Session::new("s", start)
    }

    #[test]
    fn test_short_first_prompt_caps_understanding() {
        let mut s = session();
        s.record_turn(Role::User, "fix it");
        let conv = ConvEval {
            a1_understanding: 6.0,
            ..ConvEval::default()
        };
        let [a1, ..] = score(&SessionView::new(&s), &Matcher::default(), Some(&conv));
        assert_eq!(a1, 2.0);
    }

    #[test]
    fn test_grounded_long_first_prompt_sets_floor() {
        let mut s = session();
        let prompt = format!("In queue.py {}", "word ".repeat(20));
        s.record_turn(Role::User, prompt);
        let [a1, ..] = score(
            &SessionView::new(&s),
            &Matcher::default(),
            Some(&ConvEval::default()),
        );
        // 0.4 * 3 = 1.2, lifted to the floor
        assert_eq!(a1, 2.0);
    }

    #[test]
    fn test_decomposition_from_exploration() {
        let mut s = session();
        let start = s.started_at_ms();
        for (i, f) in ["rq/queue.py", "rq/job.py", "rq/worker.py"].iter().enumerate() {
            s.record_event(EventKind::FileOpen, Some(f), start + 10_000 * (i as i64 + 1));
        }
        s.record_event(EventKind::PromptSent, None, start + 5 * 60_000);
        let [_, a2, _, _] = score(&SessionView::new(&s), &Matcher::default(), None);
        assert_eq!(a2, 5.0);

        let [_, a2, _, _] = score(
            &SessionView::new(&s),
            &Matcher::default(),
            Some(&ConvEval::default()),
        );
        assert_eq!(a2, 3.0);
    }

    #[test]
    fn test_fallbacks_without_conversation_eval() {
        let mut s = session();
        for p in [
            "what if the queue is empty?",
            "and a timeout",
            "ok",
            "what about a duplicate job",
        ] {
            s.record_turn(Role::User, p);
        }
        let [_, _, a3, a4] = score(&SessionView::new(&s), &Matcher::default(), None);
        assert_eq!(a3, 2.0);
        assert_eq!(a4, 2.0);
    }
}

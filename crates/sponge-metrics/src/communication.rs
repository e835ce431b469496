use crate::signals::{blend, word_count, SessionView};
use crate::vocabulary::Matcher;
use sponge_core::model::{clamp, round1, ConvEval};

/// D1..D4: narration, tradeoffs, AI balance, status summaries. A session
/// without user prompts communicates nothing and scores zero throughout.
pub fn score(view: &SessionView<'_>, vocab: &Matcher, conv: Option<&ConvEval>) -> [f64; 4] {
    let prompts = &view.prompts;
    if prompts.is_empty() {
        return [0.0; 4];
    }
    let n = prompts.len();

    let avg_words = prompts.iter().map(|p| word_count(p)).sum::<usize>() as f64 / n as f64;
    let (metric, floor) = if avg_words >= 50.0 {
        (3.0, 2.0)
    } else if avg_words >= 25.0 {
        (2.0, 2.0)
    } else if avg_words >= 10.0 {
        (1.0, 1.0)
    } else {
        (0.0, 0.0)
    };
    let narration = blend(metric, conv.map(|c| c.d1_narration), (0.3, 0.7), floor, 8.0);

    let tradeoffs = match conv {
        Some(c) => clamp(c.d2_tradeoffs, 0.0, 7.0),
        None => match prompts.iter().filter(|p| vocab.has_tradeoff(p)).count() {
            k if k >= 3 => 3.0,
            2 => 2.0,
            1 => 1.0,
            _ => 0.0,
        },
    };

    let balance = blend(
        balance_metric(view, vocab),
        conv.map(|c| c.d3_ai_balance),
        (0.4, 0.6),
        0.0,
        5.0,
    );

    let status = match conv {
        Some(c) => clamp(c.d4_status_updates, 0.0, 5.0),
        None if n >= 5 => 2.0,
        None if n >= 3 => 1.0,
        None => 0.0,
    };

    [narration, tradeoffs, balance, status].map(round1)
}

fn balance_metric(view: &SessionView<'_>, vocab: &Matcher) -> f64 {
    let grounded = view.prompts.iter().filter(|p| vocab.is_grounded(p)).count() as f64
        / view.prompts.len() as f64;
    let mut metric = if grounded >= 0.6 {
        2.0
    } else if grounded >= 0.3 {
        1.0
    } else {
        0.0
    };
    match view.passive_reprompt_rate() {
        Some(r) if r <= 0.1 => metric += 2.0,
        Some(r) if r <= 0.3 => metric += 1.0,
        _ => {}
    }
    metric
}

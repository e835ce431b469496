use crate::vocabulary::word_overlap;
use sponge_core::model::{Event, EventKind, Session};

/// Edits within this many milliseconds after an `ai_apply` count as review.
pub const APPLY_EDIT_WINDOW_MS: i64 = 30_000;

/// Follow-up prompts echoing the previous answer above this overlap cite evidence.
pub const EVIDENCE_OVERLAP: f64 = 0.15;

/// Consecutive prompts above this overlap are a passive re-ask.
pub const PASSIVE_OVERLAP: f64 = 0.6;

/// Read-only projection of a session, with every event list stably sorted
/// by timestamp.
pub struct SessionView<'a> {
    pub prompts: Vec<&'a str>,
    pub responses: Vec<&'a str>,
    pub prompt_events: Vec<&'a Event>,
    pub edits: Vec<&'a Event>,
    pub test_runs: Vec<&'a Event>,
    pub opens: Vec<&'a Event>,
    pub applies: Vec<&'a Event>,
    pub timeline: Vec<&'a Event>,
    pub start_ms: i64,
}

impl<'a> SessionView<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            prompts: session.user_prompts(),
            responses: session.assistant_responses(),
            prompt_events: session.events_of(EventKind::PromptSent),
            edits: session.events_of(EventKind::FileEdit),
            test_runs: session.events_of(EventKind::TestRun),
            opens: session.events_of(EventKind::FileOpen),
            applies: session.events_of(EventKind::AiApply),
            timeline: session.timeline(),
            start_ms: session.started_at_ms(),
        }
    }

    /// Open interval `(start, end)` following each `prompt_sent`; the last
    /// window is unbounded.
    pub fn prompt_windows(&self) -> Vec<(i64, Option<i64>)> {
        self.prompt_events
            .iter()
            .enumerate()
            .map(|(i, p)| (p.ts, self.prompt_events.get(i + 1).map(|n| n.ts)))
            .collect()
    }

    /// Number of prompt windows containing at least one of `events`.
    pub fn windows_containing(&self, events: &[&Event]) -> usize {
        self.prompt_windows()
            .into_iter()
            .filter(|&(start, end)| events.iter().any(|e| in_window(e.ts, start, end)))
            .count()
    }

    /// Fraction of `ai_apply` events with no edit in the following 30 s.
    /// `None` when nothing was applied.
    pub fn apply_without_edit_rate(&self) -> Option<f64> {
        if self.applies.is_empty() {
            return None;
        }
        let unreviewed = self
            .applies
            .iter()
            .filter(|a| {
                !self
                    .edits
                    .iter()
                    .any(|e| e.ts > a.ts && e.ts < a.ts + APPLY_EDIT_WINDOW_MS)
            })
            .count();
        Some(unreviewed as f64 / self.applies.len() as f64)
    }

    /// Fraction of follow-up prompts that echo the preceding assistant turn.
    /// `None` without at least two prompts and one response.
    pub fn evidence_followup_rate(&self) -> Option<f64> {
        if self.prompts.len() < 2 || self.responses.is_empty() {
            return None;
        }
        let followups = &self.prompts[1..];
        let hits = followups
            .iter()
            .zip(self.responses.iter())
            .filter(|(p, r)| word_overlap(p, r) > EVIDENCE_OVERLAP)
            .count();
        Some(hits as f64 / followups.len() as f64)
    }

    /// Fraction of consecutive prompt pairs that re-ask the same thing.
    /// `None` with fewer than two prompts.
    pub fn passive_reprompt_rate(&self) -> Option<f64> {
        if self.prompts.len() < 2 {
            return None;
        }
        let similar = self
            .prompts
            .windows(2)
            .filter(|w| word_overlap(w[0], w[1]) > PASSIVE_OVERLAP)
            .count();
        Some(similar as f64 / (self.prompts.len() - 1) as f64)
    }
}

fn in_window(ts: i64, start: i64, end: Option<i64>) -> bool {
    ts > start && end.map_or(true, |end| ts < end)
}

pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// `metric*w.0 + semantic*w.1` clamped to `[floor, ceiling]`; without a
/// semantic value the metric alone is clamped.
pub fn blend(metric: f64, semantic: Option<f64>, w: (f64, f64), floor: f64, ceiling: f64) -> f64 {
    let raw = match semantic {
        Some(s) => w.0 * metric + w.1 * s,
        None => metric,
    };
    sponge_core::model::clamp(raw, floor, ceiling)
}

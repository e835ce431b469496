use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(alias = "session_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default, alias = "conversation_history")]
    pub conversation: Vec<ConversationTurn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
}

impl Session {
    pub fn new(id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            username: None,
            started_at,
            completed_at: None,
            events: Vec::new(),
            conversation: Vec::new(),
            final_code: None,
            score: None,
        }
    }

    pub fn record_event(&mut self, kind: EventKind, file: Option<&str>, ts: i64) {
        self.events.push(Event {
            session_id: self.id.clone(),
            kind,
            file: file.map(str::to_string),
            ts,
            meta: None,
        });
    }

    pub fn record_turn(&mut self, role: Role, content: impl Into<String>) {
        self.conversation.push(ConversationTurn {
            role,
            content: content.into(),
        });
    }

    pub fn started_at_ms(&self) -> i64 {
        self.started_at.timestamp_millis()
    }

    pub fn user_prompts(&self) -> Vec<&str> {
        self.turns_of(Role::User)
    }

    pub fn assistant_responses(&self) -> Vec<&str> {
        self.turns_of(Role::Assistant)
    }

    fn turns_of(&self, role: Role) -> Vec<&str> {
        self.conversation
            .iter()
            .filter(|t| t.role == role)
            .map(|t| t.content.as_str())
            .collect()
    }

    /// Events of one kind, stably ordered by timestamp.
    pub fn events_of(&self, kind: EventKind) -> Vec<&Event> {
        let mut out: Vec<&Event> = self.events.iter().filter(|e| e.kind == kind).collect();
        out.sort_by_key(|e| e.ts);
        out
    }

    /// All events, stably ordered by timestamp.
    pub fn timeline(&self) -> Vec<&Event> {
        let mut out: Vec<&Event> = self.events.iter().collect();
        out.sort_by_key(|e| e.ts);
        out
    }

    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    FileOpen,
    FileEdit,
    PromptSent,
    TestRun,
    AiApply,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::FileOpen => "file_open",
            EventKind::FileEdit => "file_edit",
            EventKind::PromptSent => "prompt_sent",
            EventKind::TestRun => "test_run",
            EventKind::AiApply => "ai_apply",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub session_id: String,
    #[serde(rename = "event")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Unix timestamp in milliseconds.
    pub ts: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub is_core: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// `None` only when `total` is zero.
    pub pass_rate: Option<f64>,
    pub results: Vec<TestResult>,
    #[serde(default)]
    pub core_failures: Vec<String>,
}

impl TestSuiteResult {
    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.failed == 0
    }
}

/// Conversation-content evaluation. Every field carries its rubric bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConvEval {
    pub a1_understanding: f64,
    pub a2_decomposition: f64,
    pub a3_justification: f64,
    pub a4_edge_cases: f64,
    pub b3_efficiency_discussion: f64,
    pub b4_ownership_dialogue: f64,
    pub c2_test_mentions: f64,
    pub c3_ai_questioning: f64,
    pub d1_narration: f64,
    pub d2_tradeoffs: f64,
    pub d3_ai_balance: f64,
    pub d4_status_updates: f64,
    pub interpretation: String,
}

impl ConvEval {
    pub fn clamped(mut self) -> Self {
        self.a1_understanding = clamp(self.a1_understanding, 0.0, 6.0);
        self.a2_decomposition = clamp(self.a2_decomposition, 0.0, 7.0);
        self.a3_justification = clamp(self.a3_justification, 0.0, 7.0);
        self.a4_edge_cases = clamp(self.a4_edge_cases, 0.0, 5.0);
        self.b3_efficiency_discussion = clamp(self.b3_efficiency_discussion, 0.0, 5.0);
        self.b4_ownership_dialogue = clamp(self.b4_ownership_dialogue, 0.0, 5.0);
        self.c2_test_mentions = clamp(self.c2_test_mentions, 0.0, 9.0);
        self.c3_ai_questioning = clamp(self.c3_ai_questioning, 0.0, 4.0);
        self.d1_narration = clamp(self.d1_narration, 0.0, 8.0);
        self.d2_tradeoffs = clamp(self.d2_tradeoffs, 0.0, 7.0);
        self.d3_ai_balance = clamp(self.d3_ai_balance, 0.0, 5.0);
        self.d4_status_updates = clamp(self.d4_status_updates, 0.0, 5.0);
        self.interpretation = self.interpretation.trim().to_string();
        self
    }
}

/// Code-content evaluation of the final overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeEval {
    pub b1_clarity: f64,
    pub b2_correctness: f64,
    pub b3_efficiency_code: f64,
    pub p3_critical_miss: bool,
    pub p3_details: String,
    pub code_feedback: String,
}

impl Default for CodeEval {
    fn default() -> Self {
        Self {
            b1_clarity: 4.0,
            b2_correctness: 3.5,
            b3_efficiency_code: 2.5,
            p3_critical_miss: false,
            p3_details: String::new(),
            code_feedback: String::new(),
        }
    }
}

impl CodeEval {
    pub fn clamped(mut self) -> Self {
        self.b1_clarity = clamp(self.b1_clarity, 0.0, 8.0);
        self.b2_correctness = clamp(self.b2_correctness, 0.0, 7.0);
        self.b3_efficiency_code = clamp(self.b3_efficiency_code, 0.0, 5.0);
        self.p3_details = self.p3_details.trim().to_string();
        self.code_feedback = self.code_feedback.trim().to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub total_score: u32,
    pub badge: Badge,
    pub rubric_breakdown: RubricBreakdown,
    pub sub_criteria: SubCriteria,
    pub penalty_detail: PenaltyDetail,
    pub headline_metrics: HeadlineMetrics,
    pub interpretation: String,
    #[serde(default)]
    pub insights: Vec<Insight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_suite: Option<TestSuiteResult>,
    /// sha256 over the frozen scoring inputs.
    pub inputs_digest: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Badge {
    #[serde(rename = "AI Collaborator")]
    AiCollaborator,
    #[serde(rename = "On Your Way")]
    OnYourWay,
    #[serde(rename = "Needs Work")]
    NeedsWork,
    #[serde(rename = "Just Vibing")]
    JustVibing,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::AiCollaborator => "AI Collaborator",
            Badge::OnYourWay => "On Your Way",
            Badge::NeedsWork => "Needs Work",
            Badge::JustVibing => "Just Vibing",
        }
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RubricBreakdown {
    pub problem_solving: f64,
    pub code_quality: f64,
    pub verification: f64,
    pub communication: f64,
}

impl RubricBreakdown {
    pub fn sum(&self) -> f64 {
        self.problem_solving + self.code_quality + self.verification + self.communication
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SubCriteria {
    pub a1_understanding: f64,
    pub a2_decomposition: f64,
    pub a3_justification: f64,
    pub a4_edge_cases: f64,
    pub b1_clarity: f64,
    pub b2_correctness: f64,
    pub b3_efficiency: f64,
    pub b4_ownership: f64,
    pub c1_exec_frequency: f64,
    pub c2_test_coverage: f64,
    pub c3_ai_validation: f64,
    pub c4_debug_discipline: f64,
    pub d1_narration: f64,
    pub d2_tradeoffs: f64,
    pub d3_ai_balance: f64,
    pub d4_status_summaries: f64,
}

impl SubCriteria {
    /// Upper bound of every sub-criterion, in declaration order.
    pub const MAXIMA: [(&'static str, f64); 16] = [
        ("a1_understanding", 6.0),
        ("a2_decomposition", 7.0),
        ("a3_justification", 7.0),
        ("a4_edge_cases", 5.0),
        ("b1_clarity", 8.0),
        ("b2_correctness", 7.0),
        ("b3_efficiency", 5.0),
        ("b4_ownership", 5.0),
        ("c1_exec_frequency", 8.0),
        ("c2_test_coverage", 9.0),
        ("c3_ai_validation", 4.0),
        ("c4_debug_discipline", 4.0),
        ("d1_narration", 8.0),
        ("d2_tradeoffs", 7.0),
        ("d3_ai_balance", 5.0),
        ("d4_status_summaries", 5.0),
    ];

    pub fn values(&self) -> [f64; 16] {
        [
            self.a1_understanding,
            self.a2_decomposition,
            self.a3_justification,
            self.a4_edge_cases,
            self.b1_clarity,
            self.b2_correctness,
            self.b3_efficiency,
            self.b4_ownership,
            self.c1_exec_frequency,
            self.c2_test_coverage,
            self.c3_ai_validation,
            self.c4_debug_discipline,
            self.d1_narration,
            self.d2_tradeoffs,
            self.d3_ai_balance,
            self.d4_status_summaries,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PenaltyDetail {
    pub p1_over_reliance: i32,
    pub p2_no_run: i32,
    pub p3_critical_miss: i32,
}

impl PenaltyDetail {
    pub fn sum(&self) -> i32 {
        self.p1_over_reliance + self.p2_no_run + self.p3_critical_miss
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadlineMetrics {
    pub blind_adoption_rate: f64,
    pub ai_modification_rate: f64,
    pub test_after_ai_rate: f64,
    pub passive_reprompt_rate: f64,
    pub grounded_prompt_rate: f64,
    pub evidence_grounded_followup_rate: f64,
    pub ai_apply_without_edit_rate: f64,
    /// `None` when no test results were available.
    pub test_pass_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RubricCategory {
    #[serde(rename = "Problem Solving")]
    ProblemSolving,
    #[serde(rename = "Code Quality")]
    CodeQuality,
    #[serde(rename = "Verification")]
    Verification,
    #[serde(rename = "Communication")]
    Communication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Strength,
    Improvement,
    Weakness,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub category: RubricCategory,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
}

pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        return lo;
    }
    value.max(lo).min(hi)
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let ev: Event = serde_json::from_str(
            r#"{"session_id":"s1","event":"prompt_sent","ts":1735689900000}"#,
        )
        .unwrap();
        assert_eq!(ev.kind, EventKind::PromptSent);
        assert!(ev.file.is_none());

        let back = serde_json::to_value(&ev).unwrap();
        assert_eq!(back["event"], "prompt_sent");
    }

    #[test]
    fn test_conv_eval_clamps_each_field() {
        let eval = ConvEval {
            a1_understanding: 99.0,
            c2_test_mentions: -3.0,
            d4_status_updates: f64::NAN,
            ..Default::default()
        }
        .clamped();
        assert_eq!(eval.a1_understanding, 6.0);
        assert_eq!(eval.c2_test_mentions, 0.0);
        assert_eq!(eval.d4_status_updates, 0.0);
    }

    #[test]
    fn test_code_eval_defaults_for_missing_fields() {
        let eval: CodeEval = serde_json::from_str(r#"{"p3_critical_miss": true}"#).unwrap();
        assert_eq!(eval.b1_clarity, 4.0);
        assert_eq!(eval.b2_correctness, 3.5);
        assert_eq!(eval.b3_efficiency_code, 2.5);
        assert!(eval.p3_critical_miss);
    }

    #[test]
    fn test_badge_serializes_as_label() {
        let v = serde_json::to_value(Badge::OnYourWay).unwrap();
        assert_eq!(v, "On Your Way");
    }

    #[test]
    fn test_session_prompt_helpers() {
        let mut s = Session::new("s1", Utc::now());
        s.record_turn(Role::User, "hi");
        s.record_turn(Role::Assistant, "hello");
        s.record_turn(Role::User, "again");
        assert_eq!(s.user_prompts(), vec!["hi", "again"]);
        assert_eq!(s.assistant_responses(), vec!["hello"]);
    }
}

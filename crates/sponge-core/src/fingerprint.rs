use crate::model::{CodeEval, ConvEval, Session, TestSuiteResult};
use sha2::{Digest, Sha256};

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

/// Digest of everything a score is computed from.
///
/// Events are canonicalized in timestamp order; evaluator outputs through
/// serde_json, whose field order follows the struct declaration.
pub fn compute_inputs_digest(
    session: &Session,
    conv: Option<&ConvEval>,
    code: Option<&CodeEval>,
    tests: Option<&TestSuiteResult>,
) -> String {
    let mut parts = Vec::new();

    parts.push(format!("session={}", session.id));
    parts.push(format!("started_at={}", session.started_at_ms()));

    for ev in session.timeline() {
        parts.push(format!(
            "event={}|{}|{}",
            ev.ts,
            ev.kind.as_str(),
            ev.file.as_deref().unwrap_or("")
        ));
    }
    for turn in &session.conversation {
        let role = match turn.role {
            crate::model::Role::User => "user",
            crate::model::Role::Assistant => "assistant",
        };
        parts.push(format!("turn={}:{}", role, sha256_hex(&turn.content)));
    }

    parts.push(format!("conv={}", canonical(conv)));
    parts.push(format!("code={}", canonical(code)));
    parts.push(format!("tests={}", canonical(tests)));

    parts.push(format!("sponge_version={}", env!("CARGO_PKG_VERSION")));

    sha256_hex(&parts.join("\n"))
}

fn canonical<T: serde::Serialize>(value: Option<&T>) -> String {
    match value {
        Some(v) => serde_json::to_string(v).unwrap_or_default(),
        None => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventKind, Role};
    use chrono::TimeZone;

    fn session() -> Session {
        let start = chrono::Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut s = Session::new("s1", start);
        s.record_event(EventKind::FileOpen, Some("rq/queue.py"), 1_000);
        s.record_turn(Role::User, "why does enqueue fail?");
        s
    }

    #[test]
    fn test_digest_is_stable() {
        let s = session();
        let a = compute_inputs_digest(&s, None, None, None);
        let b = compute_inputs_digest(&s, None, None, None);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_digest_tracks_inputs() {
        let s = session();
        let base = compute_inputs_digest(&s, None, None, None);
        let with_code = compute_inputs_digest(&s, None, Some(&CodeEval::default()), None);
        assert_ne!(base, with_code);

        let mut s2 = session();
        s2.record_event(EventKind::TestRun, None, 2_000);
        assert_ne!(base, compute_inputs_digest(&s2, None, None, None));
    }

    #[test]
    fn test_digest_ignores_event_insertion_order() {
        let start = chrono::Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut a = Session::new("s", start);
        a.record_event(EventKind::FileOpen, Some("x"), 1);
        a.record_event(EventKind::TestRun, None, 2);
        let mut b = Session::new("s", start);
        b.record_event(EventKind::TestRun, None, 2);
        b.record_event(EventKind::FileOpen, Some("x"), 1);
        assert_eq!(
            compute_inputs_digest(&a, None, None, None),
            compute_inputs_digest(&b, None, None, None)
        );
    }
}

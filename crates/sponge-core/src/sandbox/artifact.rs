use super::SandboxError;
use crate::normalize::RawOutcome;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

fn malformed(e: impl std::fmt::Display) -> SandboxError {
    SandboxError::MalformedArtifact(e.to_string())
}

fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, SandboxError> {
    match e.try_get_attribute(name).map_err(malformed)? {
        Some(a) => Ok(Some(a.unescape_value().map_err(malformed)?.into_owned())),
        None => Ok(None),
    }
}

fn record(out: &mut HashMap<String, RawOutcome>, name: String, outcome: RawOutcome) {
    // A name reported more than once passes only if every instance passed.
    out.entry(name)
        .and_modify(|prev| {
            if prev.passed && !outcome.passed {
                *prev = outcome.clone();
            }
        })
        .or_insert(outcome);
}

/// Reads per-test outcomes from a JUnit XML report.
///
/// `<failure>` and `<error>` children fail a case (failure wins when both are
/// present); `<skipped>` counts as not passed. A document without any
/// `testsuite`/`testsuites` element is malformed.
pub fn parse_junit(xml: &str) -> Result<HashMap<String, RawOutcome>, SandboxError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut out = HashMap::new();
    let mut saw_suite = false;
    let mut current: Option<(String, RawOutcome)> = None;

    loop {
        let ev = reader.read_event().map_err(malformed)?;
        let (start, is_empty) = match &ev {
            Event::Start(e) => (Some(e), false),
            Event::Empty(e) => (Some(e), true),
            Event::End(e) => {
                if e.name().as_ref() == b"testcase" {
                    if let Some((name, outcome)) = current.take() {
                        record(&mut out, name, outcome);
                    }
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };
        let Some(e) = start else { continue };

        match e.name().as_ref() {
            b"testsuite" | b"testsuites" => saw_suite = true,
            b"testcase" => {
                let Some(name) = attr(e, "name")? else {
                    continue;
                };
                if is_empty {
                    record(&mut out, name, RawOutcome::passed());
                } else {
                    current = Some((name, RawOutcome::passed()));
                }
            }
            b"failure" => {
                if let Some((_, outcome)) = current.as_mut() {
                    let msg = attr(e, "message")?.unwrap_or_else(|| "Test failed".into());
                    *outcome = RawOutcome::failed(msg);
                }
            }
            b"error" => {
                if let Some((_, outcome)) = current.as_mut() {
                    if outcome.passed {
                        let msg = attr(e, "message")?.unwrap_or_else(|| "Test error".into());
                        *outcome = RawOutcome::failed(msg);
                    }
                }
            }
            b"skipped" => {
                if let Some((_, outcome)) = current.as_mut() {
                    if outcome.passed {
                        let msg = attr(e, "message")?.unwrap_or_else(|| "Test skipped".into());
                        *outcome = RawOutcome::failed(msg);
                    }
                }
            }
            _ => {}
        }
    }

    if current.is_some() {
        return Err(malformed("unterminated testcase element"));
    }
    if !saw_suite {
        return Err(malformed("no testsuite element"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYTEST_REPORT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<testsuites>
  <testsuite name="pytest" errors="1" failures="1" skipped="1" tests="5">
    <testcase classname="test_submission" name="test_enqueue_in_exists" time="0.01"/>
    <testcase classname="test_submission" name="test_enqueue_at_exists" time="0.01">
      <failure message="AttributeError: &apos;Queue&apos; object has no attribute &apos;enqueue_at&apos;">trace</failure>
    </testcase>
    <testcase classname="test_submission" name="test_job_status_lifecycle" time="0.02">
      <error message="fixture setup failed">trace</error>
    </testcase>
    <testcase classname="test_submission" name="test_enqueue_in_zero_delay" time="0.00">
      <error/>
    </testcase>
    <testcase classname="test_submission" name="test_same_time_scheduling">
      <skipped message="flaky on ci"/>
    </testcase>
  </testsuite>
</testsuites>"#;

    #[test]
    fn test_reads_pytest_report() {
        let raw = parse_junit(PYTEST_REPORT).unwrap();
        assert_eq!(raw.len(), 5);
        assert!(raw["test_enqueue_in_exists"].passed);
        assert_eq!(
            raw["test_enqueue_at_exists"].message.as_deref(),
            Some("AttributeError: 'Queue' object has no attribute 'enqueue_at'")
        );
        assert_eq!(
            raw["test_job_status_lifecycle"].message.as_deref(),
            Some("fixture setup failed")
        );
        assert_eq!(
            raw["test_enqueue_in_zero_delay"].message.as_deref(),
            Some("Test error")
        );
        assert!(!raw["test_same_time_scheduling"].passed);
    }

    #[test]
    fn test_duplicate_names_fail_if_any_instance_fails() {
        let xml = r#"<testsuite>
            <testcase name="t"><failure/></testcase>
            <testcase name="t"/>
        </testsuite>"#;
        let raw = parse_junit(xml).unwrap();
        assert!(!raw["t"].passed);
        assert_eq!(raw["t"].message.as_deref(), Some("Test failed"));
    }

    #[test]
    fn test_malformed_documents_are_errors() {
        assert!(parse_junit("").is_err());
        assert!(parse_junit("not xml at all").is_err());
        assert!(parse_junit("<testsuite><testcase name=\"a\">").is_err());
        assert!(parse_junit("<testsuite></wrong>").is_err());
    }

    #[test]
    fn test_empty_suite_is_valid() {
        let raw = parse_junit(r#"<testsuite name="pytest" tests="0"/>"#).unwrap();
        assert!(raw.is_empty());
    }

    #[test]
    fn test_skipped_case_counts_as_failed() {
        let xml = r#"<testsuite name="pytest" tests="3" skipped="2">
            <testcase name="test_enqueue_in_exists"/>
            <testcase name="test_enqueue_at_exists"><skipped message="needs redis"/></testcase>
            <testcase name="test_job_status_lifecycle"><skipped/></testcase>
        </testsuite>"#;
        let raw = parse_junit(xml).unwrap();
        assert_eq!(
            raw["test_enqueue_at_exists"],
            RawOutcome::failed("needs redis")
        );
        assert_eq!(
            raw["test_job_status_lifecycle"],
            RawOutcome::failed("Test skipped")
        );

        let expected: Vec<crate::config::TestSpec> = [
            ("test_enqueue_in_exists", true),
            ("test_enqueue_at_exists", true),
            ("test_job_status_lifecycle", false),
        ]
        .into_iter()
        .map(|(name, core)| crate::config::TestSpec {
            name: name.into(),
            core,
        })
        .collect();
        let res = crate::normalize::normalize(&raw, &expected).unwrap();
        assert_eq!((res.passed, res.failed), (1, 2));
        assert_eq!(res.core_failures, vec!["test_enqueue_at_exists".to_string()]);
    }
}

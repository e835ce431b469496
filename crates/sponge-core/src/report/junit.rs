use crate::model::TestSuiteResult;
use std::path::Path;

/// Re-emits a normalized suite as JUnit XML, one `<testcase>` per canonical
/// test in order. Synthetic "not found" failures are included.
pub fn write_junit(suite: &str, result: &TestSuiteResult, out: &Path) -> anyhow::Result<()> {
    std::fs::write(out, render_junit(suite, result))?;
    Ok(())
}

pub fn render_junit(suite: &str, result: &TestSuiteResult) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(
        r#"<testsuite name="{}" tests="{}" failures="{}">"#,
        escape(suite),
        result.total,
        result.failed
    ));
    xml.push('\n');

    for r in &result.results {
        xml.push_str(&format!(r#"  <testcase name="{}">"#, escape(&r.name)));
        if !r.passed {
            let msg = r.error.as_deref().unwrap_or("Test failed");
            xml.push_str(&format!(r#"<failure message="{}"/>"#, escape(msg)));
        }
        if r.is_core && !r.passed {
            xml.push_str("<system-out>CORE</system-out>");
        }
        xml.push_str("</testcase>\n");
    }

    xml.push_str("</testsuite>\n");
    xml
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

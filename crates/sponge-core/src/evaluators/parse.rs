/// Extracts a JSON object from semi-structured model output.
///
/// Accepts plain JSON, JSON inside a markdown fence (optionally tagged
/// `json`), and JSON surrounded by prose, in that order of preference.
pub fn parse_tolerant(raw: &str) -> Option<serde_json::Value> {
    let mut text = raw.trim();
    if text.starts_with("```") {
        text = text.split("```").nth(1).unwrap_or("");
        text = text.strip_prefix("json").unwrap_or(text);
    }

    if let Ok(v) = serde_json::from_str::<serde_json::Value>(text) {
        return v.is_object().then_some(v);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<serde_json::Value>(&text[start..=end])
        .ok()
        .filter(|v| v.is_object())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let v = parse_tolerant(r#"  {"b1_clarity": 6}  "#).unwrap();
        assert_eq!(v["b1_clarity"], 6);
    }

    #[test]
    fn test_fenced_json() {
        let v = parse_tolerant("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(v["a"], 1);
        let v = parse_tolerant("```\n{\"a\": 2}\n```\ntrailing").unwrap();
        assert_eq!(v["a"], 2);
    }

    #[test]
    fn test_json_inside_prose() {
        let v = parse_tolerant("Sure! Here is the result: {\"x\": {\"y\": true}} hope it helps").unwrap();
        assert_eq!(v["x"]["y"], true);
    }

    #[test]
    fn test_garbage_is_none() {
        assert!(parse_tolerant("no json here").is_none());
        assert!(parse_tolerant("} backwards {").is_none());
        assert!(parse_tolerant("[1, 2, 3]").is_none());
        assert!(parse_tolerant("").is_none());
    }
}

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

// "7 questions", "12 quiz", "5questions"
static QUESTION_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(?:questions|quiz)").unwrap());

// greedy: first '{' through last '}'
static JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)(\{.*\})").unwrap());

/// Number of questions asked for in a free-text prompt, or `default`.
pub fn extract_question_count(prompt: &str, default: usize) -> usize {
    if prompt.is_empty() {
        return default;
    }
    QUESTION_COUNT
        .captures(&prompt.to_lowercase())
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(default)
}

/// The brace-delimited span of a model response, if any.
pub fn extract_json_from_response(text: &str) -> Option<&str> {
    JSON_OBJECT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Strict parse of a JSON object; anything else is `None`.
pub fn safe_json_parse(json_str: &str) -> Option<Map<String, Value>> {
    serde_json::from_str(json_str).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_question_count_from_prompt() {
        assert_eq!(extract_question_count("Please make 7 questions", 10), 7);
        assert_eq!(extract_question_count("A 12 QUESTIONS quiz please", 10), 12);
        assert_eq!(extract_question_count("give me a 5quiz", 10), 5);
    }

    #[test]
    fn test_question_count_defaults() {
        assert_eq!(extract_question_count("", 10), 10);
        assert_eq!(extract_question_count("make a quiz", 10), 10);
        assert_eq!(extract_question_count("chapter 3 only", 10), 10);
        assert_eq!(extract_question_count("99999999999999999999999 questions", 10), 10);
    }

    #[test]
    fn test_json_extraction() {
        assert_eq!(extract_json_from_response(r#"blah {"a":1} blah"#), Some(r#"{"a":1}"#));
        assert_eq!(extract_json_from_response("no json here"), None);
        assert_eq!(
            extract_json_from_response("Here:\n{\n  \"a\": {\"b\": 2}\n}\nDone."),
            Some("{\n  \"a\": {\"b\": 2}\n}")
        );
    }

    #[test]
    fn test_safe_json_parse() {
        let parsed = safe_json_parse(r#"{"a":1}"#).unwrap();
        assert_eq!(Value::Object(parsed), json!({"a": 1}));
        assert!(safe_json_parse("not json").is_none());
        assert!(safe_json_parse("[1, 2]").is_none());
        assert!(safe_json_parse("{'a': 1}").is_none());
    }
}

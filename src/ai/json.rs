// src/ai/json.rs
//! Tolerant JSON parsing for AI responses. Models wrap JSON in prose or code
//! fences often enough that a strict parse alone is not viable: attempt
//! strict first, then extract the first top-level balanced-brace span and
//! retry. Field values are never guessed; an unrecoverable response is a
//! typed error.

use serde::de::DeserializeOwned;

use crate::ai::AiError;

pub fn parse_lenient<T: DeserializeOwned>(raw: &str) -> Result<T, AiError> {
    if let Ok(v) = serde_json::from_str(raw) {
        return Ok(v);
    }
    let span = balanced_brace_span(raw).ok_or(AiError::Unparseable)?;
    serde_json::from_str(span).map_err(|_| AiError::Unparseable)
}

/// First `{ … }` span with balanced braces, ignoring braces inside JSON
/// string literals.
fn balanced_brace_span(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Out {
        a: i64,
    }

    #[test]
    fn strict_json_parses_directly() {
        let out: Out = parse_lenient(r#"{"a": 1}"#).unwrap();
        assert_eq!(out, Out { a: 1 });
    }

    #[test]
    fn json_wrapped_in_prose_is_recovered() {
        let raw = "Sure, here is the result:\n```json\n{\"a\": 2}\n```\nHope that helps!";
        let out: Out = parse_lenient(raw).unwrap();
        assert_eq!(out, Out { a: 2 });
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_the_scan() {
        let raw = r#"prefix {"a": 3, "note": "look: } and { here"} suffix"#;
        let out: HashMap<String, serde_json::Value> = parse_lenient(raw).unwrap();
        assert_eq!(out["a"], serde_json::json!(3));
    }

    #[test]
    fn hopeless_input_is_a_typed_error() {
        let err = parse_lenient::<Out>("no json anywhere").unwrap_err();
        assert!(matches!(err, AiError::Unparseable));

        let err = parse_lenient::<Out>("{ never closed").unwrap_err();
        assert!(matches!(err, AiError::Unparseable));
    }
}

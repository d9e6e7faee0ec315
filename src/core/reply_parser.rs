// src/core/reply_parser.rs
//! Pulls JSON objects out of free-form model replies. Nothing here errors or
//! panics on bad input; a miss is `None`.

use regex::Regex;
use serde_json::{Map, Value};
use std::ops::Range;
use std::sync::LazyLock;

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)\s*(\{.*?\})\s*```").expect("fenced json pattern")
});

/// A fenced ```json block and where it sits in the reply.
#[derive(Debug, Clone, PartialEq)]
pub struct FencedJson {
    pub object: Map<String, Value>,
    /// Byte range of the whole block, fences included.
    pub span: Range<usize>,
}

/// First fenced ```json block whose body parses as an object.
pub fn extract_fenced_json(text: &str) -> Option<FencedJson> {
    FENCED_JSON.captures_iter(text).find_map(|caps| {
        let block = caps.get(0)?;
        let body = caps.get(1)?;
        match serde_json::from_str::<Value>(body.as_str()) {
            Ok(Value::Object(object)) => Some(FencedJson {
                object,
                span: block.range(),
            }),
            _ => None,
        }
    })
}

/// First `{...}` object embedded anywhere in the text.
///
/// Each opening brace is tried in turn with a string-aware balanced scan; if
/// none of those parse, the widest span from the first `{` to the last `}` is
/// tried as a last resort.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    for (start, _) in text.match_indices('{') {
        if let Some(end) = balanced_end(&text[start..]) {
            if let Some(object) = parse_object(&text[start..start + end]) {
                return Some(object);
            }
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&text[start..=end])
}

/// Remove `span` from `text` and trim the remainder.
pub fn strip_span(text: &str, span: Range<usize>) -> String {
    let mut stripped = String::with_capacity(text.len());
    stripped.push_str(&text[..span.start]);
    stripped.push_str(&text[span.end..]);
    stripped.trim().to_string()
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// Length in bytes of the balanced object starting at `text[0] == '{'`.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + ch.len_utf8());
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
    use serde_json::json;

    #[test]
    fn test_object_surrounded_by_prose() {
        let reply = "Sure! Here you go:\n{\"name\": \"Jane\", \"target_roles\": [\"SRE\"]}\nLet me know.";
        let object = extract_json_object(reply).unwrap();
        assert_eq!(object["name"], json!("Jane"));
        assert_eq!(object["target_roles"], json!(["SRE"]));
    }

    #[test]
    fn test_braces_inside_strings_do_not_end_the_object() {
        let reply = r#"{"summary": "Uses {curly} braces and \"quotes\"", "n": 1} trailing }"#;
        let object = extract_json_object(reply).unwrap();
        assert_eq!(object["summary"], json!("Uses {curly} braces and \"quotes\""));
        assert_eq!(object["n"], json!(1));
    }

    #[test]
    fn test_skips_non_json_braces() {
        let reply = r#"Template {placeholder} then {"match_score": 70}"#;
        let object = extract_json_object(reply).unwrap();
        assert_eq!(object["match_score"], json!(70));
    }

    #[test]
    fn test_no_object_is_none() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("} backwards {").is_none());
        assert!(extract_json_object("{\"unterminated\": ").is_none());
        assert!(extract_json_object("[1, 2, 3]").is_none());
        assert!(extract_json_object("").is_none());
    }

    #[test]
    fn test_fenced_block_found_and_stripped() {
        let reply = "Great detail, thanks!\n\n```json\n{\"achievement_extracted\": {\"core_task\": \"Migrated CI\"}}\n```\n";
        let fenced = extract_fenced_json(reply).unwrap();
        assert_eq!(
            fenced.object["achievement_extracted"]["core_task"],
            json!("Migrated CI")
        );
        assert_eq!(strip_span(reply, fenced.span), "Great detail, thanks!");
    }

    #[test]
    fn test_fenced_block_with_invalid_json_is_none() {
        let reply = "```json\n{not: valid}\n```";
        assert!(extract_fenced_json(reply).is_none());
        assert!(extract_fenced_json("plain reply").is_none());
        assert!(extract_fenced_json("```\n{\"a\": 1}\n```").is_none());
    }

    #[test]
    fn test_multibyte_text_is_safe() {
        let reply = "Résumé ✓ {\"name\": \"Zoë\"} ✓";
        let object = extract_json_object(reply).unwrap();
        assert_eq!(object["name"], json!("Zoë"));
    }
}

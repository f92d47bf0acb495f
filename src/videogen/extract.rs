//! Video URL extraction from task payloads.
//!
//! The task API has returned the finished video under different keys over
//! time. A non-empty `content` always takes precedence: when it is present
//! the `output` shapes are never consulted, even if `content` has no URL.
//! Otherwise each known `output` shape is a rule and the first match wins.

use serde_json::Value;

type ExtractRule = fn(&Value) -> Option<String>;

const OUTPUT_RULES: &[ExtractRule] = &[
    output_first_element,
    output_object_url,
    output_bare_string,
];

pub fn extract_video_url(payload: &Value) -> Option<String> {
    if payload.get("content").is_some_and(is_present) {
        return content_video_url(payload);
    }
    if !payload.get("output").is_some_and(is_present) {
        return None;
    }
    OUTPUT_RULES.iter().find_map(|rule| rule(payload))
}

/// Null, `false`, `0`, `""`, `[]` and `{}` count as absent
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// `{"content": {"video_url": "..."}}`
fn content_video_url(payload: &Value) -> Option<String> {
    payload
        .get("content")?
        .as_object()?
        .get("video_url")
        .and_then(non_empty_str)
}

/// `{"output": [{"url": "..."}]}` or `{"output": ["..."]}`
fn output_first_element(payload: &Value) -> Option<String> {
    let first = payload.get("output")?.as_array()?.first()?;
    match first.as_object() {
        Some(obj) => obj.get("url").and_then(non_empty_str),
        None => non_empty_str(first),
    }
}

/// `{"output": {"url": "..."}}`
fn output_object_url(payload: &Value) -> Option<String> {
    payload
        .get("output")?
        .as_object()?
        .get("url")
        .and_then(non_empty_str)
}

/// `{"output": "..."}`
fn output_bare_string(payload: &Value) -> Option<String> {
    payload.get("output").and_then(non_empty_str)
}

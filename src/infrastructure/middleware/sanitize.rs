//! Redaction of secrets before request data is written to the audit log

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

pub const REDACTED: &str = "***REDACTED***";

const SENSITIVE_KEYS: [&str; 6] = [
    "password",
    "token",
    "secret",
    "apikey",
    "api_key",
    "authorization",
];

static QUOTED_PAIR: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?i)"([^"]*(?:password|token|secret|apikey|api_key|authorization)[^"]*)"\s*:\s*"(?:[^"\\]|\\.)*""#)
        .ok()
});

pub fn is_sensitive(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|s| key.contains(s))
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if is_sensitive(key) {
                    *v = Value::String(REDACTED.to_string());
                } else {
                    redact_value(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {}
    }
}

/// Redact secrets in a body; JSON is walked, anything else is pattern matched
pub fn sanitize_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(mut value) => {
            redact_value(&mut value);
            value.to_string()
        }
        Err(_) => match QUOTED_PAIR.as_ref() {
            Some(re) => re
                .replace_all(body, |caps: &regex::Captures| {
                    format!("\"{}\":\"{}\"", &caps[1], REDACTED)
                })
                .into_owned(),
            None => REDACTED.to_string(),
        },
    }
}

/// Redact secret values in a `key=value&...` query string
pub fn sanitize_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive(key) => format!("{}={}", key, REDACTED),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Cut `text` to at most `limit` characters
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((at, _)) => format!("{}...[truncated]", &text[..at]),
        None => text.to_string(),
    }
}

//! Lenient readers for untrusted model JSON.
//!
//! Models put numbers in strings ("30 ft"), booleans in strings, single
//! values where lists belong, and wrap JSON in markdown fences. These helpers
//! absorb that so validators only deal with "present and usable" or "absent".

use serde_json::{Map, Value};

/// Parse a model response body into JSON, unwrapping markdown fences if present.
pub fn parse_model_json(response: &str) -> Result<Value, serde_json::Error> {
    match serde_json::from_str(response.trim()) {
        Ok(value) => Ok(value),
        Err(direct_err) => {
            let candidate = extract_json(response);
            serde_json::from_str(&candidate).map_err(|_| direct_err)
        }
    }
}

fn extract_json(response: &str) -> String {
    // Try to find JSON in markdown code block
    if let Some(start) = response.find("```json") {
        if let Some(end) = response[start + 7..].find("```") {
            return response[start + 7..start + 7 + end].trim().to_string();
        }
    }

    if let Some(start) = response.find("```") {
        if let Some(end) = response[start + 3..].find("```") {
            return response[start + 3..start + 3 + end].trim().to_string();
        }
    }

    // Try to find raw JSON object
    if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
        if start < end {
            return response[start..=end].to_string();
        }
    }

    response.to_string()
}

/// Non-blank string field. Numbers are stringified.
pub fn string(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// String field or empty string.
pub fn string_or_empty(value: &Value, key: &str) -> String {
    string(value, key).unwrap_or_default()
}

/// Non-negative integer. Accepts floats (truncated) and strings with a leading number.
pub fn uint(value: &Value, key: &str) -> Option<u32> {
    value.get(key).and_then(as_uint)
}

pub fn as_uint(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => leading_number(s).and_then(|f| {
            if f >= 0.0 {
                u32::try_from(f as u64).ok()
            } else {
                None
            }
        }),
        _ => None,
    }
}

/// Float, accepting fractions written as "1/4".
pub fn float(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if let Some((num, den)) = s.split_once('/') {
                let num: f64 = num.trim().parse().ok()?;
                let den: f64 = den.trim().parse().ok()?;
                (den != 0.0).then(|| num / den)
            } else {
                leading_number(s)
            }
        }
        _ => None,
    }
}

pub fn boolean(value: &Value, key: &str) -> bool {
    match value.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes"),
        Some(Value::Number(n)) => n.as_u64().is_some_and(|n| n != 0),
        _ => false,
    }
}

/// Array field, or an empty slice when absent or not an array.
pub fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Object field when present and an object.
pub fn object<'a>(value: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    value.get(key).and_then(Value::as_object)
}

/// List of non-blank strings. A bare string is split on commas.
pub fn string_list(value: &Value, key: &str) -> Vec<String> {
    value.get(key).map(as_string_list).unwrap_or_default()
}

pub fn as_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_fenced_model_output() {
        let body = "Here you go:\n```json\n{\"name\": \"Goblin\"}\n```";
        assert_eq!(parse_model_json(body).unwrap()["name"], "Goblin");

        let body = "Sure! {\"name\": \"Goblin\"} Hope this helps.";
        assert_eq!(parse_model_json(body).unwrap()["name"], "Goblin");
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_model_json("I cannot help with that").is_err());
    }

    #[test]
    fn numbers_hide_in_strings() {
        let v = json!({ "walk": "30 ft", "cr": "1/4", "neg": -5, "f": 12.7 });
        assert_eq!(uint(&v, "walk"), Some(30));
        assert_eq!(float(&v, "cr"), Some(0.25));
        assert_eq!(uint(&v, "neg"), None);
        assert_eq!(uint(&v, "f"), Some(12));
        assert_eq!(uint(&v, "missing"), None);
    }

    #[test]
    fn strings_and_lists() {
        let v = json!({ "name": "  ", "langs": "Common, Elvish", "skills": ["prc", "", 3], "flag": "yes" });
        assert_eq!(string(&v, "name"), None);
        assert_eq!(string_list(&v, "langs"), vec!["Common", "Elvish"]);
        assert_eq!(string_list(&v, "skills"), vec!["prc", "3"]);
        assert!(boolean(&v, "flag"));
        assert!(array(&v, "traits").is_empty());
    }
}

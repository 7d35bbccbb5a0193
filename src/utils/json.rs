/*!
 * JSON helpers shared by pagination, classification and the adapters.
 *
 * Platform responses wrap their payloads differently from endpoint to
 * endpoint (a bare array, `data.content`, `data.content[].connector`, ...).
 * These helpers let that unwrapping be described declaratively as a
 * dot-separated path plus an optional per-item key.
 */

use serde_json::{Map, Value};

/// Walk a dot-separated key path. An empty path returns the value itself.
///
/// ```rust
/// use harness_migrate::utils::json::walk_path;
/// use serde_json::json;
///
/// let response = json!({"data": {"content": [1, 2]}});
/// assert_eq!(walk_path(&response, "data.content"), Some(&json!([1, 2])));
/// assert_eq!(walk_path(&response, ""), Some(&response));
/// assert_eq!(walk_path(&response, "data.missing"), None);
/// ```
pub fn walk_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.')
        .try_fold(value, |current, key| current.as_object()?.get(key))
}

/// Replace `item` with `item[key]` when present, otherwise keep the item
pub fn unwrap_key(item: Value, key: Option<&str>) -> Value {
    match (key, item) {
        (Some(key), Value::Object(mut map)) => match map.remove(key) {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        (_, item) => item,
    }
}

/// Whether a value carries information: not null, `""`, `[]` or `{}`
pub fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// String field of a JSON object, ignoring empty strings
pub fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Read a count that may be represented as a number or a numeric string
pub fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Recursively drop `null` object values and `null` array elements
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(strip_nulls)
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_walk_path_through_non_object() {
        let value = json!({"data": [1, 2]});
        assert_eq!(walk_path(&value, "data.content"), None);
    }

    #[test]
    fn test_unwrap_key_falls_back_to_item() {
        let wrapped = json!({"connector": {"identifier": "git"}, "status": {}});
        assert_eq!(
            unwrap_key(wrapped, Some("connector")),
            json!({"identifier": "git"})
        );

        let bare = json!({"identifier": "git"});
        assert_eq!(unwrap_key(bare.clone(), Some("connector")), bare);
        assert_eq!(unwrap_key(bare.clone(), None), bare);
    }

    #[test]
    fn test_is_non_empty() {
        assert!(!is_non_empty(&json!(null)));
        assert!(!is_non_empty(&json!("")));
        assert!(!is_non_empty(&json!({})));
        assert!(!is_non_empty(&json!([])));
        assert!(is_non_empty(&json!({"repoName": "r"})));
        assert!(is_non_empty(&json!(false)));
    }

    #[test]
    fn test_lenient_u64() {
        assert_eq!(lenient_u64(&json!(7)), Some(7));
        assert_eq!(lenient_u64(&json!("12")), Some(12));
        assert_eq!(lenient_u64(&json!(3.0)), Some(3));
        assert_eq!(lenient_u64(&json!("many")), None);
        assert_eq!(lenient_u64(&json!(null)), None);
    }

    #[test]
    fn test_strip_nulls() {
        let value = json!({
            "name": "vault",
            "description": null,
            "spec": {"url": null, "tags": ["a", null]}
        });
        assert_eq!(
            strip_nulls(value),
            json!({"name": "vault", "spec": {"tags": ["a"]}})
        );
    }
}

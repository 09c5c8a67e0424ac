//! Bearer-token normalization.
//!
//! The backend's login responses drifted across prototypes: sometimes a
//! bare token string, sometimes a wrapped `{ "token": ... }` object, and
//! sometimes nested under `data` or `authentication`. Everything funnels
//! through [`normalize_token`] so the rest of the session logic only ever
//! sees a trimmed, non-empty string or nothing at all.

use serde_json::Value;

/// Object fields probed for a token, in priority order.
const TOKEN_FIELDS: [&str; 7] = [
    "accessToken",
    "access_token",
    "token",
    "value",
    "idToken",
    "id_token",
    "jwt",
];

/// Paths probed by [`extract_token`] across a full login response body,
/// most common shape first.
const PAYLOAD_PATHS: [&[&str]; 12] = [
    &["token"],
    &["accessToken"],
    &["jwt"],
    &["data", "token"],
    &["data", "accessToken"],
    &["data", "jwt"],
    &["authentication", "accessToken"],
    &["authentication", "idToken"],
    &["token", "accessToken"],
    &["token", "access_token"],
    &["data", "token", "accessToken"],
    &["data", "token", "access_token"],
];

/// Reduce an arbitrary JSON value to a canonical token string.
///
/// Strings are trimmed and rejected when empty, numbers and booleans are
/// stringified, and objects are probed for the well-known token fields in
/// priority order, recursing into the first field that resolves. Null,
/// arrays, and unrecognized objects yield `None`. Total and idempotent:
/// feeding a returned token back in yields the same token.
pub fn normalize_token(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => normalize_token_str(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => TOKEN_FIELDS
            .iter()
            .filter_map(|field| map.get(*field))
            .find_map(normalize_token),
        Value::Array(_) => None,
    }
}

/// Normalize a plain string without routing it through `serde_json::Value`.
pub fn normalize_token_str(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Pull a bearer token out of a full login response body.
///
/// Walks the candidate paths the backend prototypes have used and returns
/// the first one that normalizes to a token.
pub fn extract_token(payload: &Value) -> Option<String> {
    PAYLOAD_PATHS.iter().find_map(|path| {
        let mut cursor = payload;
        for segment in *path {
            cursor = cursor.get(segment)?;
        }
        normalize_token(cursor)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trims_strings_and_rejects_empty() {
        assert_eq!(normalize_token(&json!("  abc  ")), Some("abc".to_string()));
        assert_eq!(normalize_token(&json!("")), None);
        assert_eq!(normalize_token(&json!("   ")), None);
    }

    #[test]
    fn stringifies_numbers_and_booleans() {
        assert_eq!(normalize_token(&json!(12345)), Some("12345".to_string()));
        assert_eq!(normalize_token(&json!(true)), Some("true".to_string()));
    }

    #[test]
    fn null_and_arrays_are_absent() {
        assert_eq!(normalize_token(&Value::Null), None);
        assert_eq!(normalize_token(&json!(["abc"])), None);
    }

    #[test]
    fn probes_object_fields_in_priority_order() {
        let value = json!({ "token": "second", "accessToken": "first" });
        assert_eq!(normalize_token(&value), Some("first".to_string()));
    }

    #[test]
    fn skips_candidates_that_resolve_to_nothing() {
        let value = json!({ "accessToken": "   ", "token": "usable" });
        assert_eq!(normalize_token(&value), Some("usable".to_string()));
    }

    #[test]
    fn recurses_into_nested_objects() {
        let value = json!({ "token": { "value": { "jwt": "deep" } } });
        assert_eq!(normalize_token(&value), Some("deep".to_string()));
    }

    #[test]
    fn unrecognized_objects_are_absent() {
        assert_eq!(normalize_token(&json!({ "unrelated": "x" })), None);
        assert_eq!(normalize_token(&json!({})), None);
    }

    #[test]
    fn is_idempotent_on_its_own_output() {
        for input in [json!(" a b "), json!(42), json!({ "jwt": "j" })] {
            let once = normalize_token(&input).expect("first pass");
            let twice = normalize_token(&Value::String(once.clone())).expect("second pass");
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn never_panics_on_arbitrary_shapes() {
        let inputs = [
            Value::Null,
            json!(""),
            json!(3.25),
            json!(false),
            json!([[["x"]]]),
            json!({ "a": { "b": { "c": null } } }),
            json!({ "accessToken": { "access_token": { "token": [] } } }),
        ];
        for input in &inputs {
            let _ = normalize_token(input);
        }
    }

    #[test]
    fn extracts_from_flat_payloads() {
        assert_eq!(
            extract_token(&json!({ "token": "t-1" })),
            Some("t-1".to_string())
        );
        assert_eq!(
            extract_token(&json!({ "jwt": "t-2" })),
            Some("t-2".to_string())
        );
    }

    #[test]
    fn extracts_from_nested_payloads() {
        let payload = json!({ "data": { "token": { "accessToken": "nested" } } });
        assert_eq!(extract_token(&payload), Some("nested".to_string()));

        let payload = json!({ "authentication": { "idToken": "google" } });
        assert_eq!(extract_token(&payload), Some("google".to_string()));
    }

    #[test]
    fn extract_prefers_earlier_paths() {
        let payload = json!({
            "token": "direct",
            "data": { "accessToken": "wrapped" }
        });
        assert_eq!(extract_token(&payload), Some("direct".to_string()));
    }

    #[test]
    fn extract_fails_when_nothing_usable() {
        assert_eq!(extract_token(&json!({ "user": { "id": "u" } })), None);
        assert_eq!(extract_token(&json!({ "token": "   " })), None);
    }
}

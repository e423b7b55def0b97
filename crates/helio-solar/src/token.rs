//! Session-token extraction from fork-divergent login responses.

use serde_json::Value;

/// Nested locations where forks place the session token, in priority order.
const TOKEN_PATHS: &[&[&str]] = &[
    &["token"],
    &["data", "token"],
    &["result", "token"],
    &["Authorization"],
];

/// Extract the session token from a login payload. The payload may already
/// be a plain string, or an object nesting the token at one of the known
/// paths; the first non-empty string found wins.
pub fn extract_token(auth: &Value) -> Option<String> {
    if let Some(s) = auth.as_str() {
        if !s.is_empty() {
            return Some(s.to_string());
        }
        return None;
    }

    for path in TOKEN_PATHS {
        let mut current = auth;
        let mut found = true;
        for key in *path {
            match current.get(key) {
                Some(next) => current = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if found {
            if let Some(s) = current.as_str() {
                if !s.is_empty() {
                    return Some(s.to_string());
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string_payload() {
        assert_eq!(extract_token(&json!("abc")), Some("abc".to_string()));
        assert_eq!(extract_token(&json!("")), None);
    }

    #[test]
    fn test_nested_paths() {
        assert_eq!(
            extract_token(&json!({"token": "t1"})),
            Some("t1".to_string())
        );
        assert_eq!(
            extract_token(&json!({"data": {"token": "abc"}})),
            Some("abc".to_string())
        );
        assert_eq!(
            extract_token(&json!({"result": {"token": "t3"}})),
            Some("t3".to_string())
        );
        assert_eq!(
            extract_token(&json!({"Authorization": "Bearer x"})),
            Some("Bearer x".to_string())
        );
    }

    #[test]
    fn test_priority_order() {
        let payload = json!({
            "Authorization": "low",
            "data": {"token": "mid"},
            "token": "high"
        });
        assert_eq!(extract_token(&payload), Some("high".to_string()));
    }

    #[test]
    fn test_empty_and_non_string_values_skipped() {
        assert_eq!(extract_token(&json!({})), None);
        assert_eq!(extract_token(&json!({"token": ""})), None);
        assert_eq!(extract_token(&json!({"token": 42})), None);
        assert_eq!(extract_token(&json!({"data": "not-an-object"})), None);
        assert_eq!(extract_token(&json!(null)), None);
    }
}

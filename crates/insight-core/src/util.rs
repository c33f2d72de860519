//! Text helpers shared by validation, configuration and logging.

use crate::error::{Error, Result};

const LOG_BODY_LIMIT: usize = 180;

/// Trimmed text, or `None` when absent or blank.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Trimmed `value`; blank input is a validation error carrying `message`.
pub fn require_text(value: &str, message: &str) -> Result<String> {
    match value.trim() {
        "" => Err(Error::Validation(message.to_string())),
        text => Ok(text.to_string()),
    }
}

/// Whether `value` uses an `http` or `https` scheme. Leading and trailing
/// whitespace is ignored.
pub fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    ["http://", "https://"]
        .iter()
        .any(|scheme| value.starts_with(scheme))
}

/// One-line, bounded rendering of a response body for log output.
pub fn compact_text(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(LOG_BODY_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_text_becomes_none() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some(" \n ".to_string())), None);
        assert_eq!(
            normalize_text_option(Some(" v2 ".to_string())),
            Some("v2".to_string())
        );
    }

    #[test]
    fn required_text_is_trimmed_or_rejected() {
        assert!(matches!(
            require_text("  ", "Note content cannot be empty"),
            Err(Error::Validation(message)) if message == "Note content cannot be empty"
        ));
        assert_eq!(require_text(" buy milk ", "unused").unwrap(), "buy milk");
    }

    #[test]
    fn only_http_schemes_count_as_links() {
        assert!(is_http_url("http://localhost:5000"));
        assert!(is_http_url("  https://example.com"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("www.example.com"));
    }

    #[test]
    fn compact_text_flattens_and_bounds_bodies() {
        assert_eq!(compact_text("{\n  \"error\": \"x\"\n}"), "{ \"error\": \"x\" }");
        assert_eq!(compact_text(&"y".repeat(500)).len(), LOG_BODY_LIMIT);
    }
}

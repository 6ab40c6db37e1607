//! Inline payload validation.
//!
//! Raw user-entered text is checked for JSON well-formedness here, before the
//! pipeline touches the network; a typo never costs an endpoint invocation.

use crate::error::{AppError, ErrorKind};

pub fn parse_inline_payload(raw: &str) -> Result<serde_json::Value, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::new(ErrorKind::MalformedInput, "Inline data is empty."));
    }
    serde_json::from_str(trimmed).map_err(|e| {
        AppError::new(
            ErrorKind::MalformedInput,
            format!("Inline data is not valid JSON: {e}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbalanced_braces_are_malformed_input() {
        let err = parse_inline_payload("{\"Close\": [100.0, 101.5}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn empty_input_is_malformed_input() {
        let err = parse_inline_payload("   ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn valid_object_passes_through() {
        let value = parse_inline_payload("{\"Close\": [100.0, 101.5]}").unwrap();
        assert_eq!(value["Close"][1], serde_json::json!(101.5));
    }
}

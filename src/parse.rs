use crate::error::ParseError;
use serde_json::Value;

/// Parse a JSON string into a generic value tree.
///
/// This is the parse-or-fail primitive the validators build on: it performs
/// JSON deserialization only and does NOT check document structure. The
/// returned tree preserves object key order.
pub fn parse(input: &str) -> Result<Value, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError {
            message: "empty input".to_string(),
            line: None,
            column: None,
        });
    }

    serde_json::from_str(input).map_err(|e| ParseError {
        message: e.to_string(),
        line: Some(e.line()),
        column: Some(e.column()),
    })
}

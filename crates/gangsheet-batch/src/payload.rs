//! JSON payloads for the `gangsheet` command line.
//!
//! Arguments take either inline JSON or `@path/to/file.json`. Output is
//! pretty JSON; failures are reported as `{"error": "..."}`.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::error::{BatchError, BatchResult};

/// Parses an argument as inline JSON, or the contents of a file when
/// prefixed with `@`.
///
/// ## Errors
/// `InvalidPayload` when the file cannot be read or the JSON does not match
/// `T`.
pub fn read_payload<T: DeserializeOwned>(name: &str, raw: &str) -> BatchResult<T> {
    let text = match raw.strip_prefix('@') {
        Some(path) => {
            debug!(arg = name, path, "Reading payload from file");
            let contents = std::fs::read_to_string(path).map_err(|e| {
                BatchError::InvalidPayload(format!("cannot read {name} from {path}: {e}"))
            })?;
            Cow::Owned(contents)
        }
        None => Cow::Borrowed(raw),
    };

    serde_json::from_str(&text).map_err(|e| BatchError::InvalidPayload(format!("{name}: {e}")))
}

/// Renders command output.
pub fn to_pretty_json<T: Serialize>(value: &T) -> BatchResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Renders a failure the way every command reports it.
pub fn error_body(err: &BatchError) -> String {
    json!({ "error": err.to_string() }).to_string()
}

use std::fmt;

use bson::{RawBsonRef, RawDocument};
use serde::{Deserialize, Serialize};

/// Structured error information extracted from a reply whose `ok` field is falsy.
///
/// This is intended to be serialized to JSON and consumed by other
/// components (e.g. logging, APIs).
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerErrorInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(rename = "codeName", skip_serializing_if = "Option::is_none")]
    pub code_name: Option<String>,
    #[serde(rename = "errmsg", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ServerErrorInfo {
    /// Decode the error fields of a raw reply.
    ///
    /// Each field is read on its own, so one mistyped field does not hide the
    /// others. `code` may arrive as an int32, int64 or integral double. A known
    /// `code` without a `codeName` gets its name filled in from [`error_name`].
    pub fn from_reply(reply: &RawDocument) -> Self {
        let code = match reply.get("code") {
            Ok(Some(RawBsonRef::Int32(code))) => Some(code),
            Ok(Some(RawBsonRef::Int64(code))) => i32::try_from(code).ok(),
            Ok(Some(RawBsonRef::Double(code))) => {
                let range = f64::from(i32::MIN)..=f64::from(i32::MAX);
                (code.fract() == 0.0 && range.contains(&code)).then_some(code as i32)
            }
            _ => None,
        };

        let code_name = string_field(reply, "codeName")
            .or_else(|| code.and_then(error_name).map(str::to_string));

        Self {
            code,
            code_name,
            message: string_field(reply, "errmsg"),
        }
    }

    /// Convert error info to pretty-printed JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert error info to compact JSON string (single line).
    pub fn to_json_compact(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Whether the server no longer knows the cursor this command referred to.
    pub fn is_cursor_gone(&self) -> bool {
        matches!(self.code, Some(43) | Some(237))
    }
}

impl fmt::Display for ServerErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command failed")?;
        if let Some(code) = self.code {
            write!(f, " ({code}")?;
            if let Some(name) = &self.code_name {
                write!(f, " {name}")?;
            }
            write!(f, ")")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

fn string_field(reply: &RawDocument, key: &str) -> Option<String> {
    match reply.get(key) {
        Ok(Some(RawBsonRef::String(value))) => Some(value.to_string()),
        _ => None,
    }
}

/// Get a human-readable error name for codes a cursor is likely to see.
pub fn error_name(code: i32) -> Option<&'static str> {
    let name = match code {
        13 => "Unauthorized",
        26 => "NamespaceNotFound",
        43 => "CursorNotFound",
        50 => "MaxTimeMSExpired",
        96 => "OperationFailed",
        175 => "QueryPlanKilled",
        237 => "CursorKilled",
        _ => return None,
    };

    Some(name)
}

//! Error types for pace
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (validation, bad filter, unknown task)
//! - 4: Operation failed (storage, io, serialization)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the pace CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for pace operations
#[derive(Error, Debug)]
pub enum Error {
    // Validation (exit code 2)
    #[error("task title cannot be empty")]
    EmptyTitle,

    #[error("invalid task status: {0}")]
    InvalidStatus(i64),

    #[error("invalid link: {0} (must be a valid URL, e.g. https://example.com)")]
    InvalidLink(String),

    // Expression parsing (exit code 2)
    #[error("invalid {kind} format: {token} (expected key=value)")]
    ExpressionFormat { kind: &'static str, token: String },

    #[error("unknown {kind} key: {key} (valid: {valid})")]
    UnknownKey {
        kind: &'static str,
        key: String,
        valid: &'static str,
    },

    #[error("invalid {key}: {value} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} specified more than once")]
    DuplicateField(&'static str),

    // Lookups (exit code 2)
    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("config key not found: {0}")]
    ConfigNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Operation failures (exit code 4)
    #[error("task id already exists: {0}")]
    DuplicateId(String),

    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pace directory unavailable: {0}")]
    PaceDirUnavailable(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::EmptyTitle
            | Error::InvalidStatus(_)
            | Error::InvalidLink(_)
            | Error::ExpressionFormat { .. }
            | Error::UnknownKey { .. }
            | Error::InvalidValue { .. }
            | Error::DuplicateField(_)
            | Error::TaskNotFound(_)
            | Error::ConfigNotFound(_)
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            Error::DuplicateId(_)
            | Error::Sqlite(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::PaceDirUnavailable(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// True for missing task rows or config keys.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TaskNotFound(_) | Error::ConfigNotFound(_))
    }

    /// True for errors raised by entity validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::EmptyTitle | Error::InvalidStatus(_) | Error::InvalidLink(_)
        )
    }

    /// True for filter/update grammar errors.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            Error::ExpressionFormat { .. }
                | Error::UnknownKey { .. }
                | Error::InvalidValue { .. }
                | Error::DuplicateField(_)
        )
    }

    /// Envelope classification of the exit code.
    pub fn kind(&self) -> &'static str {
        if self.exit_code() == exit_codes::USER_ERROR {
            "user_error"
        } else {
            "operation_failed"
        }
    }

    /// Structured details for the JSON error envelope.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::TaskNotFound(id) | Error::DuplicateId(id) => {
                Some(serde_json::json!({ "id": id }))
            }
            Error::ConfigNotFound(key) => Some(serde_json::json!({ "key": key })),
            Error::DuplicateField(field) => Some(serde_json::json!({ "field": field })),
            _ => None,
        }
    }
}

/// Result type alias for pace operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub message: String,
    pub kind: &'static str,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            message: err.to_string(),
            kind: err.kind(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_split_user_and_operation_errors() {
        assert_eq!(Error::EmptyTitle.exit_code(), exit_codes::USER_ERROR);
        assert_eq!(
            Error::TaskNotFound("a".to_string()).exit_code(),
            exit_codes::USER_ERROR
        );
        assert_eq!(
            Error::DuplicateId("a".to_string()).exit_code(),
            exit_codes::OPERATION_FAILED
        );
        assert_eq!(Error::DuplicateField("status").kind(), "user_error");
    }

    #[test]
    fn json_error_carries_details() {
        let err = Error::TaskNotFound("pace-001".to_string());
        let json = serde_json::to_value(JsonError::from(&err)).expect("serialize");
        assert_eq!(json["code"], 2);
        assert_eq!(json["kind"], "user_error");
        assert_eq!(json["details"]["id"], "pace-001");
        assert!(err.is_not_found());
    }
}

//! Error classification and recovery strategy selection.

use serde::{Deserialize, Serialize};

/// The kinds of failure the controller distinguishes when recovering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PermissionError,
    NotFoundError,
    TimeoutError,
    UnknownError,
}

impl ErrorKind {
    /// Canonical name, as carried in recovery thoughts and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::PermissionError => "permission_error",
            ErrorKind::NotFoundError => "not_found_error",
            ErrorKind::TimeoutError => "timeout_error",
            ErrorKind::UnknownError => "unknown_error",
        }
    }

    /// The fixed recovery strategy for this kind of failure
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            ErrorKind::PermissionError => RecoveryStrategy {
                action: "escalate_permissions",
                retry_count: 1,
            },
            ErrorKind::NotFoundError => RecoveryStrategy {
                action: "search_alternative",
                retry_count: 2,
            },
            ErrorKind::TimeoutError => RecoveryStrategy {
                action: "increase_timeout",
                retry_count: 1,
            },
            ErrorKind::UnknownError => RecoveryStrategy {
                action: "retry_with_logging",
                retry_count: 1,
            },
        }
    }
}

/// How to recover from a classified failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecoveryStrategy {
    pub action: &'static str,
    pub retry_count: u32,
}

/// Classify an error message by case-insensitive substring match.
///
/// Match priority: permission, then not found, then timeout; anything else is
/// unknown.
pub fn classify_error(error: &str) -> ErrorKind {
    let lower = error.to_lowercase();

    if lower.contains("permission") {
        return ErrorKind::PermissionError;
    }
    if lower.contains("not found") {
        return ErrorKind::NotFoundError;
    }
    if lower.contains("timeout") {
        return ErrorKind::TimeoutError;
    }
    ErrorKind::UnknownError
}

//! Data models for the think/act/observe loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The closed set of operations the controller can decide to perform next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Search,
    Analyze,
    Execute,
    Plan,
    Refine,
    Finish,
    ErrorRecovery,
}

impl ActionType {
    /// Stable snake_case name, used in logs and observation metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Search => "search",
            ActionType::Analyze => "analyze",
            ActionType::Execute => "execute",
            ActionType::Plan => "plan",
            ActionType::Refine => "refine",
            ActionType::Finish => "finish",
            ActionType::ErrorRecovery => "error_recovery",
        }
    }
}

/// One reasoning step: what to do next and why.
///
/// Immutable once created; appended to the controller's thought history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thought {
    pub reasoning: String,
    pub action_type: ActionType,
    pub action_input: Map<String, Value>,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl Thought {
    pub fn new(
        reasoning: impl Into<String>,
        action_type: ActionType,
        action_input: Map<String, Value>,
        confidence: f64,
    ) -> Self {
        Self {
            reasoning: reasoning.into(),
            action_type,
            action_input,
            confidence,
            timestamp: Utc::now(),
        }
    }
}

/// The recorded outcome of carrying out a Thought's action.
///
/// Immutable once created; appended to the observation history, index-aligned
/// with the thought that produced it. `metadata` is always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub result: Option<Value>,
    pub success: bool,
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl Observation {
    /// A successful observation with a result payload
    pub fn ok(result: Value, metadata: Map<String, Value>) -> Self {
        Self {
            result: Some(result),
            success: true,
            error: None,
            metadata,
            timestamp: Utc::now(),
        }
    }

    /// A failed observation with an error description
    pub fn failed(error: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            result: None,
            success: false,
            error: Some(error.into()),
            metadata,
            timestamp: Utc::now(),
        }
    }
}

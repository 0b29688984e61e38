//! Error types and result aliases for the Velocity library.
//!
//! This module defines the core error type [`VelocityError`] and the [`Result`] type alias
//! used throughout the library. All public APIs that can fail return `Result<T>` for
//! consistent error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VelocityError {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Action failed: {0}")]
    ActionError(String),

    #[error("Task error: {0}")]
    TaskError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl VelocityError {
    /// Short stable tag for the error variant, used in observation metadata.
    pub fn kind(&self) -> &'static str {
        match self {
            VelocityError::GatewayError(_) => "gateway_error",
            VelocityError::ApiError(_) => "api_error",
            VelocityError::SerializationError(_) => "serialization_error",
            VelocityError::HttpError(_) => "http_error",
            VelocityError::ToolError(_) => "tool_error",
            VelocityError::ActionError(_) => "action_error",
            VelocityError::TaskError(_) => "task_error",
            VelocityError::ConfigError(_) => "config_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, VelocityError>;

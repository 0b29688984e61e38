//! Velocity is a minimal agent orchestration toolkit: it sequences calls to an
//! LLM backend through a reason/act/observe loop, maintains per-task
//! conversation history, and dispatches to a small set of callable tools.
//!
//! The crate is organized in four layers:
//!
//! - [`llm`] - the gateway contract to a language-model backend
//! - [`tools`] - named, described, schema-declared callables with uniform
//!   success/failure results
//! - [`agents`] - the task model and the executor that turns model output
//!   into structured tool invocations
//! - [`react`] - a self-contained think/act/observe controller with plan
//!   queues and error recovery

pub mod agents;
pub mod error;
pub mod llm;
pub mod react;
pub mod tools;

pub use error::{Result, VelocityError};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agents::{Agent, Task, TaskOutcome, TaskStep};
    pub use crate::error::{Result, VelocityError};
    pub use crate::llm::gateways::OllamaGateway;
    pub use crate::llm::{CompletionConfig, LlmGateway, LlmMessage, MessageRole};
    pub use crate::react::{ActionType, Observation, ReActController, Thought};
    pub use crate::tools::{FunctionTool, Tool, ToolMetadata, ToolParameter, ToolRegistry, ToolResult};
}

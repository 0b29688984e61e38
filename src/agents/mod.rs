//! Task model and the executor that drives it.
//!
//! A [`Task`] bundles a description, its available tools, free-form context,
//! and an iteration budget. The [`Agent`] runs the plan-act-observe cycle
//! against a task: it asks the LLM gateway for the next step, parses it into
//! a [`TaskStep`], dispatches to a tool if requested, and terminates on an
//! explicit output or on iteration exhaustion.

pub mod agent;
pub mod executor;
pub mod task;

pub use agent::{Agent, TaskOutcome};
pub use task::{ActionRequest, Task, TaskStep};

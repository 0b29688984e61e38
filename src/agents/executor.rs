//! One-shot task execution entry point.

use crate::agents::agent::{Agent, TaskOutcome};
use crate::agents::task::Task;
use crate::error::Result;
use crate::llm::LlmGateway;
use crate::tools::Tool;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Execute a task described by its parts, without constructing the
/// [`Task`]/[`Agent`] pair by hand.
pub async fn run(
    gateway: Arc<dyn LlmGateway>,
    description: impl Into<String>,
    tools: Vec<Arc<dyn Tool>>,
    context: Map<String, Value>,
    max_iterations: usize,
) -> Result<TaskOutcome> {
    let mut task = Task::new(description)
        .with_tools(tools)
        .with_context(context)
        .with_max_iterations(max_iterations);

    let agent = Agent::new(gateway);
    agent.execute_task(&mut task).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionConfig, LlmMessage};
    use async_trait::async_trait;

    struct OutputGateway;

    #[async_trait]
    impl LlmGateway for OutputGateway {
        async fn chat(
            &self,
            _messages: &[LlmMessage],
            _config: &CompletionConfig,
        ) -> Result<String> {
            Ok(r#"{"type":"output","content":"done"}"#.to_string())
        }
    }

    #[tokio::test]
    async fn test_run_builds_and_executes_task() {
        let outcome = run(Arc::new(OutputGateway), "Quick task", vec![], Map::new(), 5)
            .await
            .unwrap();

        match outcome {
            TaskOutcome::Completed { content, history } => {
                assert_eq!(content, "done");
                assert_eq!(history.len(), 1);
            }
            _ => panic!("Expected completion"),
        }
    }
}

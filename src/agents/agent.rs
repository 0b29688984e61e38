use crate::agents::task::{Task, TaskStep};
use crate::error::Result;
use crate::llm::{CompletionConfig, LlmGateway, LlmMessage};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The outcome of running a task to completion or to its iteration budget.
///
/// Budget exhaustion is a structured record, not an error: the caller still
/// receives the full history.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// The model produced an explicit output step
    Completed {
        content: String,
        history: Vec<TaskStep>,
    },
    /// The iteration budget ran out before an output step arrived
    IterationsExhausted {
        max_iterations: usize,
        history: Vec<TaskStep>,
    },
}

/// An agent that executes tasks by sequencing LLM calls and tool invocations.
pub struct Agent {
    gateway: Arc<dyn LlmGateway>,
    name: String,
    description: String,
    config: CompletionConfig,
}

impl Agent {
    /// Create an agent with default name and completion settings
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            name: "Assistant".to_string(),
            description: "AI Agent named Assistant".to_string(),
            config: CompletionConfig::default(),
        }
    }

    /// Set the agent's name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self.description = format!("AI Agent named {}", self.name);
        self
    }

    /// Set the agent's description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the completion configuration used for gateway calls
    pub fn with_config(mut self, config: CompletionConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the tool-aware system prompt for a task
    fn system_prompt(&self, task: &Task) -> String {
        let mut prompt = format!(
            "You are an AI assistant named {}. You communicate naturally and clearly.\n\
             Your responses should be informative and well-structured.\n\
             \n\
             Reply with exactly one JSON object per turn, no surrounding text:\n\
             - To call a tool: {{\"type\": \"action\", \"content\": {{\"tool\": \"<name>\", \"parameters\": {{...}}}}}}\n\
             - To give the final result: {{\"type\": \"output\", \"content\": \"<result>\"}}",
            self.name
        );

        if !task.tools().is_empty() {
            let tool_descriptions: Vec<String> = task
                .tools()
                .iter()
                .map(|t| {
                    let metadata = t.metadata();
                    format!("- {}: {}", metadata.name, metadata.description)
                })
                .collect();

            prompt.push_str(&format!(
                "\n\nYou have access to the following tools:\n{}",
                tool_descriptions.join("\n")
            ));
        }

        prompt
    }

    /// Execute a task and return its outcome.
    ///
    /// Each iteration sends the accumulated message list to the gateway and
    /// parses the reply as a [`TaskStep`]. Malformed replies are recorded as
    /// error steps and dropped from the transcript; the turn is not resent.
    /// Unknown tool names are recorded as error steps. Only gateway transport
    /// failures propagate as `Err`.
    pub async fn execute_task(&self, task: &mut Task) -> Result<TaskOutcome> {
        info!(task_id = %task.id, description = task.description.as_str(), "Executing task");

        let mut messages = vec![
            LlmMessage::system(self.system_prompt(task)),
            LlmMessage::user(task.to_prompt()),
        ];

        for iteration in 0..task.max_iterations {
            let reply = self.gateway.chat(&messages, &self.config).await?;
            debug!(task_id = %task.id, iteration, "Received model reply");

            let step: TaskStep = match serde_json::from_str(&reply) {
                Ok(step) => step,
                Err(e) => {
                    // Tolerance policy: drop the malformed turn entirely
                    warn!(task_id = %task.id, iteration, error = %e, "Malformed model reply");
                    task.record(TaskStep::Error(
                        "Failed to parse LLM response as JSON".to_string(),
                    ));
                    continue;
                }
            };

            task.record(step.clone());

            match step {
                TaskStep::Output(content) => {
                    info!(task_id = %task.id, iteration, "Task completed");
                    return Ok(TaskOutcome::Completed {
                        content,
                        history: task.history().to_vec(),
                    });
                }
                TaskStep::Action(request) => {
                    match task.tool(&request.tool) {
                        Some(tool) => {
                            let result = tool.call(&request.parameters).await;
                            let content = if result.success {
                                result.result.as_ref().map(render_payload).unwrap_or_default()
                            } else {
                                result.error.unwrap_or_default()
                            };

                            let observation = TaskStep::Observation(content);
                            task.record(observation.clone());
                            messages
                                .push(LlmMessage::assistant(serde_json::to_string(&observation)?));
                        }
                        None => {
                            warn!(task_id = %task.id, tool = request.tool.as_str(), "Unknown tool requested");
                            task.record(TaskStep::Error(format!("Unknown tool: {}", request.tool)));
                        }
                    }
                    messages.push(LlmMessage::assistant(&reply));
                }
                TaskStep::Observation(_) | TaskStep::Error(_) => {
                    // The model is not expected to emit these, but a parsed
                    // step still joins the transcript as in the action case.
                    messages.push(LlmMessage::assistant(&reply));
                }
            }
        }

        warn!(task_id = %task.id, max_iterations = task.max_iterations, "Iteration budget exhausted");
        Ok(TaskOutcome::IterationsExhausted {
            max_iterations: task.max_iterations,
            history: task.history().to_vec(),
        })
    }
}

/// Render a tool payload the way it is echoed to the model: bare strings
/// stay bare, everything else is serialized JSON.
fn render_payload(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FunctionTool, Tool, ToolParameter};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Gateway scripted with canned replies; records the message-list length
    /// seen on every call.
    struct ScriptedGateway {
        replies: Vec<String>,
        call_count: Mutex<usize>,
        message_counts: Mutex<Vec<usize>>,
    }

    impl ScriptedGateway {
        fn new(replies: Vec<&str>) -> Self {
            Self {
                replies: replies.into_iter().map(String::from).collect(),
                call_count: Mutex::new(0),
                message_counts: Mutex::new(Vec::new()),
            }
        }

        fn message_counts(&self) -> Vec<usize> {
            self.message_counts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn chat(
            &self,
            messages: &[LlmMessage],
            _config: &CompletionConfig,
        ) -> Result<String> {
            self.message_counts.lock().unwrap().push(messages.len());

            let mut count = self.call_count.lock().unwrap();
            let idx = *count;
            *count += 1;

            Ok(self
                .replies
                .get(idx)
                .cloned()
                .unwrap_or_else(|| "not json".to_string()))
        }
    }

    fn add_tool() -> Arc<dyn Tool> {
        Arc::new(FunctionTool::new(
            "add",
            "Add two numbers",
            vec![
                ToolParameter::required("a", "number"),
                ToolParameter::required("b", "number"),
            ],
            |args| {
                let a = args.get("a").and_then(|v| v.as_i64()).unwrap_or(0);
                let b = args.get("b").and_then(|v| v.as_i64()).unwrap_or(0);
                Ok(json!(a + b))
            },
        ))
    }

    #[tokio::test]
    async fn test_single_output_terminates_on_first_iteration() {
        let gateway = Arc::new(ScriptedGateway::new(vec![r#"{"type":"output","content":"X"}"#]));
        let agent = Agent::new(gateway.clone());
        let mut task = Task::new("Trivial task");

        let outcome = agent.execute_task(&mut task).await.unwrap();

        match outcome {
            TaskOutcome::Completed { content, history } => {
                assert_eq!(content, "X");
                assert_eq!(history, vec![TaskStep::Output("X".to_string())]);
            }
            _ => panic!("Expected completion"),
        }
        assert_eq!(gateway.message_counts(), vec![2]);
    }

    #[tokio::test]
    async fn test_end_to_end_tool_scenario() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            r#"{"type":"action","content":{"tool":"add","parameters":{"a":2,"b":3}}}"#,
            r#"{"type":"output","content":"5"}"#,
        ]));
        let agent = Agent::new(gateway);
        let mut task = Task::new("Add 2 and 3").with_tools(vec![add_tool()]);

        let outcome = agent.execute_task(&mut task).await.unwrap();

        match outcome {
            TaskOutcome::Completed { content, history } => {
                assert_eq!(content, "5");
                assert_eq!(history.len(), 3);
                assert!(matches!(history[0], TaskStep::Action(_)));
                assert_eq!(history[1], TaskStep::Observation("5".to_string()));
                assert_eq!(history[2], TaskStep::Output("5".to_string()));
            }
            _ => panic!("Expected completion"),
        }
    }

    #[tokio::test]
    async fn test_action_grows_transcript_with_observation_then_reply() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            r#"{"type":"action","content":{"tool":"add","parameters":{"a":1,"b":1}}}"#,
            r#"{"type":"output","content":"2"}"#,
        ]));
        let agent = Agent::new(gateway.clone());
        let mut task = Task::new("Add").with_tools(vec![add_tool()]);

        agent.execute_task(&mut task).await.unwrap();

        // Second call sees the two seed messages plus observation echo and raw reply
        assert_eq!(gateway.message_counts(), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_malformed_replies_produce_error_records_without_message_growth() {
        let gateway = Arc::new(ScriptedGateway::new(vec!["oops", "still not json", "nope"]));
        let agent = Agent::new(gateway.clone());
        let mut task = Task::new("Doomed task").with_max_iterations(3);

        let outcome = agent.execute_task(&mut task).await.unwrap();

        match outcome {
            TaskOutcome::IterationsExhausted {
                max_iterations,
                history,
            } => {
                assert_eq!(max_iterations, 3);
                assert_eq!(history.len(), 3);
                for step in &history {
                    assert_eq!(
                        *step,
                        TaskStep::Error("Failed to parse LLM response as JSON".to_string())
                    );
                }
            }
            _ => panic!("Expected exhaustion"),
        }

        // Malformed turns are dropped: the transcript never grows past the seeds
        assert_eq!(gateway.message_counts(), vec![2, 2, 2]);
    }

    #[tokio::test]
    async fn test_unknown_tool_records_error() {
        // Unknown tool names surface as error records rather than being
        // silently skipped.
        let gateway = Arc::new(ScriptedGateway::new(vec![
            r#"{"type":"action","content":{"tool":"divide","parameters":{}}}"#,
            r#"{"type":"output","content":"done"}"#,
        ]));
        let agent = Agent::new(gateway.clone());
        let mut task = Task::new("Divide").with_tools(vec![add_tool()]);

        let outcome = agent.execute_task(&mut task).await.unwrap();

        match outcome {
            TaskOutcome::Completed { history, .. } => {
                assert_eq!(history.len(), 3);
                assert_eq!(history[1], TaskStep::Error("Unknown tool: divide".to_string()));
            }
            _ => panic!("Expected completion"),
        }

        // No observation echo for the unresolved tool; only the raw reply joins
        assert_eq!(gateway.message_counts(), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_failed_tool_result_becomes_observation_text() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            r#"{"type":"action","content":{"tool":"add","parameters":{"a":2}}}"#,
            r#"{"type":"output","content":"gave up"}"#,
        ]));
        let agent = Agent::new(gateway);
        let mut task = Task::new("Add with missing arg").with_tools(vec![add_tool()]);

        let outcome = agent.execute_task(&mut task).await.unwrap();

        match outcome {
            TaskOutcome::Completed { history, .. } => match &history[1] {
                TaskStep::Observation(content) => {
                    assert!(content.contains("Missing required parameters"));
                    assert!(content.contains("b"));
                }
                other => panic!("Expected observation, got {:?}", other),
            },
            _ => panic!("Expected completion"),
        }
    }

    #[tokio::test]
    async fn test_system_prompt_lists_tools() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let agent = Agent::new(gateway).with_name("Researcher");
        let task = Task::new("Test").with_tools(vec![add_tool()]);

        let prompt = agent.system_prompt(&task);

        assert!(prompt.contains("Researcher"));
        assert!(prompt.contains("- add: Add two numbers"));
        assert!(prompt.contains("\"type\": \"action\""));
    }

    #[test]
    fn test_render_payload() {
        assert_eq!(render_payload(&json!("plain")), "plain");
        assert_eq!(render_payload(&json!(5)), "5");
        assert_eq!(render_payload(&json!({"k":"v"})), r#"{"k":"v"}"#);
    }
}

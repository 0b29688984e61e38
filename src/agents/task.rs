use crate::tools::Tool;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub tool: String,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
}

/// One step in a task's execution history, as exchanged with the model.
///
/// The wire format is a JSON object `{"type": ..., "content": ...}`. The set
/// of step kinds is closed; replies whose `type` falls outside it fail to
/// deserialize and take the malformed-response path in the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum TaskStep {
    /// The model requests a tool invocation
    Action(ActionRequest),
    /// The recorded outcome of a tool invocation
    Observation(String),
    /// The model's final answer
    Output(String),
    /// A locally recorded failure (malformed reply, unknown tool)
    Error(String),
}

/// A unit of work: description, available tools, context, and step history.
///
/// Tasks are created per unit of work, mutated only by the executor that runs
/// them, and discarded after the run. Tools are shared read-only references;
/// the same tool instance may back several tasks.
pub struct Task {
    pub id: Uuid,
    pub description: String,
    tools: Vec<Arc<dyn Tool>>,
    context: Map<String, Value>,
    history: Vec<TaskStep>,
    pub max_iterations: usize,
}

impl Task {
    /// Create a task with an empty tool set and a default budget of 10 iterations
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            tools: Vec::new(),
            context: Map::new(),
            history: Vec::new(),
            max_iterations: 10,
        }
    }

    /// Set the tools available to the task
    pub fn with_tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the task context
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// Set the iteration budget
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Add a tool to the task
    pub fn add_tool(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    /// Add context information to the task
    pub fn add_context(&mut self, key: impl Into<String>, value: Value) {
        self.context.insert(key.into(), value);
    }

    /// Look up a tool by exact name
    pub fn tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.matches(name)).cloned()
    }

    /// The tools available to this task
    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Append a step to the task history
    pub fn record(&mut self, step: TaskStep) {
        self.history.push(step);
    }

    /// The task execution history so far
    pub fn history(&self) -> &[TaskStep] {
        &self.history
    }

    /// Render the task into the user prompt sent to the model
    pub fn to_prompt(&self) -> String {
        let tool_descriptions: Vec<String> = self
            .tools
            .iter()
            .map(|t| {
                let metadata = t.metadata();
                format!("- {}: {}", metadata.name, metadata.description)
            })
            .collect();

        let context_lines: Vec<String> =
            self.context.iter().map(|(key, value)| format!("{}: {}", key, value)).collect();

        format!(
            "Task Description: {}\n\
             \n\
             Available Context:\n\
             {}\n\
             \n\
             Available Tools:\n\
             {}\n\
             \n\
             Please help me complete this task by following the steps:\n\
             1. Analyze the task and create a plan\n\
             2. Execute the plan using available tools\n\
             3. Provide the final result",
            self.description,
            context_lines.join("\n"),
            tool_descriptions.join("\n")
        )
    }
}

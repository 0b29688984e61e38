//! The reason/act/observe state machine.

use crate::error::{Result, VelocityError};
use crate::react::models::{ActionType, Observation, Thought};
use crate::react::recovery::{classify_error, ErrorKind};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// Free-form key/value context threaded through a run
pub type Context = Map<String, Value>;

const CANONICAL_PLAN: [ActionType; 5] = [
    ActionType::Plan,
    ActionType::Search,
    ActionType::Analyze,
    ActionType::Execute,
    ActionType::Finish,
];

/// A rule-based think/act/observe controller.
///
/// The controller keeps index-aligned thought and observation histories, an
/// internal plan queue consumed front-to-back, and an error counter bounded
/// by `max_retries`. It decides the next action from its own state rather
/// than from model output.
///
/// A controller is reusable across multiple [`run`](ReActController::run)
/// calls, and its histories keep accumulating between them: a second run on
/// the same instance continues the session rather than starting fresh.
pub struct ReActController {
    thought_history: Vec<Thought>,
    observation_history: Vec<Observation>,
    current_plan: VecDeque<ActionType>,
    error_count: u32,
    max_retries: u32,
}

impl Default for ReActController {
    fn default() -> Self {
        Self::new(3)
    }
}

impl ReActController {
    /// Create a controller that gives up after `max_retries` consecutive failures
    pub fn new(max_retries: u32) -> Self {
        Self {
            thought_history: Vec::new(),
            observation_history: Vec::new(),
            current_plan: VecDeque::new(),
            error_count: 0,
            max_retries,
        }
    }

    /// Thoughts recorded so far, oldest first
    pub fn thoughts(&self) -> &[Thought] {
        &self.thought_history
    }

    /// Observations recorded so far, index-aligned with [`thoughts`](Self::thoughts)
    pub fn observations(&self) -> &[Observation] {
        &self.observation_history
    }

    /// Number of failures recorded against the retry budget
    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    /// Action types still queued for execution
    pub fn pending_plan(&self) -> Vec<ActionType> {
        self.current_plan.iter().copied().collect()
    }

    /// Decide the next action from the accumulated state.
    ///
    /// Decision order, first match wins: bootstrap planning, error recovery,
    /// plan-queue execution, completion check, default continuation.
    pub fn reason(&mut self, context: &Context) -> Thought {
        debug!("Reasoning about current context");

        // Bootstrap: install the canonical plan; this thought performs its
        // leading Plan step, so that entry comes straight off the queue.
        if self.thought_history.is_empty() {
            self.current_plan = VecDeque::from(CANONICAL_PLAN);
            let _ = self.current_plan.pop_front();

            let mut input = Map::new();
            input.insert("query".to_string(), string_from(context, "initial_query"));
            input.insert("objective".to_string(), string_from(context, "objective"));

            return Thought::new(
                "Initial planning phase required",
                ActionType::Plan,
                input,
                0.9,
            );
        }

        // Error recovery
        if let Some(last) = self.observation_history.last().cloned() {
            if !last.success {
                self.error_count += 1;

                if self.error_count >= self.max_retries {
                    let mut input = Map::new();
                    input.insert("error_summary".to_string(), self.error_summary());

                    return Thought::new(
                        "Maximum retries exceeded. Need human intervention.",
                        ActionType::Finish,
                        input,
                        0.5,
                    );
                }

                return self.error_recovery_thought(&last);
            }
        }

        // Plan execution
        if let Some(next_action) = self.current_plan.pop_front() {
            return self.thought_for_action(next_action, context);
        }

        // Completion check
        if !self.observation_history.is_empty() && self.objective_complete(context) {
            let mut input = Map::new();
            input.insert("summary".to_string(), self.execution_summary());

            return Thought::new(
                "Objective appears to be completed successfully",
                ActionType::Finish,
                input,
                0.95,
            );
        }

        // Default continuation
        let mut input = Map::new();
        input.insert("params".to_string(), Value::Object(execution_params(context)));

        Thought::new("Continuing with standard execution", ActionType::Execute, input, 0.7)
    }

    /// Carry out a thought's action and record the outcome.
    ///
    /// Handler failures never escape this boundary: they become failed
    /// observations with the action type, an error-kind tag, and a failure
    /// timestamp in the metadata.
    pub fn act(&self, thought: &Thought) -> Observation {
        info!(
            action = thought.action_type.as_str(),
            confidence = thought.confidence,
            "Executing action"
        );

        let outcome = match thought.action_type {
            ActionType::Search => self.perform_search(&thought.action_input),
            ActionType::Analyze => self.analyze_data(&thought.action_input),
            ActionType::Execute => self.execute_action(&thought.action_input),
            ActionType::Plan => self.create_execution_plan(&thought.action_input),
            ActionType::Refine => self.refine_results(&thought.action_input),
            ActionType::ErrorRecovery => self.handle_error_recovery(&thought.action_input),
            ActionType::Finish => self.finalize_execution(&thought.action_input),
        };

        match outcome {
            Ok(result) => {
                let mut metadata = Map::new();
                metadata.insert("action_type".to_string(), json!(thought.action_type.as_str()));
                metadata.insert("confidence".to_string(), json!(thought.confidence));
                metadata.insert("timestamp".to_string(), json!(now_rfc3339()));

                Observation::ok(result, metadata)
            }
            Err(e) => {
                warn!(action = thought.action_type.as_str(), error = %e, "Action failed");

                let mut metadata = Map::new();
                metadata.insert("action_type".to_string(), json!(thought.action_type.as_str()));
                metadata.insert("error_kind".to_string(), json!(e.kind()));
                metadata.insert("error_timestamp".to_string(), json!(now_rfc3339()));

                Observation::failed(e.to_string(), metadata)
            }
        }
    }

    /// Run the reason/act loop against a copy of `initial_context`.
    ///
    /// Stops on a Finish thought or on a failed observation, whichever comes
    /// first; `max_steps` is a soft cap that simply ends the loop. Returns
    /// the full observation history, not just this run's steps.
    pub fn run(&mut self, initial_context: &Context, max_steps: usize) -> Vec<Observation> {
        let span = info_span!("react_run", run_id = %Uuid::new_v4());
        let _guard = span.enter();

        let mut context = initial_context.clone();
        info!(max_steps, "Starting reason/act loop");

        for step in 0..max_steps {
            let thought = self.reason(&context);
            self.thought_history.push(thought.clone());
            info!(
                step = step + 1,
                action = thought.action_type.as_str(),
                reasoning = thought.reasoning.as_str(),
                "Thought"
            );

            let observation = self.act(&thought);
            self.observation_history.push(observation.clone());
            info!(step = step + 1, success = observation.success, "Observation");

            context.insert(
                "last_thought".to_string(),
                serde_json::to_value(&thought).unwrap_or(Value::Null),
            );
            context.insert(
                "last_observation".to_string(),
                serde_json::to_value(&observation).unwrap_or(Value::Null),
            );
            context.insert("step".to_string(), json!(step));
            context.insert("history_summary".to_string(), self.execution_summary());

            if thought.action_type == ActionType::Finish || !observation.success {
                if !observation.success {
                    warn!(error = ?observation.error, "Loop terminated due to failure");
                } else {
                    info!("Loop completed successfully");
                }
                break;
            }
        }

        self.observation_history.clone()
    }

    fn error_recovery_thought(&self, failed: &Observation) -> Thought {
        let error_text = failed.error.clone().unwrap_or_default();
        let kind = classify_error(&error_text);
        let strategy = kind.recovery_strategy();

        let mut input = Map::new();
        input.insert("error_type".to_string(), json!(kind.as_str()));
        input.insert(
            "recovery_strategy".to_string(),
            serde_json::to_value(strategy).unwrap_or(Value::Null),
        );
        input.insert(
            "previous_action".to_string(),
            failed.metadata.get("action_type").cloned().unwrap_or(Value::Null),
        );

        Thought::new(
            format!("Attempting to recover from error: {}", kind.as_str()),
            ActionType::ErrorRecovery,
            input,
            0.6,
        )
    }

    fn thought_for_action(&self, action: ActionType, context: &Context) -> Thought {
        match action {
            ActionType::Plan => {
                let mut input = Map::new();
                input.insert("objective".to_string(), string_from(context, "objective"));
                input.insert(
                    "constraints".to_string(),
                    context.get("constraints").cloned().unwrap_or_else(|| json!([])),
                );

                Thought::new("Planning the approach to the objective", action, input, 0.8)
            }
            ActionType::Search => {
                let mut input = Map::new();
                input.insert("query".to_string(), string_from(context, "initial_query"));
                input.insert("search_type".to_string(), json!("general"));

                Thought::new("Gathering information for the objective", action, input, 0.8)
            }
            ActionType::Analyze => {
                let mut input = Map::new();
                input.insert("data".to_string(), self.last_result());
                input.insert("analysis_type".to_string(), json!("general"));

                Thought::new("Processing the gathered findings", action, input, 0.8)
            }
            ActionType::Execute => {
                let mut input = Map::new();
                input.insert("params".to_string(), Value::Object(execution_params(context)));

                Thought::new("Implementing the planned solution", action, input, 0.8)
            }
            ActionType::Refine => {
                let mut input = Map::new();
                input.insert("results".to_string(), self.last_result());
                input.insert("focus".to_string(), string_from(context, "objective"));

                Thought::new("Refining intermediate results", action, input, 0.8)
            }
            ActionType::Finish => {
                let mut input = Map::new();
                input.insert("summary".to_string(), self.execution_summary());

                Thought::new("All planned steps have been carried out", action, input, 0.95)
            }
            ActionType::ErrorRecovery => match self.observation_history.iter().rev().find(|o| !o.success) {
                Some(failed) => self.error_recovery_thought(failed),
                None => {
                    let mut input = Map::new();
                    input.insert("error_type".to_string(), json!(ErrorKind::UnknownError.as_str()));

                    Thought::new("Recovering without a recorded failure", action, input, 0.6)
                }
            },
        }
    }

    fn last_result(&self) -> Value {
        self.observation_history
            .last()
            .and_then(|o| o.result.clone())
            .unwrap_or_else(|| json!({}))
    }

    fn objective_complete(&self, context: &Context) -> bool {
        let Some(last) = self.observation_history.last() else {
            return false;
        };
        if !last.success {
            return false;
        }

        let criteria = context
            .get("success_criteria")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        if criteria.is_empty() {
            return true;
        }

        let rendered = last.result.as_ref().map(|v| v.to_string()).unwrap_or_default();
        criteria
            .iter()
            .all(|criterion| criterion.as_str().map(|s| rendered.contains(s)).unwrap_or(false))
    }

    fn execution_summary(&self) -> Value {
        let success_rate = if self.observation_history.is_empty() {
            0.0
        } else {
            let successes = self.observation_history.iter().filter(|o| o.success).count();
            successes as f64 / self.observation_history.len() as f64
        };

        json!({
            "total_steps": self.thought_history.len(),
            "success_rate": success_rate,
            "error_count": self.error_count,
            "final_state": if self.objective_complete(&Map::new()) { "completed" } else { "incomplete" },
        })
    }

    fn error_summary(&self) -> Value {
        let mut errors_by_kind: BTreeMap<&'static str, u32> = BTreeMap::new();
        let mut failure_points: Vec<Value> = Vec::new();

        for observation in self.observation_history.iter().filter(|o| !o.success) {
            let kind = classify_error(observation.error.as_deref().unwrap_or_default());
            *errors_by_kind.entry(kind.as_str()).or_insert(0) += 1;

            if let Some(action) = observation.metadata.get("action_type") {
                failure_points.push(action.clone());
            }
        }

        json!({
            "error_count": self.error_count,
            "distinct_error_kinds": errors_by_kind.len(),
            "errors_by_kind": errors_by_kind,
            "failure_points": failure_points,
        })
    }

    fn perform_search(&self, input: &Map<String, Value>) -> Result<Value> {
        let query = input.get("query").and_then(|v| v.as_str()).unwrap_or_default();
        let search_type =
            input.get("search_type").and_then(|v| v.as_str()).unwrap_or("general");

        // Stand-in search results; real retrieval lives behind a Tool
        Ok(json!({
            "query": query,
            "search_type": search_type,
            "results": [
                {"title": "Sample Result 1", "relevance": 0.9},
                {"title": "Sample Result 2", "relevance": 0.7},
            ],
            "metadata": {
                "timestamp": now_rfc3339(),
                "result_count": 2,
            },
        }))
    }

    fn analyze_data(&self, input: &Map<String, Value>) -> Result<Value> {
        let analysis_type =
            input.get("analysis_type").and_then(|v| v.as_str()).unwrap_or("general");

        Ok(json!({
            "analysis_type": analysis_type,
            "insights": ["Insight 1", "Insight 2"],
            "metrics": {"relevance": 0.85, "confidence": 0.9},
            "recommendations": ["Recommendation 1", "Recommendation 2"],
        }))
    }

    fn execute_action(&self, input: &Map<String, Value>) -> Result<Value> {
        let empty = Map::new();
        let params = input.get("params").and_then(|v| v.as_object()).unwrap_or(&empty);

        let missing: Vec<&str> = ["action_type", "target"]
            .into_iter()
            .filter(|name| !params.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(VelocityError::ActionError(format!(
                "Invalid action parameters, missing: {}",
                missing.join(", ")
            )));
        }

        Ok(json!({
            "status": "completed",
            "outputs": {"target": params.get("target")},
            "metrics": {"duration": 0.5, "success_rate": 1.0},
        }))
    }

    fn create_execution_plan(&self, input: &Map<String, Value>) -> Result<Value> {
        let objective = input.get("objective").and_then(|v| v.as_str()).unwrap_or_default();

        Ok(json!({
            "objective": objective,
            "steps": [
                {"action": "search", "purpose": "Gather information"},
                {"action": "analyze", "purpose": "Process findings"},
                {"action": "execute", "purpose": "Implement solution"},
            ],
            "estimated_steps": 3,
            "success_criteria": ["Criteria 1", "Criteria 2"],
        }))
    }

    fn refine_results(&self, input: &Map<String, Value>) -> Result<Value> {
        Ok(json!({
            "refined": input.get("results").cloned().unwrap_or_else(|| json!({})),
            "focus": input.get("focus").cloned().unwrap_or(Value::Null),
        }))
    }

    fn handle_error_recovery(&self, input: &Map<String, Value>) -> Result<Value> {
        Ok(json!({
            "status": "recovery_applied",
            "strategy": input.get("recovery_strategy").cloned().unwrap_or(Value::Null),
        }))
    }

    fn finalize_execution(&self, input: &Map<String, Value>) -> Result<Value> {
        let summary = input
            .get("summary")
            .or_else(|| input.get("error_summary"))
            .cloned()
            .unwrap_or(Value::Null);

        Ok(json!({
            "status": "finalized",
            "summary": summary,
        }))
    }
}

fn string_from(context: &Context, key: &str) -> Value {
    json!(context.get(key).and_then(|v| v.as_str()).unwrap_or_default())
}

/// Execution parameters from the context, or a minimal synthesized set so a
/// plan-driven Execute step passes validation when the caller declared none.
fn execution_params(context: &Context) -> Map<String, Value> {
    if let Some(params) = context.get("params").and_then(|v| v.as_object()) {
        return params.clone();
    }

    let mut params = Map::new();
    params.insert("action_type".to_string(), json!("execute"));
    let target = context.get("objective").and_then(|v| v.as_str()).unwrap_or("task");
    params.insert("target".to_string(), json!(target));
    params
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

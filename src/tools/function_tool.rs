use crate::error::{Result, VelocityError};
use crate::tools::schema::{ToolMetadata, ToolParameter};
use crate::tools::tool::Tool;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

type ToolFn = dyn Fn(&HashMap<String, Value>) -> Result<Value> + Send + Sync;

/// A tool backed by a plain function with an explicitly declared schema.
///
/// The parameter schema is supplied at construction time, not inferred from
/// the closure. Required parameters are validated before the closure runs; a
/// missing parameter fails fast with a message naming the missing fields.
///
/// # Examples
///
/// ```
/// use velocity::tools::{FunctionTool, ToolParameter};
/// use serde_json::json;
///
/// let add = FunctionTool::new(
///     "add",
///     "Add two numbers",
///     vec![
///         ToolParameter::required("a", "number"),
///         ToolParameter::required("b", "number"),
///     ],
///     |args| {
///         let a = args["a"].as_f64().unwrap_or(0.0);
///         let b = args["b"].as_f64().unwrap_or(0.0);
///         Ok(json!(a + b))
///     },
/// );
/// ```
#[derive(Clone)]
pub struct FunctionTool {
    metadata: ToolMetadata,
    func: Arc<ToolFn>,
}

impl FunctionTool {
    /// Create a tool from a function and a declared parameter schema
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ToolParameter>,
        func: F,
    ) -> Self
    where
        F: Fn(&HashMap<String, Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            metadata: ToolMetadata::new(name, description).with_parameters(parameters),
            func: Arc::new(func),
        }
    }

    /// Assign a category for registry indexing
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.metadata = self.metadata.with_category(category);
        self
    }

    fn missing_required(&self, args: &HashMap<String, Value>) -> Vec<String> {
        self.metadata
            .parameters
            .iter()
            .filter(|p| p.required && !args.contains_key(&p.name))
            .map(|p| p.name.clone())
            .collect()
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn metadata(&self) -> ToolMetadata {
        self.metadata.clone()
    }

    async fn execute(&self, args: &HashMap<String, Value>) -> Result<Value> {
        let missing = self.missing_required(args);
        if !missing.is_empty() {
            return Err(VelocityError::ToolError(format!(
                "Missing required parameters: {}",
                missing.join(", ")
            )));
        }

        // Fill in declared defaults for absent optional parameters
        let mut args = args.clone();
        for param in &self.metadata.parameters {
            if let Some(default) = &param.default {
                args.entry(param.name.clone()).or_insert_with(|| default.clone());
            }
        }

        (self.func)(&args)
    }
}

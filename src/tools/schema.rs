//! Declared schemas and uniform results for tools.
//!
//! Tool parameter schemas are declared explicitly at construction time rather
//! than inferred from callables, so they can be inspected and tested
//! independently of the functions they describe.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Declared schema for a single tool parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ToolParameter {
    /// Declare a required parameter
    pub fn required(name: impl Into<String>, r#type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            r#type: r#type.into(),
            description: None,
            required: true,
            default: None,
        }
    }

    /// Declare an optional parameter with a default value
    pub fn optional(
        name: impl Into<String>,
        r#type: impl Into<String>,
        default: Option<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            r#type: r#type.into(),
            description: None,
            required: false,
            default,
        }
    }

    /// Attach a human-readable description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Metadata describing a tool to the model and to registries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ToolMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            category: None,
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<ToolParameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// The outcome of a tool invocation.
///
/// Exactly one of `result` and `error` is populated, matching the `success`
/// flag. Construct through [`ToolResult::ok`] and [`ToolResult::err`] to keep
/// that invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl ToolResult {
    /// A successful result with a payload
    pub fn ok(result: Value, metadata: HashMap<String, Value>) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            metadata,
        }
    }

    /// A failed result with an error description
    pub fn err(error: impl Into<String>, metadata: HashMap<String, Value>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_parameter() {
        let param = ToolParameter::required("query", "string");

        assert_eq!(param.name, "query");
        assert_eq!(param.r#type, "string");
        assert!(param.required);
        assert!(param.default.is_none());
    }

    #[test]
    fn test_optional_parameter_with_default() {
        let param = ToolParameter::optional("limit", "number", Some(json!(10)));

        assert!(!param.required);
        assert_eq!(param.default, Some(json!(10)));
    }

    #[test]
    fn test_parameter_description() {
        let param =
            ToolParameter::required("path", "string").with_description("Path to the file");

        assert_eq!(param.description.as_deref(), Some("Path to the file"));
    }

    #[test]
    fn test_metadata_builder() {
        let metadata = ToolMetadata::new("search", "Search the corpus")
            .with_parameters(vec![ToolParameter::required("query", "string")])
            .with_category("IO");

        assert_eq!(metadata.name, "search");
        assert_eq!(metadata.parameters.len(), 1);
        assert_eq!(metadata.category.as_deref(), Some("IO"));
    }

    #[test]
    fn test_metadata_serialization() {
        let metadata = ToolMetadata::new("add", "Add two numbers")
            .with_parameters(vec![
                ToolParameter::required("a", "number"),
                ToolParameter::required("b", "number"),
            ]);

        let json = serde_json::to_string(&metadata).unwrap();
        assert!(json.contains("\"name\":\"add\""));
        assert!(json.contains("\"required\":true"));
        // No category declared, so none serialized
        assert!(!json.contains("category"));
    }

    #[test]
    fn test_tool_result_ok_invariant() {
        let result = ToolResult::ok(json!(5), HashMap::new());

        assert!(result.success);
        assert_eq!(result.result, Some(json!(5)));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_tool_result_err_invariant() {
        let result = ToolResult::err("division by zero", HashMap::new());

        assert!(!result.success);
        assert!(result.result.is_none());
        assert_eq!(result.error.as_deref(), Some("division by zero"));
    }

    #[test]
    fn test_tool_result_metadata_default() {
        let json = r#"{"success":true,"result":42}"#;
        let result: ToolResult = serde_json::from_str(json).unwrap();

        assert!(result.metadata.is_empty());
    }
}

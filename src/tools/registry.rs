use crate::tools::tool::Tool;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry for managing and discovering tools.
///
/// The registry is a plain value constructed by the caller and passed to
/// whatever builds tasks or agents; there is no process-wide shared state.
/// Registering a tool under an existing name replaces the previous entry.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    categories: HashMap<String, Vec<String>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under the name in its metadata
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let metadata = tool.metadata();

        if let Some(category) = &metadata.category {
            let names = self.categories.entry(category.clone()).or_default();
            if !names.contains(&metadata.name) {
                names.push(metadata.name.clone());
            }
        }

        self.tools.insert(metadata.name, tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all registered tool names
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// List all known categories
    pub fn categories(&self) -> Vec<String> {
        let mut names: Vec<String> = self.categories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get all tool names in a category
    pub fn tools_in_category(&self, category: &str) -> Vec<String> {
        self.categories.get(category).cloned().unwrap_or_default()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Remove all registered tools
    pub fn clear(&mut self) {
        self.tools.clear();
        self.categories.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FunctionTool, ToolParameter};
    use serde_json::json;

    fn sample_tool(name: &str, category: Option<&str>) -> Arc<dyn Tool> {
        let tool = FunctionTool::new(
            name,
            "A sample tool",
            vec![ToolParameter::required("input", "string")],
            |_args| Ok(json!("ok")),
        );

        match category {
            Some(c) => Arc::new(tool.with_category(c)),
            None => Arc::new(tool),
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ToolRegistry::new();
        registry.register(sample_tool("search", None));

        let tool = registry.get("search");
        assert!(tool.is_some());
        assert!(tool.unwrap().matches("search"));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_list_is_sorted() {
        let mut registry = ToolRegistry::new();
        registry.register(sample_tool("zeta", None));
        registry.register(sample_tool("alpha", None));

        assert_eq!(registry.list(), vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn test_categories() {
        let mut registry = ToolRegistry::new();
        registry.register(sample_tool("read_file", Some("IO")));
        registry.register(sample_tool("write_file", Some("IO")));
        registry.register(sample_tool("add", Some("Math")));

        assert_eq!(registry.categories(), vec!["IO".to_string(), "Math".to_string()]);
        assert_eq!(
            registry.tools_in_category("IO"),
            vec!["read_file".to_string(), "write_file".to_string()]
        );
        assert!(registry.tools_in_category("Network").is_empty());
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(sample_tool("search", None));
        registry.register(sample_tool("search", None));

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_separate_instances_do_not_share_state() {
        let mut first = ToolRegistry::new();
        first.register(sample_tool("search", None));

        let second = ToolRegistry::new();
        assert!(second.is_empty());
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut registry = ToolRegistry::new();
        registry.register(sample_tool("search", Some("IO")));
        registry.clear();

        assert!(registry.is_empty());
        assert!(registry.categories().is_empty());
    }
}

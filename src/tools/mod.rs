pub mod function_tool;
pub mod registry;
pub mod schema;
pub mod tool;

pub use function_tool::FunctionTool;
pub use registry::ToolRegistry;
pub use schema::{ToolMetadata, ToolParameter, ToolResult};
pub use tool::Tool;

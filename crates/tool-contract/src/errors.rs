use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ToolError {
    #[error("no active tab")]
    NoActiveTab,
    #[error("invalid input for {tool}: {reason}")]
    InvalidInput { tool: String, reason: String },
    #[error("tool not found: {0}")]
    UnknownTool(String),
    #[error("tool already registered: {0}")]
    DuplicateTool(String),
}

use std::fmt;

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TabId(pub String);

impl TabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CallId(pub String);

impl CallId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure raised by a page-evaluation collaborator while running a script.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScriptFailure {
    /// The script threw an `Error`-shaped value.
    #[error("{name}: {message}")]
    Exception { name: String, message: String },
    /// The script threw something that is not an error object.
    #[error("uncaught value: {0}")]
    Thrown(Value),
    #[error("execution context detached: {0}")]
    Detached(String),
    #[error("evaluation timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
    #[error("transport failure: {0}")]
    Transport(String),
}

impl ScriptFailure {
    pub fn exception(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Exception {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Human-readable message for callers. Never empty.
    pub fn message(&self) -> String {
        match self {
            ScriptFailure::Exception { name, message } => {
                if !message.is_empty() {
                    message.clone()
                } else if !name.is_empty() {
                    name.clone()
                } else {
                    "Error".to_string()
                }
            }
            ScriptFailure::Thrown(value) => stringify_thrown(value),
            ScriptFailure::Detached(reason) if reason.trim().is_empty() => {
                "execution context detached".to_string()
            }
            ScriptFailure::Transport(reason) if reason.trim().is_empty() => {
                "transport failure".to_string()
            }
            other => other.to_string(),
        }
    }
}

fn stringify_thrown(value: &Value) -> String {
    match value {
        Value::String(text) if !text.is_empty() => text.clone(),
        Value::String(_) => "uncaught empty string".to_string(),
        other => other.to_string(),
    }
}

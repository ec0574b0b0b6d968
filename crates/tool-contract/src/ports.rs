use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use pagescript_core_types::{ScriptFailure, TabId};
use serde_json::Value;

use crate::errors::ToolError;

/// Script evaluation against a live page.
#[async_trait]
pub trait PagePort: Send + Sync {
    async fn evaluate(&self, script: &str) -> Result<Value, ScriptFailure>;
}

#[derive(Clone)]
pub struct Tab {
    pub id: TabId,
    pub page: Arc<dyn PagePort>,
}

impl Tab {
    pub fn new(id: TabId, page: Arc<dyn PagePort>) -> Self {
        Self { id, page }
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab").field("id", &self.id).finish()
    }
}

/// Per-call view of the browser session.
pub trait ToolContext: Send + Sync {
    fn current_tab(&self) -> Option<Tab>;

    fn current_tab_or_die(&self) -> Result<Tab, ToolError> {
        self.current_tab().ok_or(ToolError::NoActiveTab)
    }
}

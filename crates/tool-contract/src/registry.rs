use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::api::Tool;
use crate::descriptor::ExecutionDescriptor;
use crate::errors::ToolError;
use crate::ports::ToolContext;
use crate::schema::{Capability, ToolSchema};

/// Schema plus capability, as advertised to clients.
#[derive(Clone, Debug, Serialize)]
pub struct ToolDefinition {
    pub capability: Capability,
    #[serde(flatten)]
    pub schema: ToolSchema,
}

/// Tools available to one orchestrator, keyed by unique name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every tool whose capability is core or listed in `enabled`.
    pub fn with_capabilities(
        tools: impl IntoIterator<Item = Arc<dyn Tool>>,
        enabled: &[Capability],
    ) -> Result<Self, ToolError> {
        let registry = Self::new();
        for tool in tools {
            let capability = tool.capability();
            if capability.is_core() || enabled.contains(&capability) {
                registry.register(tool)?;
            } else {
                debug!(tool = tool.name(), %capability, "skipping tool with disabled capability");
            }
        }
        Ok(registry)
    }

    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        let mut guard = self.tools.write();
        if guard.contains_key(&name) {
            return Err(ToolError::DuplicateTool(name));
        }
        info!(tool = %name, capability = %tool.capability(), "registering tool");
        guard.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .read()
            .values()
            .map(|tool| tool.schema().clone())
            .collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .read()
            .values()
            .map(|tool| ToolDefinition {
                capability: tool.capability(),
                schema: tool.schema().clone(),
            })
            .collect()
    }

    pub fn handle(
        &self,
        name: &str,
        ctx: &dyn ToolContext,
        input: Value,
    ) -> Result<ExecutionDescriptor, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.handle(ctx, input)
    }
}

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::descriptor::ExecutionDescriptor;
use crate::errors::ToolError;
use crate::ports::ToolContext;
use crate::schema::{Capability, ToolSchema};

/// One callable capability exposed to the orchestrator.
pub trait Tool: Send + Sync {
    fn capability(&self) -> Capability;

    fn schema(&self) -> &ToolSchema;

    /// Validates `input` and returns the descriptor for this call. Must not
    /// run the deferred action.
    fn handle(
        &self,
        ctx: &dyn ToolContext,
        input: Value,
    ) -> Result<ExecutionDescriptor, ToolError>;

    fn name(&self) -> &str {
        &self.schema().name
    }
}

/// Deserializes raw call arguments into the tool's typed input.
///
/// Missing or mistyped fields are rejected; unknown keys are dropped.
pub fn validate_input<P: DeserializeOwned>(tool: &str, input: Value) -> Result<P, ToolError> {
    if !input.is_object() {
        return Err(ToolError::InvalidInput {
            tool: tool.to_string(),
            reason: "arguments must be a JSON object".to_string(),
        });
    }
    serde_json::from_value(input).map_err(|err| ToolError::InvalidInput {
        tool: tool.to_string(),
        reason: err.to_string(),
    })
}

/// Tool built from a typed handler closure.
pub struct TypedTool<P, H> {
    capability: Capability,
    schema: ToolSchema,
    handler: H,
    _input: PhantomData<fn() -> P>,
}

pub fn define_tool<P, H>(capability: Capability, schema: ToolSchema, handler: H) -> TypedTool<P, H>
where
    P: DeserializeOwned,
    H: Fn(&dyn ToolContext, P) -> Result<ExecutionDescriptor, ToolError> + Send + Sync,
{
    TypedTool {
        capability,
        schema,
        handler,
        _input: PhantomData,
    }
}

impl<P, H> Tool for TypedTool<P, H>
where
    P: DeserializeOwned,
    H: Fn(&dyn ToolContext, P) -> Result<ExecutionDescriptor, ToolError> + Send + Sync,
{
    fn capability(&self) -> Capability {
        self.capability
    }

    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    fn handle(
        &self,
        ctx: &dyn ToolContext,
        input: Value,
    ) -> Result<ExecutionDescriptor, ToolError> {
        let params = validate_input::<P>(&self.schema.name, input)?;
        (self.handler)(ctx, params)
    }
}

//! Contract between browser tools and the orchestrator that sequences them.
//!
//! A tool declares a [`ToolSchema`], turns validated input into an
//! [`ExecutionDescriptor`] and leaves the real work to a [`DeferredAction`]
//! that the orchestrator runs when it is ready.

pub mod api;
pub mod descriptor;
pub mod errors;
pub mod output;
pub mod ports;
pub mod registry;
pub mod schema;

pub use api::{define_tool, validate_input, Tool, TypedTool};
pub use descriptor::{DeferredAction, ExecutionDescriptor};
pub use errors::ToolError;
pub use output::{Content, ToolOutput};
pub use ports::{PagePort, Tab, ToolContext};
pub use registry::{ToolDefinition, ToolRegistry};
pub use schema::{Capability, MutationType, ToolSchema};

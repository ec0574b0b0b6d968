//! `browser_execute_js`: evaluate caller-supplied script in the active tab.

pub mod api;
pub mod model;

mod action;
mod audit;

use std::sync::Arc;

use tool_contract::Tool;

pub use action::run_script;
pub use api::{execute_javascript, TOOL_DESCRIPTION, TOOL_NAME, TOOL_TITLE};
pub use audit::audit_lines;
pub use model::{ExecuteJsParams, ResultEnvelope};

/// Tools exported by this crate, configured with the snapshot flag.
pub fn tools(capture_snapshot: bool) -> Vec<Arc<dyn Tool>> {
    vec![execute_javascript(capture_snapshot)]
}

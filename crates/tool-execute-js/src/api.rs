use std::sync::Arc;

use tool_contract::{
    define_tool, Capability, DeferredAction, ExecutionDescriptor, MutationType, Tool,
    ToolContext, ToolSchema,
};

use crate::action::run_script;
use crate::audit::audit_lines;
use crate::model::ExecuteJsParams;

pub const TOOL_NAME: &str = "browser_execute_js";
pub const TOOL_TITLE: &str = "Execute JavaScript";
pub const TOOL_DESCRIPTION: &str =
    "Execute JavaScript code in the browser context and return the result";

/// Builds the tool. Arbitrary script can change page state, so it is always
/// classified destructive.
pub fn execute_javascript(capture_snapshot: bool) -> Arc<dyn Tool> {
    let schema = ToolSchema::for_input::<ExecuteJsParams>(
        TOOL_NAME,
        TOOL_TITLE,
        TOOL_DESCRIPTION,
        MutationType::Destructive,
    );
    Arc::new(define_tool(
        Capability::Core,
        schema,
        move |ctx: &dyn ToolContext, params: ExecuteJsParams| {
            let tab = ctx.current_tab_or_die()?;
            let code = audit_lines(&params.code);
            let page = tab.page;
            let script = params.code;
            Ok(ExecutionDescriptor {
                code,
                action: DeferredAction::new(move || run_script(page, script)),
                capture_snapshot,
                wait_for_network: false,
            })
        },
    ))
}

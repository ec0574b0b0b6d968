//! Reference orchestrator used by the CLI: resolves a tool, logs its audit
//! lines, runs the deferred action and applies the follow-up flags.

use std::time::Instant;

use pagescript_core_types::CallId;
use serde::Serialize;
use serde_json::Value;
use tool_contract::{ExecutionDescriptor, ToolContext, ToolError, ToolOutput, ToolRegistry};
use tracing::{debug, instrument, warn};

use crate::redact;

const TITLE_MAX_CHARS: usize = 128;

#[derive(Clone, Debug, Serialize)]
pub struct CallReport {
    pub call_id: CallId,
    pub tool: String,
    pub code: Vec<String>,
    pub output: ToolOutput,
    pub capture_snapshot: bool,
    pub wait_for_network: bool,
    pub elapsed_ms: u64,
}

pub struct ToolRunner<'a> {
    registry: &'a ToolRegistry,
    context: &'a dyn ToolContext,
}

impl<'a> ToolRunner<'a> {
    pub fn new(registry: &'a ToolRegistry, context: &'a dyn ToolContext) -> Self {
        Self { registry, context }
    }

    /// Handler failures propagate; everything after the descriptor is
    /// produced ends up in the report.
    #[instrument(skip(self, input))]
    pub async fn call(&self, tool: &str, input: Value) -> Result<CallReport, ToolError> {
        let started = Instant::now();
        let call_id = CallId::new();
        let ExecutionDescriptor {
            code,
            action,
            capture_snapshot,
            wait_for_network,
        } = self.registry.handle(tool, self.context, input)?;

        for line in &code {
            debug!(target: "pagescript::audit", call = %call_id, "{}", line);
        }
        if wait_for_network {
            debug!("network settle requested; no network watcher attached");
        }

        let mut output = action.run().await;
        if capture_snapshot {
            if let Some(section) = self.page_state().await {
                output.push_text(section);
            }
        }

        Ok(CallReport {
            call_id,
            tool: tool.to_string(),
            code,
            output,
            capture_snapshot,
            wait_for_network,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn page_state(&self) -> Option<String> {
        let Some(tab) = self.context.current_tab() else {
            warn!("snapshot requested but no active tab");
            return None;
        };
        let url = tab.page.evaluate("location.href").await;
        let title = tab.page.evaluate("document.title").await;
        match (url, title) {
            (Ok(url), Ok(title)) => Some(format_page_state(
                url.as_str().unwrap_or_default(),
                title.as_str().unwrap_or_default(),
            )),
            (Err(err), _) | (_, Err(err)) => {
                warn!(error = %err, "page state capture failed");
                None
            }
        }
    }
}

pub fn format_page_state(url: &str, title: &str) -> String {
    format!(
        "### Page state\n- Page URL: {}\n- Page Title: {}",
        redact::url(url),
        redact::title(title, TITLE_MAX_CHARS)
    )
}

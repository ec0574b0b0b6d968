use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use tool_contract::{PagePort, ToolOutput};
use tracing::{debug, instrument, warn};

use crate::model::ResultEnvelope;

/// Evaluates `code` verbatim in the page and folds the outcome into a
/// single text item holding a [`ResultEnvelope`]. Never fails.
#[instrument(skip_all, fields(code_len = code.len()))]
pub async fn run_script(page: Arc<dyn PagePort>, code: String) -> ToolOutput {
    let outcome = AssertUnwindSafe(page.evaluate(&code)).catch_unwind().await;
    let envelope = match outcome {
        Ok(Ok(value)) => {
            debug!("script evaluated");
            ResultEnvelope::success(value, Utc::now())
        }
        Ok(Err(failure)) => {
            warn!(error = %failure, "script evaluation failed");
            ResultEnvelope::failure(failure.message(), Utc::now())
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            warn!(error = %message, "script evaluation panicked");
            ResultEnvelope::failure(message, Utc::now())
        }
    };
    ToolOutput::text(envelope.to_pretty_text())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        format!("evaluation panicked: {text}")
    } else if let Some(text) = payload.downcast_ref::<String>() {
        format!("evaluation panicked: {text}")
    } else {
        "evaluation panicked".to_string()
    }
}

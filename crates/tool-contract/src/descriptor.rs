use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::output::ToolOutput;

/// Zero-argument async work bound at handle time and run later by the
/// orchestrator. The output type is infallible: every outcome must already
/// be folded into the returned [`ToolOutput`].
pub struct DeferredAction {
    inner: Box<dyn FnOnce() -> BoxFuture<'static, ToolOutput> + Send>,
}

impl DeferredAction {
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ToolOutput> + Send + 'static,
    {
        Self {
            inner: Box::new(move || action().boxed()),
        }
    }

    pub async fn run(self) -> ToolOutput {
        (self.inner)().await
    }
}

impl fmt::Debug for DeferredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeferredAction")
    }
}

/// What a tool hands back for one call.
#[derive(Debug)]
pub struct ExecutionDescriptor {
    /// Human-readable restatement of the operation, for logs and audit.
    pub code: Vec<String>,
    pub action: DeferredAction,
    pub capture_snapshot: bool,
    pub wait_for_network: bool,
}

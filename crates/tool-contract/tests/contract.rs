use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pagescript_core_types::{ScriptFailure, TabId};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use tool_contract::{
    define_tool, validate_input, Capability, DeferredAction, ExecutionDescriptor, MutationType,
    PagePort, Tab, Tool, ToolContext, ToolError, ToolOutput, ToolRegistry, ToolSchema,
};

#[derive(Debug, Deserialize, JsonSchema)]
struct EchoParams {
    text: String,
}

struct NullPage;

#[async_trait]
impl PagePort for NullPage {
    async fn evaluate(&self, _script: &str) -> Result<Value, ScriptFailure> {
        Ok(Value::Null)
    }
}

struct StaticContext(Option<Tab>);

impl ToolContext for StaticContext {
    fn current_tab(&self) -> Option<Tab> {
        self.0.clone()
    }
}

fn with_tab() -> StaticContext {
    StaticContext(Some(Tab::new(TabId::new(), Arc::new(NullPage))))
}

fn echo_tool(name: &str, capability: Capability, calls: Arc<AtomicUsize>) -> Arc<dyn Tool> {
    let schema =
        ToolSchema::for_input::<EchoParams>(name, "Echo", "Echo text", MutationType::ReadOnly);
    Arc::new(define_tool(
        capability,
        schema,
        move |ctx: &dyn ToolContext, params: EchoParams| {
            calls.fetch_add(1, Ordering::SeqCst);
            ctx.current_tab_or_die()?;
            let text = params.text.clone();
            Ok(ExecutionDescriptor {
                code: vec![format!("// echo {}", params.text)],
                action: DeferredAction::new(move || async move { ToolOutput::text(text) }),
                capture_snapshot: false,
                wait_for_network: false,
            })
        },
    ))
}

#[test]
fn registry_rejects_duplicate_names() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = ToolRegistry::new();
    registry
        .register(echo_tool("echo", Capability::Core, calls.clone()))
        .unwrap();
    let err = registry
        .register(echo_tool("echo", Capability::Core, calls))
        .unwrap_err();
    assert_eq!(err, ToolError::DuplicateTool("echo".into()));
    assert_eq!(registry.len(), 1);
}

#[test]
fn capability_filter_keeps_core_tools() {
    let calls = Arc::new(AtomicUsize::new(0));
    let tools = vec![
        echo_tool("core_echo", Capability::Core, calls.clone()),
        echo_tool("tab_echo", Capability::CoreTabs, calls.clone()),
        echo_tool("pdf_echo", Capability::Pdf, calls.clone()),
        echo_tool("wait_echo", Capability::Wait, calls),
    ];
    let registry = ToolRegistry::with_capabilities(tools, &[Capability::Wait]).unwrap();
    assert!(registry.contains("core_echo"));
    assert!(registry.contains("tab_echo"));
    assert!(registry.contains("wait_echo"));
    assert!(!registry.contains("pdf_echo"));

    let names: Vec<String> = registry.schemas().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["core_echo", "tab_echo", "wait_echo"]);
}

#[test]
fn invalid_input_never_reaches_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let tool = echo_tool("echo", Capability::Core, calls.clone());
    let ctx = with_tab();

    let missing = tool.handle(&ctx, json!({})).unwrap_err();
    assert!(matches!(missing, ToolError::InvalidInput { .. }));
    let mistyped = tool.handle(&ctx, json!({ "text": 7 })).unwrap_err();
    assert!(matches!(mistyped, ToolError::InvalidInput { .. }));
    let not_object = tool.handle(&ctx, json!("text")).unwrap_err();
    assert!(matches!(not_object, ToolError::InvalidInput { .. }));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn validate_input_ignores_unknown_keys() {
    let params: EchoParams =
        validate_input("echo", json!({ "text": "hi", "extra": true })).unwrap();
    assert_eq!(params.text, "hi");
}

#[test]
fn missing_tab_fails_in_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = ToolRegistry::new();
    registry
        .register(echo_tool("echo", Capability::Core, calls))
        .unwrap();
    let err = registry
        .handle("echo", &StaticContext(None), json!({ "text": "hi" }))
        .unwrap_err();
    assert_eq!(err, ToolError::NoActiveTab);
    assert_eq!(err.to_string(), "no active tab");
}

#[test]
fn unknown_tool_is_reported() {
    let registry = ToolRegistry::new();
    let err = registry
        .handle("nope", &with_tab(), json!({}))
        .unwrap_err();
    assert_eq!(err, ToolError::UnknownTool("nope".into()));
}

#[tokio::test]
async fn deferred_action_runs_only_when_invoked() {
    let ran = Arc::new(AtomicUsize::new(0));
    let counter = ran.clone();
    let action = DeferredAction::new(move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        ToolOutput::text("done")
    });
    assert_eq!(ran.load(Ordering::SeqCst), 0);

    let output = action.run().await;
    assert_eq!(ran.load(Ordering::SeqCst), 1);
    assert_eq!(output.first_text(), Some("done"));
    assert_eq!(
        serde_json::to_value(&output).unwrap(),
        json!({ "content": [{ "type": "text", "text": "done" }] })
    );
}

#[test]
fn definitions_carry_capability_and_type() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry =
        ToolRegistry::with_capabilities(vec![echo_tool("echo", Capability::Core, calls)], &[])
            .unwrap();
    let defs = serde_json::to_value(registry.definitions()).unwrap();
    assert_eq!(defs[0]["name"], json!("echo"));
    assert_eq!(defs[0]["capability"], json!("core"));
    assert_eq!(defs[0]["type"], json!("readOnly"));
    assert_eq!(defs[0]["inputSchema"]["required"], json!(["text"]));
}

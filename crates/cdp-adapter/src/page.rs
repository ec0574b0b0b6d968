use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use pagescript_core_types::ScriptFailure;
use serde_json::Value;
use tool_contract::PagePort;
use tracing::debug;

/// A page target evaluated through `Runtime.evaluate`.
#[derive(Clone, Debug)]
pub struct CdpPage {
    page: Page,
    timeout: Duration,
}

impl CdpPage {
    pub fn new(page: Page, timeout: Duration) -> Self {
        Self { page, timeout }
    }
}

#[async_trait]
impl PagePort for CdpPage {
    async fn evaluate(&self, script: &str) -> Result<Value, ScriptFailure> {
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .user_gesture(true)
            .build()
            .map_err(ScriptFailure::Transport)?;

        let after_ms = self.timeout.as_millis() as u64;
        let response = tokio::time::timeout(self.timeout, self.page.execute(params))
            .await
            .map_err(|_| ScriptFailure::Timeout { after_ms })?
            .map_err(|err| classify_cdp_error(&err, after_ms))?;

        if let Some(details) = &response.result.exception_details {
            let details = serde_json::to_value(details)
                .map_err(|err| ScriptFailure::Transport(err.to_string()))?;
            debug!(exception = %details, "Runtime.evaluate raised exception");
            return Err(failure_from_exception(&details));
        }

        // `undefined` and unserializable values (NaN, BigInt) carry no value.
        Ok(response.result.result.value.clone().unwrap_or(Value::Null))
    }
}

fn classify_cdp_error(err: &CdpError, after_ms: u64) -> ScriptFailure {
    match err {
        // chromiumoxide's own request deadline
        CdpError::Timeout => ScriptFailure::Timeout { after_ms },
        other => classify_protocol_error(&other.to_string()),
    }
}

/// Maps a protocol-level failure message onto the evaluation taxonomy.
pub fn classify_protocol_error(message: &str) -> ScriptFailure {
    let lower = message.to_ascii_lowercase();
    let detached = [
        "target closed",
        "no target with given id",
        "execution context was destroyed",
        "cannot find context",
        "session closed",
        "detached",
    ];
    if detached.iter().any(|needle| lower.contains(needle)) {
        ScriptFailure::Detached(message.to_string())
    } else {
        ScriptFailure::Transport(message.to_string())
    }
}

/// Converts `Runtime.ExceptionDetails` JSON into a [`ScriptFailure`].
pub fn failure_from_exception(details: &Value) -> ScriptFailure {
    let exception = details.get("exception");
    let field = |name: &str| {
        exception
            .and_then(|object| object.get(name))
            .and_then(Value::as_str)
    };

    if field("subtype") == Some("error") {
        let class_name = field("className").unwrap_or("Error");
        let description = field("description").unwrap_or_default();
        let (name, message) = split_error_description(description, class_name);
        return ScriptFailure::exception(name, message);
    }

    if let Some(value) = exception.and_then(|object| object.get("value")) {
        return ScriptFailure::Thrown(value.clone());
    }
    if field("type") == Some("undefined") {
        return ScriptFailure::Thrown(Value::String("undefined".to_string()));
    }
    if let Some(description) = field("description") {
        return ScriptFailure::Thrown(Value::String(description.to_string()));
    }

    let text = details
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or("Uncaught");
    ScriptFailure::exception("Error", text)
}

/// Splits `"TypeError: x is not a function\n    at <anonymous>:1:1"` into
/// name and message, dropping the stack.
fn split_error_description(description: &str, class_name: &str) -> (String, String) {
    let head = description
        .lines()
        .take_while(|line| !line.trim_start().starts_with("at "))
        .collect::<Vec<_>>()
        .join("\n");
    let head = head.trim();

    if let Some((name, message)) = head.split_once(": ") {
        if name == class_name || (!name.contains(char::is_whitespace) && name.ends_with("Error")) {
            return (name.to_string(), message.to_string());
        }
    }
    if head == class_name {
        return (class_name.to_string(), String::new());
    }
    (class_name.to_string(), head.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_object_yields_message() {
        let details = json!({
            "exceptionId": 1,
            "text": "Uncaught",
            "lineNumber": 0,
            "columnNumber": 6,
            "exception": {
                "type": "object",
                "subtype": "error",
                "className": "Error",
                "description": "Error: boom\n    at <anonymous>:1:7"
            }
        });
        assert_eq!(
            failure_from_exception(&details),
            ScriptFailure::exception("Error", "boom")
        );
    }

    #[test]
    fn syntax_error_keeps_its_name() {
        let details = json!({
            "text": "Uncaught",
            "exception": {
                "type": "object",
                "subtype": "error",
                "className": "SyntaxError",
                "description": "SyntaxError: Unexpected end of input"
            }
        });
        let failure = failure_from_exception(&details);
        assert_eq!(failure, ScriptFailure::exception("SyntaxError", "Unexpected end of input"));
        assert_eq!(failure.message(), "Unexpected end of input");
    }

    #[test]
    fn multiline_message_survives_stack_trimming() {
        let details = json!({
            "exception": {
                "subtype": "error",
                "className": "Error",
                "description": "Error: first\nsecond\n    at <anonymous>:1:7"
            }
        });
        assert_eq!(failure_from_exception(&details).message(), "first\nsecond");
    }

    #[test]
    fn empty_error_message() {
        let details = json!({
            "exception": { "subtype": "error", "className": "Error", "description": "Error\n    at x" }
        });
        assert_eq!(
            failure_from_exception(&details),
            ScriptFailure::exception("Error", "")
        );
    }

    #[test]
    fn thrown_primitive_is_passed_through() {
        let details = json!({ "exception": { "type": "string", "value": "nope" } });
        assert_eq!(
            failure_from_exception(&details),
            ScriptFailure::Thrown(json!("nope"))
        );
        let undefined = json!({ "exception": { "type": "undefined" } });
        assert_eq!(failure_from_exception(&undefined).message(), "undefined");
    }

    #[test]
    fn missing_exception_object_falls_back_to_text() {
        let details = json!({ "text": "Uncaught SyntaxError: Invalid or unexpected token" });
        assert_eq!(
            failure_from_exception(&details).message(),
            "Uncaught SyntaxError: Invalid or unexpected token"
        );
    }

    #[test]
    fn protocol_errors_are_classified() {
        assert!(matches!(
            classify_protocol_error("Execution context was destroyed."),
            ScriptFailure::Detached(_)
        ));
        assert!(matches!(
            classify_protocol_error("channel closed unexpectedly"),
            ScriptFailure::Transport(_)
        ));
    }

    #[test]
    fn command_timeout_is_reported_as_timeout() {
        let failure = classify_cdp_error(&CdpError::Timeout, 30_000);
        assert_eq!(failure, ScriptFailure::Timeout { after_ms: 30_000 });
        assert_eq!(failure.message(), "evaluation timed out after 30000ms");
    }

    #[test]
    fn closed_target_error_is_detached() {
        let err = CdpError::ChromeMessage("Target closed.".to_string());
        assert!(matches!(classify_cdp_error(&err, 1_000), ScriptFailure::Detached(_)));
    }
}

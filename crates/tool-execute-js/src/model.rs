use chrono::{DateTime, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Arguments accepted by `browser_execute_js`.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct ExecuteJsParams {
    /// JavaScript code to execute in the browser context
    pub code: String,
}

/// Normalized outcome of one evaluation. Exactly one of `result` and
/// `error` is set, matching `success`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(serialize_with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

impl ResultEnvelope {
    pub fn success(result: Value, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            timestamp,
        }
    }

    pub fn failure(error: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
            timestamp,
        }
    }

    /// Two-space indented JSON.
    pub fn to_pretty_text(&self) -> String {
        match serde_json::to_string_pretty(self) {
            Ok(text) => text,
            // Only reachable if a result value refuses to serialize.
            Err(err) => format!(
                "{{\n  \"success\": false,\n  \"error\": {},\n  \"timestamp\": \"{}\"\n}}",
                Value::String(format!("result could not be serialized: {err}")),
                format_timestamp(&self.timestamp)
            ),
        }
    }
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn iso_millis<S: Serializer>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(timestamp))
}

use std::fmt;

use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Capability group a tool belongs to. Anything under `core*` is always on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Core,
    CoreTabs,
    CoreInstall,
    Tabs,
    Pdf,
    History,
    Wait,
    Files,
    Install,
    Testing,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Core => "core",
            Capability::CoreTabs => "core-tabs",
            Capability::CoreInstall => "core-install",
            Capability::Tabs => "tabs",
            Capability::Pdf => "pdf",
            Capability::History => "history",
            Capability::Wait => "wait",
            Capability::Files => "files",
            Capability::Install => "install",
            Capability::Testing => "testing",
        }
    }

    pub fn is_core(&self) -> bool {
        self.as_str().starts_with("core")
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether running a tool can change page state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationType {
    ReadOnly,
    Destructive,
}

impl MutationType {
    pub fn is_destructive(&self) -> bool {
        matches!(self, MutationType::Destructive)
    }
}

/// Static description of one callable tool.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSchema {
    pub name: String,
    pub title: String,
    pub description: String,
    pub input_schema: RootSchema,
    #[serde(rename = "type")]
    pub mutation_type: MutationType,
}

impl ToolSchema {
    /// Builds a schema whose input contract is derived from `P`.
    pub fn for_input<P: JsonSchema>(
        name: &str,
        title: &str,
        description: &str,
        mutation_type: MutationType,
    ) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            input_schema: schemars::schema_for!(P),
            mutation_type,
        }
    }

    pub fn required_fields(&self) -> Vec<String> {
        self.input_schema
            .schema
            .object
            .as_ref()
            .map(|object| object.required.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct Probe {
        /// Selector to probe
        selector: String,
        depth: Option<u32>,
    }

    #[test]
    fn capability_core_prefix() {
        assert!(Capability::Core.is_core());
        assert!(Capability::CoreTabs.is_core());
        assert!(!Capability::Tabs.is_core());
        assert_eq!(
            serde_json::to_value(Capability::CoreInstall).unwrap(),
            json!("core-install")
        );
    }

    #[test]
    fn schema_serializes_mutation_as_type() {
        let schema =
            ToolSchema::for_input::<Probe>("probe", "Probe", "Probe a node", MutationType::ReadOnly);
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["type"], json!("readOnly"));
        assert_eq!(value["inputSchema"]["type"], json!("object"));
        assert_eq!(
            value["inputSchema"]["properties"]["selector"]["description"],
            json!("Selector to probe")
        );
        assert_eq!(schema.required_fields(), vec!["selector".to_string()]);
    }
}

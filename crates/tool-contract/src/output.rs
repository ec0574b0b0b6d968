use serde::{Deserialize, Serialize};

/// Content returned to the caller of a tool.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: Vec<Content>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
        }
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.content.push(Content::Text { text: text.into() });
    }

    /// Text of the first content item, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|item| match item {
            Content::Text { text } => text.as_str(),
        })
    }
}

//! Provider-agnostic conversation and tool-calling types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A capability request emitted by the model: a tool name plus JSON arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub args: Value,
}

/// One entry of a conversation, in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Turn {
    /// Text from the caller.
    User { text: String },
    /// Text from the model.
    Model { text: String },
    /// The model asked for a tool to be run.
    ToolCall(ToolInvocation),
    /// What the tool returned, tagged with the tool's name.
    ToolResult { name: String, content: String },
}

/// A reply from the model. May carry text, tool invocations, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTurn {
    pub text: Option<String>,
    pub invocations: Vec<ToolInvocation>,
}

impl ModelTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            invocations: Vec::new(),
        }
    }

    pub fn tool_call(name: impl Into<String>, args: Value) -> Self {
        Self {
            text: None,
            invocations: vec![ToolInvocation {
                name: name.into(),
                args,
            }],
        }
    }
}

/// JSON-schema description of one callable tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// Parameters schema as an object schema (`{"type": "object", ...}`).
    pub parameters: Value,
}

/// Whether the model should answer in free text or a JSON document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Text,
    Json,
}

/// Everything sent to the model for one round-trip.
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    pub system_instruction: Option<&'a str>,
    pub turns: &'a [Turn],
    pub tools: &'a [ToolDeclaration],
    pub temperature: Option<f32>,
    pub response_format: ResponseFormat,
}

impl<'a> GenerateRequest<'a> {
    /// A single user prompt with no tools and no system instruction.
    pub fn prompt(turns: &'a [Turn]) -> Self {
        Self {
            system_instruction: None,
            turns,
            tools: &[],
            temperature: None,
            response_format: ResponseFormat::Text,
        }
    }
}

//! Append-only turn log for a single agent run.

use crate::llm::{GenerateRequest, ResponseFormat, ToolDeclaration, ToolInvocation, Turn};

/// Conversation state owned by exactly one run. Turns can be appended but
/// never edited or removed; the whole log is resent on every round-trip.
#[derive(Debug, Clone)]
pub struct Conversation {
    system_instruction: String,
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            turns: Vec::new(),
        }
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::User { text: text.into() });
    }

    pub fn push_model_text(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::Model { text: text.into() });
    }

    pub fn push_tool_call(&mut self, invocation: ToolInvocation) {
        self.turns.push(Turn::ToolCall(invocation));
    }

    pub fn push_tool_result(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.turns.push(Turn::ToolResult {
            name: name.into(),
            content: content.into(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Borrow the log as a model request.
    pub fn request<'a>(
        &'a self,
        tools: &'a [ToolDeclaration],
        temperature: f32,
    ) -> GenerateRequest<'a> {
        GenerateRequest {
            system_instruction: Some(&self.system_instruction),
            turns: &self.turns,
            tools,
            temperature: Some(temperature),
            response_format: ResponseFormat::Text,
        }
    }
}

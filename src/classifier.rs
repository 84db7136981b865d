//! One-shot tag classification of a new note.
//!
//! A single JSON-mode call to the reasoning engine, no retry and no fallback
//! tagging on failure: the ingestion path surfaces the error and stores nothing.

use serde_json::Value;
use std::sync::Arc;

use crate::llm::{GenerateRequest, LlmError, ReasoningEngine, ResponseFormat, Turn};
use crate::notes::types::DEFAULT_TAGS;

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("classifier returned invalid JSON: {0}")]
    Parse(String),
}

pub struct TagClassifier {
    engine: Arc<dyn ReasoningEngine>,
}

impl TagClassifier {
    pub fn new(engine: Arc<dyn ReasoningEngine>) -> Self {
        Self { engine }
    }

    /// Ask the model for a comma-separated tag string for `text`.
    pub async fn classify(&self, text: &str) -> Result<String, ClassifyError> {
        let turns = [Turn::User {
            text: classification_prompt(text),
        }];
        let request = GenerateRequest {
            response_format: ResponseFormat::Json,
            ..GenerateRequest::prompt(&turns)
        };

        let turn = self.engine.generate(&request).await?;
        let raw = turn.text.unwrap_or_default();
        let tags = parse_tags(&raw)?;

        tracing::debug!(tags = %tags, "note classified");
        Ok(tags)
    }
}

fn classification_prompt(text: &str) -> String {
    format!(
        "Analyze this thought for a database. Input: '{text}'. \
         Output JSON keys: 'tags' (csv strings)."
    )
}

/// Extract the `tags` value from the model's JSON reply.
///
/// Accepts a string or an array of strings; a missing, null or empty value
/// yields [`DEFAULT_TAGS`].
pub fn parse_tags(raw: &str) -> Result<String, ClassifyError> {
    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|e| ClassifyError::Parse(e.to_string()))?;

    let Value::Object(object) = value else {
        return Err(ClassifyError::Parse("expected a JSON object".into()));
    };

    let tags = match object.get("tags") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(","),
        Some(other) => {
            return Err(ClassifyError::Parse(format!(
                "unexpected 'tags' value: {other}"
            )))
        }
    };

    if tags.is_empty() {
        Ok(DEFAULT_TAGS.to_string())
    } else {
        Ok(tags)
    }
}

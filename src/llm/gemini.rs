//! Gemini `generateContent` REST client.
//!
//! Maps [`GenerateRequest`] onto the Generative Language API wire format and the
//! first candidate of the response back onto a [`ModelTurn`]. There is no retry:
//! a failed round-trip surfaces as an [`LlmError`].

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::types::{GenerateRequest, ModelTurn, ResponseFormat, ToolDeclaration, ToolInvocation, Turn};
use super::{LlmError, ReasoningEngine};
use crate::config::ModelConfig;

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSet>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSet {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, config: &ModelConfig) -> Result<Self, LlmError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let mut key = header::HeaderValue::from_str(api_key)
            .map_err(|e| LlmError::Config(format!("invalid API key format: {e}")))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl ReasoningEngine for GeminiClient {
    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<ModelTurn, LlmError> {
        let body = build_request(request);
        tracing::debug!(
            model = %self.model,
            turns = request.turns.len(),
            tools = request.tools.len(),
            "sending generateContent request"
        );

        let response = self.client.post(self.url()).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        into_model_turn(parsed)
    }
}

fn build_request(request: &GenerateRequest<'_>) -> GenerateContentRequest {
    let system_instruction = request.system_instruction.map(|text| Content {
        role: None,
        parts: vec![Part {
            text: Some(text.to_string()),
            ..Default::default()
        }],
    });

    let tools = if request.tools.is_empty() {
        Vec::new()
    } else {
        vec![ToolSet {
            function_declarations: request.tools.iter().map(to_declaration).collect(),
        }]
    };

    let response_mime_type = match request.response_format {
        ResponseFormat::Text => None,
        ResponseFormat::Json => Some("application/json"),
    };

    GenerateContentRequest {
        contents: merge_roles(request.turns.iter().map(to_content)),
        system_instruction,
        tools,
        generation_config: GenerationConfig {
            temperature: request.temperature,
            response_mime_type,
        },
    }
}

/// Fold consecutive contents with the same role into one. Gemini requires a
/// `functionCall` to directly follow a user or function-response content, so a
/// model preamble and its tool call must travel as parts of a single content.
fn merge_roles(contents: impl Iterator<Item = Content>) -> Vec<Content> {
    let mut merged: Vec<Content> = Vec::new();
    for content in contents {
        match merged.last_mut() {
            Some(last) if last.role == content.role => last.parts.extend(content.parts),
            _ => merged.push(content),
        }
    }
    merged
}

fn to_content(turn: &Turn) -> Content {
    let (role, part) = match turn {
        Turn::User { text } => (
            "user",
            Part {
                text: Some(text.clone()),
                ..Default::default()
            },
        ),
        Turn::Model { text } => (
            "model",
            Part {
                text: Some(text.clone()),
                ..Default::default()
            },
        ),
        Turn::ToolCall(invocation) => (
            "model",
            Part {
                function_call: Some(FunctionCall {
                    name: invocation.name.clone(),
                    args: invocation.args.clone(),
                }),
                ..Default::default()
            },
        ),
        Turn::ToolResult { name, content } => (
            "user",
            Part {
                function_response: Some(FunctionResponse {
                    name: name.clone(),
                    response: json!({ "result": content }),
                }),
                ..Default::default()
            },
        ),
    };

    Content {
        role: Some(role.to_string()),
        parts: vec![part],
    }
}

fn to_declaration(tool: &ToolDeclaration) -> FunctionDeclaration {
    FunctionDeclaration {
        name: tool.name.clone(),
        description: tool.description.clone(),
        parameters: openapi_schema(&tool.parameters),
    }
}

/// Gemini's schema dialect spells types in upper case (`OBJECT`, `STRING`).
fn openapi_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let converted = match (key.as_str(), value) {
                        ("type", Value::String(t)) => Value::String(t.to_uppercase()),
                        _ => openapi_schema(value),
                    };
                    (key.clone(), converted)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(openapi_schema).collect()),
        other => other.clone(),
    }
}

fn into_model_turn(response: GenerateContentResponse) -> Result<ModelTurn, LlmError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(LlmError::EmptyResponse(reason));
    };

    let Some(content) = candidate.content else {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "candidate has no content".to_string());
        return Err(LlmError::EmptyResponse(reason));
    };

    let mut text = String::new();
    let mut invocations = Vec::new();
    for part in content.parts {
        if let Some(t) = part.text {
            text.push_str(&t);
        }
        if let Some(call) = part.function_call {
            invocations.push(ToolInvocation {
                name: call.name,
                args: call.args,
            });
        }
    }

    Ok(ModelTurn {
        text: (!text.is_empty()).then_some(text),
        invocations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<ModelTurn, LlmError> {
        into_model_turn(serde_json::from_str(raw).unwrap())
    }

    #[test]
    fn request_carries_system_tools_and_tool_results() {
        let turns = vec![
            Turn::User {
                text: "What did I say about the dentist?".into(),
            },
            Turn::ToolCall(ToolInvocation {
                name: "execute_sql".into(),
                args: json!({"sql_query": "SELECT 1"}),
            }),
            Turn::ToolResult {
                name: "execute_sql".into(),
                content: "No results found.".into(),
            },
        ];
        let tools = vec![ToolDeclaration {
            name: "execute_sql".into(),
            description: "run sql".into(),
            parameters: json!({
                "type": "object",
                "properties": {"sql_query": {"type": "string"}},
                "required": ["sql_query"]
            }),
        }];
        let request = GenerateRequest {
            system_instruction: Some("be brief"),
            turns: &turns,
            tools: &tools,
            temperature: Some(0.1),
            response_format: ResponseFormat::Text,
        };

        let body = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][1]["parts"][0]["functionCall"]["args"]["sql_query"], "SELECT 1");
        assert_eq!(
            body["contents"][2]["parts"][0]["functionResponse"]["response"]["result"],
            "No results found."
        );
        let params = &body["tools"][0]["functionDeclarations"][0]["parameters"];
        assert_eq!(params["type"], "OBJECT");
        assert_eq!(params["properties"]["sql_query"]["type"], "STRING");
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn preamble_and_tool_call_share_one_model_content() {
        let turns = vec![
            Turn::User {
                text: "When is the dentist?".into(),
            },
            Turn::Model {
                text: "Let me look that up.".into(),
            },
            Turn::ToolCall(ToolInvocation {
                name: "execute_sql".into(),
                args: json!({"sql_query": "SELECT * FROM memory"}),
            }),
            Turn::ToolResult {
                name: "execute_sql".into(),
                content: "No results found.".into(),
            },
        ];
        let body = serde_json::to_value(build_request(&GenerateRequest::prompt(&turns))).unwrap();

        let contents = body["contents"].as_array().unwrap();
        let roles: Vec<&str> = contents
            .iter()
            .map(|c| c["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, ["user", "model", "user"]);

        let model_parts = contents[1]["parts"].as_array().unwrap();
        assert_eq!(model_parts.len(), 2);
        assert_eq!(model_parts[0]["text"], "Let me look that up.");
        assert_eq!(model_parts[1]["functionCall"]["name"], "execute_sql");
    }

    #[test]
    fn json_format_sets_mime_type_and_omits_tools() {
        let turns = vec![Turn::User { text: "hi".into() }];
        let request = GenerateRequest {
            response_format: ResponseFormat::Json,
            ..GenerateRequest::prompt(&turns)
        };
        let body = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert!(body.get("tools").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn parses_function_call_turn() {
        let turn = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[
                {"functionCall":{"name":"execute_sql","args":{"sql_query":"SELECT * FROM memory"}}}
            ]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(turn.invocations.len(), 1);
        assert_eq!(turn.invocations[0].name, "execute_sql");
        assert_eq!(turn.invocations[0].args["sql_query"], "SELECT * FROM memory");
        assert_eq!(turn.text, None);
    }

    #[test]
    fn parses_text_turn_joining_parts() {
        let turn = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[
                {"text":"You have a dentist "},{"text":"appointment."}
            ]}}]}"#,
        )
        .unwrap();
        assert!(turn.invocations.is_empty());
        assert_eq!(turn.text.as_deref(), Some("You have a dentist appointment."));
    }

    #[test]
    fn blocked_prompt_is_empty_response() {
        let err = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse(ref r) if r == "SAFETY"));
    }

    #[test]
    fn candidate_without_content_is_empty_response() {
        let err = parse(r#"{"candidates":[{"finishReason":"RECITATION"}]}"#).unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse(ref r) if r == "RECITATION"));
    }
}

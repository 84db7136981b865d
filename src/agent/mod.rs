//! The agentic recall loop.
//!
//! [`AgentLoop::run`] seeds a [`Conversation`] with the system instruction and
//! the caller's question, then alternates between the reasoning engine and the
//! query executor:
//!
//! ```text
//! AwaitingResponse --model turn has a tool call--> ToolRequested --result appended--> AwaitingResponse
//!        \--model turn is text only--> Done
//! ```
//!
//! Exactly one tool invocation is open at a time. Every executor result,
//! including refusals and SQL errors, is appended to the conversation so the
//! model can revise its next query. The run fails if the model keeps asking for
//! queries past `max_tool_calls` or the whole run exceeds its time budget.

pub mod conversation;
pub mod prompt;
pub mod tools;

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

use crate::config::AgentConfig;
use crate::llm::{LlmError, ModelTurn, ReasoningEngine, ToolDeclaration, ToolInvocation};
use crate::query::QueryExecutor;

pub use conversation::Conversation;
pub use tools::{AgentTool, ToolParseError};

/// Hard stops for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentLimits {
    pub max_tool_calls: usize,
    pub time_budget: Duration,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}

impl AgentLimits {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            max_tool_calls: config.max_tool_calls,
            time_budget: config.time_budget(),
        }
    }
}

/// The final answer of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub text: String,
    /// Number of queries executed to reach the answer.
    pub tool_calls: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("malformed tool invocation: {0}")]
    Tool(#[from] ToolParseError),
    #[error("model requested more than {limit} queries without answering")]
    ToolBudgetExhausted { limit: usize },
    #[error("no answer within {0:?}")]
    TimedOut(Duration),
    #[error("model ended the run without answer text")]
    EmptyAnswer,
    #[error("query task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// What the latest model turn asks the loop to do next.
#[derive(Debug)]
enum Step {
    ToolRequested {
        preamble: Option<String>,
        invocation: ToolInvocation,
        tool: AgentTool,
    },
    Done(String),
}

/// Drives one question to an answer. Holds only injected, shared components;
/// all per-run state lives in the run's own [`Conversation`].
pub struct AgentLoop {
    engine: Arc<dyn ReasoningEngine>,
    executor: Arc<dyn QueryExecutor>,
    limits: AgentLimits,
    temperature: f32,
    tools: Vec<ToolDeclaration>,
}

impl AgentLoop {
    pub fn new(
        engine: Arc<dyn ReasoningEngine>,
        executor: Arc<dyn QueryExecutor>,
        limits: AgentLimits,
        temperature: f32,
    ) -> Self {
        Self {
            engine,
            executor,
            limits,
            temperature,
            tools: AgentTool::declarations(),
        }
    }

    /// Answer `question`, dating the system instruction with today's local date.
    pub async fn run(&self, question: &str) -> Result<Answer, AgentError> {
        self.run_on(question, chrono::Local::now().date_naive()).await
    }

    /// Answer `question` as if today were `today`.
    pub async fn run_on(&self, question: &str, today: NaiveDate) -> Result<Answer, AgentError> {
        let run_id = uuid::Uuid::now_v7();
        let budget = self.limits.time_budget;

        async {
            tracing::info!(question_len = question.len(), "agent run started");
            match tokio::time::timeout(budget, self.drive(question, today)).await {
                Ok(result) => result,
                Err(_) => Err(AgentError::TimedOut(budget)),
            }
        }
        .instrument(tracing::info_span!("remind", %run_id))
        .await
    }

    async fn drive(&self, question: &str, today: NaiveDate) -> Result<Answer, AgentError> {
        let mut conversation = Conversation::new(prompt::system_instruction(today));
        conversation.push_user(question);

        let mut tool_calls = 0usize;
        loop {
            let turn = {
                let request = conversation.request(&self.tools, self.temperature);
                self.engine.generate(&request).await?
            };

            match next_step(turn)? {
                Step::Done(text) => {
                    tracing::info!(tool_calls, "agent answered");
                    return Ok(Answer { text, tool_calls });
                }
                Step::ToolRequested {
                    preamble,
                    invocation,
                    tool,
                } => {
                    if tool_calls >= self.limits.max_tool_calls {
                        tracing::warn!(
                            limit = self.limits.max_tool_calls,
                            "tool-call budget exhausted"
                        );
                        return Err(AgentError::ToolBudgetExhausted {
                            limit: self.limits.max_tool_calls,
                        });
                    }

                    let name = tool.name();
                    let result = self.call(tool).await?;
                    tool_calls += 1;

                    if let Some(text) = preamble {
                        conversation.push_model_text(text);
                    }
                    conversation.push_tool_call(invocation);
                    conversation.push_tool_result(name, result);
                }
            }
        }
    }

    async fn call(&self, tool: AgentTool) -> Result<String, AgentError> {
        match tool {
            AgentTool::ExecuteSql { sql_query } => {
                tracing::info!(sql = %sql_query, "running query");
                let executor = Arc::clone(&self.executor);
                let outcome =
                    tokio::task::spawn_blocking(move || executor.execute(&sql_query)).await?;
                if outcome.is_error() {
                    tracing::info!(result = %outcome, "query error fed back to model");
                }
                Ok(outcome.to_string())
            }
        }
    }
}

fn next_step(turn: ModelTurn) -> Result<Step, AgentError> {
    let ModelTurn { text, invocations } = turn;

    let mut invocations = invocations.into_iter();
    if let Some(invocation) = invocations.next() {
        let ignored = invocations.count();
        if ignored > 0 {
            tracing::warn!(ignored, "model sent parallel tool calls; answering the first only");
        }
        let tool = AgentTool::from_invocation(&invocation)?;
        return Ok(Step::ToolRequested {
            preamble: text.filter(|t| !t.trim().is_empty()),
            invocation,
            tool,
        });
    }

    match text {
        Some(text) if !text.trim().is_empty() => Ok(Step::Done(text)),
        _ => Err(AgentError::EmptyAnswer),
    }
}

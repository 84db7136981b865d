#![allow(dead_code)]

use async_trait::async_trait;
use dontforget::config::DontForgetConfig;
use dontforget::llm::{
    GenerateRequest, LlmError, ModelTurn, ReasoningEngine, ResponseFormat, Turn,
};
use dontforget::notes::{Note, NoteStore};
use dontforget::query::{QueryExecutor, QueryOutcome};
use dontforget::service::MemoryService;
use serde_json::json;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// A fresh database file inside a temp dir. Keep the `TempDir` alive.
pub fn temp_db() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("dontforget.db");
    (tmp, path)
}

/// Open a store on a new temp database.
pub fn temp_store() -> (TempDir, PathBuf, NoteStore) {
    let (tmp, path) = temp_db();
    let store = NoteStore::open(&path).unwrap();
    (tmp, path, store)
}

pub fn seed(store: &NoteStore, text: &str, tags: &str, timestamp: &str) {
    store
        .append(&Note::with_timestamp(text, tags, timestamp).unwrap())
        .unwrap();
}

/// A model turn that runs `sql` through `execute_sql`.
pub fn sql_call(sql: &str) -> ModelTurn {
    ModelTurn::tool_call("execute_sql", json!({ "sql_query": sql }))
}

/// What one `generate` call received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system_instruction: Option<String>,
    pub turns: Vec<Turn>,
    pub tool_names: Vec<String>,
    pub response_format: ResponseFormat,
}

/// Reasoning engine that replays canned turns in order and records requests.
pub struct ScriptedEngine {
    replies: Mutex<VecDeque<Result<ModelTurn, String>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    delay: Option<Duration>,
}

impl ScriptedEngine {
    pub fn new(replies: impl IntoIterator<Item = ModelTurn>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    /// An engine whose every call fails with an API error.
    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new((0..8).map(|_| Err(message.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    /// An engine that sleeps before every reply.
    pub fn slow(replies: impl IntoIterator<Item = ModelTurn>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<ModelTurn, LlmError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            system_instruction: request.system_instruction.map(String::from),
            turns: request.turns.to_vec(),
            tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
            response_format: request.response_format,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(turn)) => Ok(turn),
            Some(Err(message)) => Err(LlmError::Api {
                status: 503,
                message,
            }),
            None => Err(LlmError::EmptyResponse("script exhausted".into())),
        }
    }
}

/// Executor double that records every query and answers with a fixed outcome.
pub struct CountingExecutor {
    queries: Mutex<Vec<String>>,
    outcome: QueryOutcome,
}

impl CountingExecutor {
    pub fn new(outcome: QueryOutcome) -> Arc<Self> {
        Arc::new(Self {
            queries: Mutex::new(Vec::new()),
            outcome,
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl QueryExecutor for CountingExecutor {
    fn execute(&self, sql: &str) -> QueryOutcome {
        self.queries.lock().unwrap().push(sql.to_string());
        self.outcome.clone()
    }
}

/// A production-wired service on a temp database, driven by `engine`.
pub fn service_with(engine: Arc<ScriptedEngine>) -> (TempDir, MemoryService) {
    let (tmp, path) = temp_db();
    let config = DontForgetConfig::default();
    let engine: Arc<dyn ReasoningEngine> = engine;
    let service = MemoryService::with_engine(&config, &path, engine).unwrap();
    (tmp, service)
}

//! Ingestion and recall paths, shared by the HTTP server and the CLI.
//!
//! [`MemoryService`] holds the injected components: the note store, the tag
//! classifier and the agent loop. It is constructed once and shared behind an
//! `Arc`; nothing per-request is kept on it.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::agent::{AgentError, AgentLimits, AgentLoop, Answer};
use crate::classifier::{ClassifyError, TagClassifier};
use crate::config::DontForgetConfig;
use crate::llm::{GeminiClient, ReasoningEngine};
use crate::notes::types::NoteError;
use crate::notes::{Note, NoteStore};
use crate::query::{GuardedExecutor, QueryExecutor};

/// Response of a successful `remember`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedNote {
    pub status: &'static str,
    pub tags: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RememberError {
    #[error(transparent)]
    InvalidNote(#[from] NoteError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error("failed to store note: {0}")]
    Store(String),
}

pub struct MemoryService {
    store: NoteStore,
    classifier: TagClassifier,
    agent: AgentLoop,
}

impl MemoryService {
    pub fn new(store: NoteStore, classifier: TagClassifier, agent: AgentLoop) -> Self {
        Self {
            store,
            classifier,
            agent,
        }
    }

    /// Wire the production components: the note store at `db_path`, a read-only
    /// executor on the same file, and one reasoning engine shared by the
    /// classifier and the agent.
    pub fn with_engine(
        config: &DontForgetConfig,
        db_path: &Path,
        engine: Arc<dyn ReasoningEngine>,
    ) -> Result<Self> {
        let store = NoteStore::open(db_path)?;
        let executor: Arc<dyn QueryExecutor> = Arc::new(GuardedExecutor::open(db_path)?);

        let classifier = TagClassifier::new(Arc::clone(&engine));
        let agent = AgentLoop::new(
            engine,
            executor,
            AgentLimits::from_config(&config.agent),
            config.model.temperature,
        );

        Ok(Self::new(store, classifier, agent))
    }

    /// [`with_engine`](Self::with_engine) backed by the Gemini client.
    pub fn from_config(config: &DontForgetConfig, engine_api_key: &str) -> Result<Self> {
        let engine: Arc<dyn ReasoningEngine> =
            Arc::new(GeminiClient::new(engine_api_key, &config.model)?);
        Self::with_engine(config, &config.resolved_db_path(), engine)
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Classify and append a note. Nothing is stored if classification fails.
    pub async fn remember(&self, text: &str) -> Result<SavedNote, RememberError> {
        if text.trim().is_empty() {
            return Err(NoteError::EmptyText.into());
        }

        tracing::info!(text_len = text.len(), "remember called");
        let tags = self.classifier.classify(text).await?;
        let note = Note::new(text, tags)?;

        let store = self.store.clone();
        let saved_tags = note.tags.clone();
        tokio::task::spawn_blocking(move || store.append(&note))
            .await
            .map_err(|e| RememberError::Store(format!("db task failed: {e}")))?
            .map_err(|e| RememberError::Store(e.to_string()))?;

        tracing::info!(tags = %saved_tags, "note saved");
        Ok(SavedNote {
            status: "saved",
            tags: saved_tags,
        })
    }

    /// Answer a question with the agent loop.
    pub async fn remind(&self, question: &str) -> Result<Answer, AgentError> {
        self.agent.run(question).await
    }
}

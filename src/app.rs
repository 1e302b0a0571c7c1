//! Application wiring for Kotoba.
//!
//! Builds the shared components every surface (CLI, HTTP) works
//! against: the vocabulary store, the embedder, and the dictionary
//! index. The index is built lazily on first use and then shared
//! read-only; a session never triggers a rebuild.

use crate::config::{Prompts, Settings};
use crate::dictionary::{load_corpus, DictionaryIndex};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{KotobaError, Result};
use crate::tutor::{ChatBackend, OpenAiBackend, ToolContext, TutorSession};
use crate::vocabulary::{MemoryVocabularyStore, SqliteVocabularyStore, VocabularyStore};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Shared application components.
pub struct App {
    settings: Settings,
    prompts: Prompts,
    store: Arc<dyn VocabularyStore>,
    embedder: Arc<dyn Embedder>,
    index: OnceCell<Arc<DictionaryIndex>>,
}

impl App {
    /// Create the app from settings, opening the configured store.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let store: Arc<dyn VocabularyStore> = match settings.store.provider.as_str() {
            "sqlite" => Arc::new(SqliteVocabularyStore::new(&settings.sqlite_path())?),
            "memory" => {
                warn!("Using in-memory vocabulary store; entries will not persist");
                Arc::new(MemoryVocabularyStore::new())
            }
            other => {
                return Err(KotobaError::Config(format!(
                    "Unknown store provider: {}",
                    other
                )))
            }
        };

        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        Ok(Self {
            settings,
            prompts,
            store,
            embedder,
            index: OnceCell::new(),
        })
    }

    /// Get the vocabulary store.
    pub fn store(&self) -> Arc<dyn VocabularyStore> {
        self.store.clone()
    }

    /// Get the embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the dictionary index, building it from the corpus on first
    /// use. The built index is shared and never rebuilt mid-session.
    pub async fn index(&self) -> Result<Arc<DictionaryIndex>> {
        self.index
            .get_or_try_init(|| async {
                let corpus_path = self.settings.corpus_path();
                info!("Building dictionary index from {:?}", corpus_path);

                let entries = load_corpus(&corpus_path)?;
                let index =
                    DictionaryIndex::build(entries, self.embedder.clone()).await?;
                Ok(Arc::new(index))
            })
            .await
            .cloned()
    }

    /// Build a tool context bound to the shared store and index.
    pub async fn tool_context(&self) -> Result<ToolContext> {
        Ok(ToolContext::new(
            self.store.clone(),
            self.index().await?,
            self.embedder.clone(),
        )
        .with_target_goal(self.settings.tutor.target_goal)
        .with_lookup(
            self.settings.dictionary.lookup_limit,
            self.settings.dictionary.min_score,
        ))
    }

    /// Start a tutoring session against the configured OpenAI model.
    pub async fn new_session(&self, model_override: Option<&str>) -> Result<TutorSession> {
        let model = model_override.unwrap_or(&self.settings.tutor.model);
        let backend = Arc::new(OpenAiBackend::new(model));
        self.new_session_with_backend(backend).await
    }

    /// Start a tutoring session against an arbitrary backend.
    pub async fn new_session_with_backend(
        &self,
        backend: Arc<dyn ChatBackend>,
    ) -> Result<TutorSession> {
        let system_prompt = self.prompts.tutor_system(self.settings.tutor.target_goal);
        let tools = self.tool_context().await?;

        Ok(TutorSession::new(backend, tools, &system_prompt)
            .with_max_tool_rounds(self.settings.tutor.max_tool_rounds))
    }
}

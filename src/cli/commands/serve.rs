//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for tutoring, vocabulary management, and
//! dictionary lookup. Chat sessions are held in memory and addressed
//! by a server-issued session id.

use crate::app::App;
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::Embedder;
use crate::tutor::TutorSession;
use crate::vocabulary::{AddOutcome, DeleteOutcome, VocabStats, VocabularyStore};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Cap on concurrently held chat sessions.
const MAX_SESSIONS: usize = 100;

/// Shared application state.
struct ServerState {
    app: App,
    sessions: Mutex<SessionRegistry>,
}

/// Bounded registry of live chat sessions.
///
/// Sessions are only created by the server (never under a
/// client-chosen key) and the least recently used one is evicted when
/// the registry is full, so client traffic cannot grow the map without
/// bound.
struct SessionRegistry {
    sessions: HashMap<String, SessionSlot>,
    capacity: usize,
}

struct SessionSlot {
    session: Arc<Mutex<TutorSession>>,
    last_used: Instant,
}

impl SessionRegistry {
    fn new(capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Look up a session by id, refreshing its recency on hit.
    fn get(&mut self, id: &str) -> Option<Arc<Mutex<TutorSession>>> {
        let slot = self.sessions.get_mut(id)?;
        slot.last_used = Instant::now();
        Some(slot.session.clone())
    }

    /// Register a new session, evicting the least recently used entry
    /// if the registry is at capacity.
    fn insert(&mut self, id: String, session: TutorSession) -> Arc<Mutex<TutorSession>> {
        if self.sessions.len() >= self.capacity {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                self.sessions.remove(&oldest);
            }
        }

        let session = Arc::new(Mutex::new(session));
        self.sessions.insert(
            id,
            SessionSlot {
                session: session.clone(),
                last_used: Instant::now(),
            },
        );
        session
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let app = App::new(settings)?;

    // Build the index before accepting requests so the first chat
    // turn doesn't absorb the corpus embedding cost.
    let spinner = Output::spinner("Preparing dictionary index...");
    let index = app.index().await?;
    spinner.finish_and_clear();
    Output::info(&format!("Dictionary ready ({} entries)", index.len()));

    let state = Arc::new(ServerState {
        app,
        sessions: Mutex::new(SessionRegistry::new(MAX_SESSIONS)),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/vocabulary", get(list_vocabulary).post(add_vocabulary))
        .route("/vocabulary/random", get(random_vocabulary))
        .route("/vocabulary/{term}", delete(delete_vocabulary))
        .route("/stats", get(stats))
        .route("/lookup", post(lookup))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Kotoba API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Chat", "POST   /chat");
    Output::kv("List Vocabulary", "GET    /vocabulary");
    Output::kv("Add Vocabulary", "POST   /vocabulary");
    Output::kv("Random Sample", "GET    /vocabulary/random");
    Output::kv("Delete Vocabulary", "DELETE /vocabulary/:term");
    Output::kv("Stats", "GET    /stats");
    Output::kv("Lookup", "POST   /lookup");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    /// Omit to start a new session.
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    session_id: String,
    answer: String,
}

#[derive(Deserialize)]
struct AddRequest {
    term: String,
    meaning: String,
    #[serde(default)]
    example: Option<String>,
}

#[derive(Serialize)]
struct AddResponse {
    added: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    entry: Option<EntryInfo>,
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default = "default_list_limit")]
    limit: usize,
}

fn default_list_limit() -> usize {
    15
}

#[derive(Deserialize)]
struct RandomQuery {
    #[serde(default = "default_random_count")]
    count: usize,
}

fn default_random_count() -> usize {
    5
}

#[derive(Serialize)]
struct VocabularyResponse {
    entries: Vec<EntryInfo>,
    total: usize,
}

#[derive(Serialize)]
struct EntryInfo {
    id: String,
    term: String,
    meaning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<String>,
    added_at: DateTime<Utc>,
}

impl From<crate::vocabulary::VocabEntry> for EntryInfo {
    fn from(entry: crate::vocabulary::VocabEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            term: entry.term,
            meaning: entry.meaning,
            example: entry.example,
            added_at: entry.added_at,
        }
    }
}

#[derive(Serialize)]
struct StatsResponse {
    total: usize,
    target_goal: u32,
    progress: f32,
}

#[derive(Deserialize)]
struct LookupRequest {
    query: String,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    min_score: Option<f32>,
}

#[derive(Serialize)]
struct LookupResponse {
    matches: Vec<LookupMatch>,
}

#[derive(Serialize)]
struct LookupMatch {
    term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reading: Option<String>,
    meaning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<String>,
    score: f32,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn internal_error(e: impl std::fmt::Display) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let (session_id, session) = match req.session_id {
        // A client-supplied id must refer to a live session; unknown
        // ids are rejected rather than implicitly created.
        Some(id) => match state.sessions.lock().await.get(&id) {
            Some(session) => (id, session),
            None => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: format!("Unknown session: {}", id),
                    }),
                )
                    .into_response()
            }
        },
        None => {
            let id = Uuid::new_v4().to_string();
            let new_session = match state.app.new_session(None).await {
                Ok(s) => s,
                Err(e) => return internal_error(e),
            };
            let session = state.sessions.lock().await.insert(id.clone(), new_session);
            (id, session)
        }
    };

    let mut session = session.lock().await;
    match session.handle_turn(&req.message).await {
        Ok(answer) => Json(ChatResponse { session_id, answer }).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn add_vocabulary(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<AddRequest>,
) -> impl IntoResponse {
    match state
        .app
        .store()
        .add(&req.term, &req.meaning, req.example.as_deref())
        .await
    {
        Ok(AddOutcome::Added(entry)) => (
            StatusCode::CREATED,
            Json(AddResponse {
                added: true,
                entry: Some(entry.into()),
            }),
        )
            .into_response(),
        Ok(AddOutcome::Duplicate) => (
            StatusCode::CONFLICT,
            Json(AddResponse {
                added: false,
                entry: None,
            }),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

async fn list_vocabulary(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    match state.app.store().list_recent(query.limit).await {
        Ok(entries) => Json(VocabularyResponse {
            total: entries.len(),
            entries: entries.into_iter().map(EntryInfo::from).collect(),
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

async fn random_vocabulary(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<RandomQuery>,
) -> impl IntoResponse {
    match state.app.store().random_sample(query.count).await {
        Ok(entries) => Json(VocabularyResponse {
            total: entries.len(),
            entries: entries.into_iter().map(EntryInfo::from).collect(),
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

async fn delete_vocabulary(
    State(state): State<Arc<ServerState>>,
    Path(term): Path<String>,
) -> impl IntoResponse {
    match state.app.store().delete(&term).await {
        Ok(DeleteOutcome::Deleted) => StatusCode::NO_CONTENT.into_response(),
        Ok(DeleteOutcome::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Not in vocabulary: {}", term),
            }),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

async fn stats(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    match state.app.store().count().await {
        Ok(total) => {
            let stats = VocabStats::new(total, state.app.settings().tutor.target_goal);
            Json(StatsResponse {
                total: stats.total,
                target_goal: stats.target_goal,
                progress: stats.progress,
            })
            .into_response()
        }
        Err(e) => internal_error(e),
    }
}

async fn lookup(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<LookupRequest>,
) -> impl IntoResponse {
    let settings = state.app.settings();
    let limit = req.limit.unwrap_or(settings.dictionary.lookup_limit);
    let min_score = req.min_score.unwrap_or(settings.dictionary.min_score);

    let index = match state.app.index().await {
        Ok(index) => index,
        Err(e) => return internal_error(e),
    };

    let query_embedding = match state.app.embedder().embed(&req.query).await {
        Ok(emb) => emb,
        Err(e) => return internal_error(e),
    };

    let matches = index.search(&query_embedding, limit, min_score);

    Json(LookupResponse {
        matches: matches
            .into_iter()
            .map(|m| LookupMatch {
                term: m.entry.term,
                reading: m.entry.reading,
                meaning: m.entry.meaning,
                example: m.entry.example,
                score: m.score,
            })
            .collect(),
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{DictionaryEntry, DictionaryIndex};
    use crate::embedding::test_support::StaticEmbedder;
    use crate::tutor::{OpenAiBackend, ToolContext};
    use crate::vocabulary::MemoryVocabularyStore;
    use std::collections::HashMap;
    use std::time::Duration;

    async fn test_session() -> TutorSession {
        let entries = vec![DictionaryEntry {
            term: "猫".to_string(),
            reading: Some("ねこ".to_string()),
            meaning: "kucing".to_string(),
            example: None,
        }];

        let mut vectors = HashMap::new();
        vectors.insert(entries[0].embedding_text(), vec![1.0, 0.0]);
        let embedder = Arc::new(StaticEmbedder::new(vectors, vec![0.0, 1.0]));

        let index = Arc::new(
            DictionaryIndex::build(entries, embedder.clone())
                .await
                .unwrap(),
        );
        let tools = ToolContext::new(Arc::new(MemoryVocabularyStore::new()), index, embedder);

        TutorSession::new(Arc::new(OpenAiBackend::new("gpt-4o-mini")), tools, "prompt")
    }

    #[tokio::test]
    async fn test_registry_evicts_oldest_at_capacity() {
        let mut registry = SessionRegistry::new(2);

        registry.insert("a".to_string(), test_session().await);
        std::thread::sleep(Duration::from_millis(2));
        registry.insert("b".to_string(), test_session().await);
        std::thread::sleep(Duration::from_millis(2));
        registry.insert("c".to_string(), test_session().await);

        assert_eq!(registry.len(), 2);
        assert!(registry.get("a").is_none());
        assert!(registry.get("b").is_some());
        assert!(registry.get("c").is_some());
    }

    #[tokio::test]
    async fn test_registry_get_refreshes_recency() {
        let mut registry = SessionRegistry::new(2);

        registry.insert("a".to_string(), test_session().await);
        std::thread::sleep(Duration::from_millis(2));
        registry.insert("b".to_string(), test_session().await);
        std::thread::sleep(Duration::from_millis(2));

        // Touching "a" makes "b" the eviction candidate
        registry.get("a").unwrap();
        std::thread::sleep(Duration::from_millis(2));
        registry.insert("c".to_string(), test_session().await);

        assert!(registry.get("a").is_some());
        assert!(registry.get("b").is_none());
        assert!(registry.get("c").is_some());
    }

    #[tokio::test]
    async fn test_registry_unknown_id_is_a_miss() {
        let mut registry = SessionRegistry::new(2);
        assert!(registry.get("never-issued").is_none());
        assert_eq!(registry.len(), 0);
    }
}

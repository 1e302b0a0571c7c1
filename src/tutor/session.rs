//! Tutoring session with the tool calling loop.
//!
//! A session owns its message history. `handle_turn` resolves one user
//! turn completely: it loops between the completion endpoint and tool
//! execution until the model produces a plain answer, the round cap is
//! reached, or the endpoint fails twice. Every exit path yields an
//! assistant message; no failure escapes as a panic or process exit.

use super::tools::{parse_tool_call, tool_definitions, ToolContext};
use crate::error::{KotobaError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default cap on endpoint rounds within a single user turn.
const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;

/// How many messages to keep when trimming history between turns.
const HISTORY_TRIM_LEN: usize = 40;

/// One decoded response from the completion endpoint: either a final
/// answer or a batch of tool invocation requests.
#[derive(Debug, Clone)]
pub enum ChatTurn {
    Answer(String),
    ToolCalls(Vec<ChatCompletionMessageToolCall>),
}

/// Seam over the completion endpoint so the loop can be driven by a
/// scripted endpoint in tests.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send history plus tool schemas, get back a decoded turn.
    async fn complete(
        &self,
        messages: &[ChatCompletionRequestMessage],
        tools: Vec<ChatCompletionTool>,
    ) -> Result<ChatTurn>;
}

/// OpenAI chat completions backend.
pub struct OpenAiBackend {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAiBackend {
    /// Create a backend for the given model.
    pub fn new(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(
        &self,
        messages: &[ChatCompletionRequestMessage],
        tools: Vec<ChatCompletionTool>,
    ) -> Result<ChatTurn> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages.to_vec())
            .tools(tools)
            .build()
            .map_err(|e| KotobaError::Tutor(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("timed out") || msg.contains("timeout") {
                KotobaError::EndpointTimeout(msg)
            } else {
                KotobaError::OpenAI(format!("Chat API error: {}", msg))
            }
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| KotobaError::Tutor("No response from model".to_string()))?;

        match choice.message.tool_calls {
            Some(tool_calls) if !tool_calls.is_empty() => Ok(ChatTurn::ToolCalls(tool_calls)),
            _ => Ok(ChatTurn::Answer(choice.message.content.unwrap_or_default())),
        }
    }
}

/// A tutoring conversation with tool calling support.
pub struct TutorSession {
    backend: Arc<dyn ChatBackend>,
    tools: ToolContext,
    messages: Vec<ChatCompletionRequestMessage>,
    max_tool_rounds: usize,
}

impl TutorSession {
    /// Create a new session seeded with the system prompt.
    pub fn new(backend: Arc<dyn ChatBackend>, tools: ToolContext, system_prompt: &str) -> Self {
        let system_message = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .expect("Failed to build system message");

        Self {
            backend,
            tools,
            messages: vec![system_message.into()],
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Override the round cap.
    pub fn with_max_tool_rounds(mut self, max: usize) -> Self {
        self.max_tool_rounds = max.max(1);
        self
    }

    /// Clear conversation history (keeps the system prompt).
    pub fn clear_history(&mut self) {
        self.messages.truncate(1);
    }

    /// Number of messages currently held, including the system prompt.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Resolve one user turn and return the assistant's answer.
    ///
    /// Tool-call rounds are executed synchronously in the order the
    /// model requested them; tool failures become tool-result messages
    /// for the model rather than surfacing raw to the user.
    pub async fn handle_turn(&mut self, user_input: &str) -> Result<String> {
        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(user_input)
            .build()
            .map_err(|e| KotobaError::Tutor(e.to_string()))?;
        self.messages.push(user_message.into());

        for round in 1..=self.max_tool_rounds {
            debug!("Tutor round {}, {} messages", round, self.messages.len());

            let turn = match self.complete_with_retry().await {
                Ok(turn) => turn,
                Err(e) => {
                    warn!("Completion endpoint failed after retry: {}", e);
                    let degraded = "I couldn't reach the language model just now. \
                        Your session is intact; please try again in a moment."
                        .to_string();
                    self.push_assistant_text(&degraded)?;
                    return Ok(degraded);
                }
            };

            match turn {
                ChatTurn::Answer(content) => {
                    self.push_assistant_text(&content)?;
                    return Ok(content);
                }
                ChatTurn::ToolCalls(tool_calls) => {
                    let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                        .tool_calls(tool_calls.clone())
                        .build()
                        .map_err(|e| KotobaError::Tutor(e.to_string()))?;
                    self.messages.push(assistant_msg.into());

                    for tool_call in &tool_calls {
                        let result = self.execute_tool_call(tool_call).await;

                        let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                            .tool_call_id(&tool_call.id)
                            .content(result)
                            .build()
                            .map_err(|e| KotobaError::Tutor(e.to_string()))?;
                        self.messages.push(tool_msg.into());
                    }
                }
            }
        }

        // Round cap exceeded: recoverable, not fatal
        warn!(
            "Turn exceeded {} tool rounds, returning degraded answer",
            self.max_tool_rounds
        );
        let degraded = "I couldn't finish that tutoring action within the allowed \
            number of tool rounds. Try breaking the request into smaller steps."
            .to_string();
        self.push_assistant_text(&degraded)?;
        Ok(degraded)
    }

    /// Call the endpoint, retrying once on failure.
    async fn complete_with_retry(&self) -> Result<ChatTurn> {
        match self
            .backend
            .complete(&self.messages, tool_definitions())
            .await
        {
            Ok(turn) => Ok(turn),
            Err(first) => {
                warn!("Completion endpoint error, retrying once: {}", first);
                self.backend
                    .complete(&self.messages, tool_definitions())
                    .await
            }
        }
    }

    /// Execute a single tool call, folding failures into the result.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> String {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Tutor calling tool: {} with args: {}", name, arguments);

        match parse_tool_call(name, arguments) {
            Ok(tool) => match self.tools.execute(&tool).await {
                Ok(output) => output,
                Err(e) => format!("Tool error: {}", e),
            },
            Err(e) => format!("Failed to parse tool call: {}", e),
        }
    }

    /// Push the turn's closing assistant message and trim history.
    ///
    /// Every turn exits through here (answer, round cap, or endpoint
    /// failure), so trimming cannot be skipped by degraded turns.
    fn push_assistant_text(&mut self, content: &str) -> Result<()> {
        let msg = ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| KotobaError::Tutor(e.to_string()))?;
        self.messages.push(msg.into());
        self.trim_history(HISTORY_TRIM_LEN);
        Ok(())
    }

    /// Trim conversation history to keep it manageable between turns.
    fn trim_history(&mut self, max_messages: usize) {
        if self.messages.len() > max_messages {
            // Keep system message (index 0) and last N-1 messages
            let start = self.messages.len() - (max_messages - 1);
            let mut trimmed = vec![self.messages[0].clone()];
            trimmed.extend(self.messages[start..].iter().cloned());
            self.messages = trimmed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{DictionaryEntry, DictionaryIndex};
    use crate::embedding::test_support::StaticEmbedder;
    use crate::vocabulary::{MemoryVocabularyStore, VocabularyStore};
    use async_openai::types::{ChatCompletionToolType, FunctionCall};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Backend replaying a fixed script of turns.
    struct ScriptedBackend {
        script: Mutex<Vec<Result<ChatTurn>>>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<ChatTurn>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls_made(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn complete(
            &self,
            _messages: &[ChatCompletionRequestMessage],
            _tools: Vec<ChatCompletionTool>,
        ) -> Result<ChatTurn> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                // Past the script: keep asking for tools forever
                return Ok(ChatTurn::ToolCalls(vec![stats_call("call_loop")]));
            }
            script.remove(0)
        }
    }

    fn stats_call(id: &str) -> ChatCompletionMessageToolCall {
        ChatCompletionMessageToolCall {
            id: id.to_string(),
            r#type: ChatCompletionToolType::Function,
            function: FunctionCall {
                name: "vocabulary_stats".to_string(),
                arguments: "{}".to_string(),
            },
        }
    }

    fn add_call(id: &str, term: &str, meaning: &str) -> ChatCompletionMessageToolCall {
        ChatCompletionMessageToolCall {
            id: id.to_string(),
            r#type: ChatCompletionToolType::Function,
            function: FunctionCall {
                name: "add_vocabulary".to_string(),
                arguments: format!(r#"{{"term": "{}", "meaning": "{}"}}"#, term, meaning),
            },
        }
    }

    async fn test_tools() -> (ToolContext, Arc<dyn VocabularyStore>) {
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
        let store: Arc<dyn VocabularyStore> = Arc::new(MemoryVocabularyStore::new());

        (
            ToolContext::new(store.clone(), index, embedder),
            store,
        )
    }

    #[tokio::test]
    async fn test_plain_answer_passes_through() {
        let (tools, _) = test_tools().await;
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(ChatTurn::Answer(
            "こんにちは!".to_string(),
        ))]));

        let mut session = TutorSession::new(backend, tools, "prompt");
        let answer = session.handle_turn("hello").await.unwrap();
        assert_eq!(answer, "こんにちは!");

        // system + user + assistant
        assert_eq!(session.message_count(), 3);
    }

    #[tokio::test]
    async fn test_tool_round_then_answer() {
        let (tools, store) = test_tools().await;
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(ChatTurn::ToolCalls(vec![add_call("call_1", "犬", "anjing")])),
            Ok(ChatTurn::Answer("Saved 犬 for you.".to_string())),
        ]));

        let mut session = TutorSession::new(backend, tools, "prompt");
        let answer = session.handle_turn("add 犬 = anjing").await.unwrap();

        assert_eq!(answer, "Saved 犬 for you.");
        // The tool call mutated the shared store immediately
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_round_cap_yields_degraded_answer() {
        let (tools, _) = test_tools().await;
        // Empty script: the backend requests a tool call every round
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));

        let mut session = TutorSession::new(backend.clone(), tools, "prompt").with_max_tool_rounds(3);
        let answer = session.handle_turn("loop forever").await.unwrap();

        assert!(answer.contains("tool rounds"));
        assert_eq!(backend.calls_made(), 3);
    }

    #[tokio::test]
    async fn test_endpoint_failure_retried_once_then_degraded() {
        let (tools, _) = test_tools().await;
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(KotobaError::EndpointTimeout("request timed out".to_string())),
            Err(KotobaError::EndpointTimeout("request timed out".to_string())),
        ]));

        let mut session = TutorSession::new(backend.clone(), tools, "prompt");
        let answer = session.handle_turn("hello").await.unwrap();

        assert!(answer.contains("try again"));
        assert_eq!(backend.calls_made(), 2);
    }

    #[tokio::test]
    async fn test_transient_failure_recovers_on_retry() {
        let (tools, _) = test_tools().await;
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(KotobaError::EndpointTimeout("request timed out".to_string())),
            Ok(ChatTurn::Answer("recovered".to_string())),
        ]));

        let mut session = TutorSession::new(backend, tools, "prompt");
        let answer = session.handle_turn("hello").await.unwrap();
        assert_eq!(answer, "recovered");
    }

    #[tokio::test]
    async fn test_capped_turns_stay_within_history_bound() {
        let (tools, _) = test_tools().await;
        // Empty script: every round is a tool call, so every turn ends
        // at the round cap
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));

        let mut session = TutorSession::new(backend, tools, "prompt");
        for _ in 0..6 {
            session.handle_turn("loop forever").await.unwrap();
        }

        assert!(session.message_count() <= HISTORY_TRIM_LEN);
    }

    #[tokio::test]
    async fn test_clear_history_keeps_system_prompt() {
        let (tools, _) = test_tools().await;
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(ChatTurn::Answer(
            "ok".to_string(),
        ))]));

        let mut session = TutorSession::new(backend, tools, "prompt");
        session.handle_turn("hello").await.unwrap();
        session.clear_history();
        assert_eq!(session.message_count(), 1);
    }
}

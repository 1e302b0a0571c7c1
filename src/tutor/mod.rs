//! Tool-augmented tutoring conversation.
//!
//! The session loop, the tool registry, and the completion endpoint
//! seam live here.

mod session;
mod tools;

pub use session::{ChatBackend, ChatTurn, OpenAiBackend, TutorSession};
pub use tools::{parse_tool_call, tool_definitions, ToolCall, ToolContext};

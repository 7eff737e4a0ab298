//! Prompt construction and cleanup of generated statements.

use serde::{Deserialize, Serialize};

/// Instructions sent as the system message of every generation request.
pub const INSTRUCTIONS: &str = "Create a Cypher MERGE statement to model all entities and \
relationships found in the text. Use the existing schema before creating new nodes and \
relationships. Respond with the Cypher statement only.";

const CODE_FENCE: &str = "```";

/// A chat message in the OpenAI wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Build the conversation for one piece of text, conditioned on the schema.
pub fn build_messages(schema: &str, text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(INSTRUCTIONS),
        ChatMessage::user(format!(
            "Existing graph schema:\n{schema}\nText to model:\n{text}\n\nStatement:"
        )),
    ]
}

/// Remove every literal triple-backtick marker from a generated statement.
///
/// The statement is otherwise passed through untouched.
pub fn strip_code_fences(statement: &str) -> String {
    statement.replace(CODE_FENCE, "")
}

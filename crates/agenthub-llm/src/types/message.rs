use serde::{Deserialize, Serialize};
use super::content::Content;

/// Speaker of a chat message, as named on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

/// One entry of a chat completion prompt
///
/// Only prompt-side roles exist here; replies come back through
/// `ChatResponse` or the stream events instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Content,
}

impl Message {
    pub fn system(content: impl Into<Content>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// End-user turn; may carry images as multipart content
    pub fn human(content: impl Into<Content>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn role(&self) -> &'static str {
        self.role.as_str()
    }
}

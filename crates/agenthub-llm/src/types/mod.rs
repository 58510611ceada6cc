pub mod content;
pub mod message;
pub mod tool;

pub use content::{Content, ContentPart, ImageDetail, ImageUrl};
pub use message::{Message, Role};
pub use tool::{ToolCall, FunctionCall};

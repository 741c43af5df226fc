pub mod provider;
pub mod store;

pub use provider::{ChatMessage, ChatModel, ChatRequest, ChatResponse, ToolCall};
pub use store::BookingStore;

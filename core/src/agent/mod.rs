pub mod context;
pub mod loop_;
pub mod registry;
pub mod service;

pub use context::ContextBuilder;
pub use loop_::{ReasoningLoop, ToolInvocation};
pub use registry::{ToolKind, ToolRegistry, ToolSpec};
pub use service::{Concierge, Reply, SessionInfo};

pub mod agent;
pub mod bookings;
pub mod config;
pub mod errors;
pub mod providers;
pub mod session;
pub mod tools;
pub mod traits;

pub use agent::{
    Concierge, ContextBuilder, ReasoningLoop, Reply, SessionInfo, ToolInvocation, ToolKind,
    ToolRegistry, ToolSpec,
};
pub use bookings::*;
pub use config::*;
pub use errors::*;
pub use providers::*;
pub use session::*;
pub use tools::*;
pub use traits::*;

use crate::agent::{ContextBuilder, ReasoningLoop};
use crate::errors::{OrchestrationError, SessionError};
use crate::session::SessionStore;
use crate::tools::Toolbox;
use crate::traits::ChatModel;
use std::sync::Arc;
use tracing::debug;

const GREETING: &str =
    "New session created successfully. How can I assist with your travel plans today?";

#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub session_id: String,
    pub greeting: String,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub session_id: String,
    pub answer: String,
}

pub struct Concierge {
    sessions: SessionStore,
    reasoning: ReasoningLoop,
}

impl Concierge {
    pub fn new(model: Arc<dyn ChatModel>, toolbox: Toolbox) -> Self {
        let toolbox = Arc::new(toolbox);
        let context_builder =
            ContextBuilder::new().with_tool_specs(toolbox.registry().describe_all().to_vec());

        Self {
            sessions: SessionStore::new(),
            reasoning: ReasoningLoop::new(model, context_builder, toolbox),
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.reasoning = self.reasoning.with_max_iterations(max);
        self
    }

    pub fn create_session(&self) -> SessionInfo {
        let session = self.sessions.get_or_create(None);
        debug!(session_id = %session.id, "session created");

        SessionInfo {
            session_id: session.id.clone(),
            greeting: GREETING.to_string(),
        }
    }

    /// Run one turn. The per-session lock is held for the whole run, so a
    /// second message to the same session waits for the first to finish;
    /// messages to different sessions proceed concurrently. `None` starts
    /// a fresh session and returns its id in the reply.
    pub async fn send_message(
        &self,
        session_id: Option<&str>,
        text: &str,
    ) -> Result<Reply, OrchestrationError> {
        let session = self.sessions.get_or_create(session_id);
        debug!(session_id = %session.id, "processing turn");
        let mut memory = session.memory.lock().await;

        let answer = self.reasoning.run(&mut memory, text).await?;

        Ok(Reply {
            session_id: session.id.clone(),
            answer,
        })
    }

    pub fn delete_session(&self, session_id: &str) -> Result<(), SessionError> {
        self.sessions.delete(session_id)
    }

    pub fn list_sessions(&self) -> Vec<String> {
        self.sessions.list_ids()
    }
}

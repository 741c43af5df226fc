use thiserror::Error;

/// Fatal failure of a single reasoning run; the session memory is left
/// untouched when one of these comes back.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("reasoning model call failed: {0}")]
    Model(anyhow::Error),

    #[error("no answer produced after {0} reasoning iterations")]
    NoAnswer(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("tool already registered: {0}")]
    DuplicateTool(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_error_display() {
        let err = SessionError::NotFound("abc-123".into());
        assert_eq!(err.to_string(), "session not found: abc-123");
    }

    #[test]
    fn registry_error_display() {
        assert_eq!(
            RegistryError::DuplicateTool("search_flights".into()).to_string(),
            "tool already registered: search_flights"
        );
        assert_eq!(
            RegistryError::UnknownTool("teleport".into()).to_string(),
            "unknown tool: teleport"
        );
    }

    #[test]
    fn orchestration_error_display() {
        let err = OrchestrationError::NoAnswer(10);
        assert!(err.to_string().contains("10 reasoning iterations"));

        let err = OrchestrationError::Model(anyhow::anyhow!("connection refused"));
        assert!(err.to_string().contains("connection refused"));
    }
}

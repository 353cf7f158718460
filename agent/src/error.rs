//! Error taxonomy shared by agents and workflows

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::SelectionError;

/// Failure category carried by every failed workflow result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Invocation referenced a workflow that was never registered
    UnknownWorkflow,
    /// A requested capability provider is not available
    CapabilityUnavailable,
    /// Establishing a capability connection failed
    ConnectionFailed,
    /// A model binding was attached twice to the same connected agent
    AlreadyAttached,
    /// The model backend failed to generate
    BackendFailure,
    /// Every fan-out branch of a parallel aggregation failed
    AggregationFailed,
    /// The model selector had nothing to choose from
    NoCandidates,
    /// Workflow input or task set was malformed
    InvalidInput,
    /// The invocation was cancelled or timed out
    Cancelled,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownWorkflow => "unknown_workflow",
            Self::CapabilityUnavailable => "capability_unavailable",
            Self::ConnectionFailed => "connection_failed",
            Self::AlreadyAttached => "already_attached",
            Self::BackendFailure => "backend_failure",
            Self::AggregationFailed => "aggregation_failed",
            Self::NoCandidates => "no_candidates",
            Self::InvalidInput => "invalid_input",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while an agent is connected and generating
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Capability '{0}' is not available")]
    CapabilityUnavailable(String),

    #[error("Failed to connect to capability '{capability}': {source:#}")]
    Connection {
        capability: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Agent '{0}' already has a model attached")]
    AlreadyAttached(String),

    #[error("Model backend failed: {0:#}")]
    Backend(#[source] anyhow::Error),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

impl AgentError {
    /// The failure category this error reports as
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::CapabilityUnavailable(_) => FailureKind::CapabilityUnavailable,
            Self::Connection { .. } => FailureKind::ConnectionFailed,
            Self::AlreadyAttached(_) => FailureKind::AlreadyAttached,
            Self::Backend(_) => FailureKind::BackendFailure,
            Self::Selection(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::UnknownWorkflow).unwrap();
        assert_eq!(json, "\"unknown_workflow\"");
        assert_eq!(FailureKind::AggregationFailed.to_string(), "aggregation_failed");
    }

    #[test]
    fn test_agent_error_kinds() {
        assert_eq!(
            AgentError::AlreadyAttached("a".into()).kind(),
            FailureKind::AlreadyAttached
        );
        assert_eq!(
            AgentError::Backend(anyhow::anyhow!("boom")).kind(),
            FailureKind::BackendFailure
        );
        assert_eq!(
            AgentError::from(SelectionError::NoCandidates {
                backend: "ollama".into()
            })
            .kind(),
            FailureKind::NoCandidates
        );
    }

    #[test]
    fn test_backend_error_message_keeps_cause() {
        let err = AgentError::Backend(anyhow::anyhow!("connection refused").context("chat failed"));
        let msg = err.to_string();
        assert!(msg.contains("chat failed"));
        assert!(msg.contains("connection refused"));
    }
}

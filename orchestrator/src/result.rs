//! Workflow results
//!
//! Every invocation ends in exactly one [`WorkflowResult`]: a success value or
//! a failure carrying its [`FailureKind`]. Failures are data, not errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vira_agent::{AgentError, FailureKind};

/// Outcome of a workflow or a single executor run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkflowResult {
    Success {
        value: Value,
    },
    Failure {
        kind: FailureKind,
        message: String,
        /// Agent the failure originated from, when there is one
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent: Option<String>,
    },
}

impl WorkflowResult {
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success {
            value: value.into(),
        }
    }

    pub fn success_text(text: impl Into<String>) -> Self {
        Self::Success {
            value: Value::String(text.into()),
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
            agent: None,
        }
    }

    /// Failure attributed to one agent
    pub fn from_agent_error(agent: &str, err: &AgentError) -> Self {
        Self::Failure {
            kind: err.kind(),
            message: format!("{:#}", err),
            agent: Some(agent.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Failure kind, if this is a failure
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Success value as text (strings verbatim, other JSON rendered compactly)
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Success {
                value: Value::String(s),
            } => Some(s.clone()),
            Self::Success { value } => Some(value.to_string()),
            Self::Failure { .. } => None,
        }
    }
}

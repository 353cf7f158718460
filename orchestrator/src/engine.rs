//! Workflow runner
//!
//! Resolves a workflow by name and drives one invocation through
//! `Pending -> Running -> {Completed, Failed, Cancelled}`. Cancellation and the
//! optional timeout both drop the in-flight workflow future. The invocation
//! only settles once every connection it acquired has been released.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use vira_agent::config::ViraFileConfig;
use vira_agent::FailureKind;

use crate::context::WorkflowContext;
use crate::result::WorkflowResult;
use crate::workflow::{WorkflowError, WorkflowRegistry};

/// Configuration for the workflow runner
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Cancel invocations running longer than this
    pub invocation_timeout: Option<Duration>,
}

impl EngineConfig {
    /// Create from file config
    pub fn from_file_config(config: &ViraFileConfig) -> Self {
        Self {
            invocation_timeout: config.runtime.invocation_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationState {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl InvocationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// A finished invocation
#[derive(Debug, Clone, Serialize)]
pub struct Invocation {
    pub id: u64,
    pub workflow: String,
    pub state: InvocationState,
    pub result: WorkflowResult,
    pub duration_ms: u64,
}

impl Invocation {
    fn transition(&mut self, next: InvocationState) {
        tracing::debug!(
            "Invocation #{} ({}): {:?} -> {:?}",
            self.id,
            self.workflow,
            self.state,
            next
        );
        self.state = next;
    }
}

pub struct WorkflowRunner {
    registry: Arc<WorkflowRegistry>,
    ctx: WorkflowContext,
    config: EngineConfig,
    next_id: AtomicU64,
}

impl WorkflowRunner {
    pub fn new(registry: Arc<WorkflowRegistry>, ctx: WorkflowContext) -> Self {
        Self {
            registry,
            ctx,
            config: EngineConfig::default(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &WorkflowRegistry {
        &self.registry
    }

    pub fn context(&self) -> &WorkflowContext {
        &self.ctx
    }

    /// Invoke a workflow by name
    pub async fn invoke(&self, name: &str, input: Value) -> WorkflowResult {
        self.invoke_with_cancel(name, input, CancellationToken::new())
            .await
            .result
    }

    /// Invoke a workflow, cancelling it when `cancel` fires
    pub async fn invoke_with_cancel(
        &self,
        name: &str,
        input: Value,
        cancel: CancellationToken,
    ) -> Invocation {
        let start = Instant::now();
        let mut invocation = Invocation {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            workflow: name.to_string(),
            state: InvocationState::Pending,
            result: WorkflowResult::failure(FailureKind::Cancelled, "Invocation did not start"),
            duration_ms: 0,
        };

        let Some(workflow) = self.registry.get(name) else {
            tracing::warn!("Invocation #{}: unknown workflow '{}'", invocation.id, name);
            invocation.result = WorkflowResult::failure(
                FailureKind::UnknownWorkflow,
                WorkflowError::NotFound(name.to_string()).to_string(),
            );
            invocation.transition(InvocationState::Failed);
            return invocation;
        };

        invocation.transition(InvocationState::Running);
        tracing::info!("Invocation #{}: running workflow '{}'", invocation.id, name);

        let ctx = self.ctx.for_invocation();
        let run = workflow.run(&ctx, input);
        let timeout = self.config.invocation_timeout;
        let result = tokio::select! {
            result = run => result,
            _ = cancel.cancelled() => {
                WorkflowResult::failure(FailureKind::Cancelled, "Invocation was cancelled")
            }
            _ = sleep_or_forever(timeout) => {
                WorkflowResult::failure(
                    FailureKind::Cancelled,
                    format!("Invocation timed out after {:?}", timeout.unwrap_or_default()),
                )
            }
        };

        ctx.releases.close();
        if !ctx.releases.is_empty() {
            tracing::debug!(
                "Invocation #{}: waiting for {} connection release(s)",
                invocation.id,
                ctx.releases.len()
            );
        }
        ctx.releases.wait().await;

        invocation.duration_ms = start.elapsed().as_millis() as u64;
        let next = match result.kind() {
            None => InvocationState::Completed,
            Some(FailureKind::Cancelled) => InvocationState::Cancelled,
            Some(_) => InvocationState::Failed,
        };
        invocation.result = result;
        invocation.transition(next);

        tracing::info!(
            "Invocation #{}: workflow '{}' {:?} in {}ms",
            invocation.id,
            name,
            invocation.state,
            invocation.duration_ms
        );
        invocation
    }
}

async fn sleep_or_forever(timeout: Option<Duration>) {
    match timeout {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!InvocationState::Pending.is_terminal());
        assert!(!InvocationState::Running.is_terminal());
        assert!(InvocationState::Completed.is_terminal());
        assert!(InvocationState::Failed.is_terminal());
        assert!(InvocationState::Cancelled.is_terminal());
    }

    #[test]
    fn test_engine_config_from_file() {
        let config: ViraFileConfig =
            toml::from_str("[runtime]\ninvocation_timeout_secs = 90\n").unwrap();
        assert_eq!(
            EngineConfig::from_file_config(&config).invocation_timeout,
            Some(Duration::from_secs(90))
        );
        assert!(EngineConfig::default().invocation_timeout.is_none());
    }
}

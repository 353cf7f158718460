//! Workflow definitions and the registration table
//!
//! Workflows are registered once through [`WorkflowRegistryBuilder`] and the
//! resulting [`WorkflowRegistry`] is read-only for the life of the process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::context::WorkflowContext;
use crate::result::WorkflowResult;

/// A named unit of work invoked with a JSON input
#[async_trait]
pub trait Workflow: Send + Sync {
    /// Unique name used for invocation
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str {
        ""
    }

    async fn run(&self, ctx: &WorkflowContext, input: Value) -> WorkflowResult;
}

/// Errors that can occur with workflows
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Workflow '{0}' is already registered")]
    Duplicate(String),

    #[error("Workflow not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

type WorkflowHandler =
    dyn for<'c> Fn(&'c WorkflowContext, Value) -> BoxFuture<'c, WorkflowResult> + Send + Sync;

/// Workflow backed by a closure
pub struct FnWorkflow {
    name: String,
    description: String,
    handler: Box<WorkflowHandler>,
}

/// Adapt a closure into a [`Workflow`]
///
/// ```rust,ignore
/// let echo = workflow_fn("echo", "Return the input", |_ctx, input| {
///     Box::pin(async move { WorkflowResult::success(input) })
/// });
/// ```
pub fn workflow_fn<F>(
    name: impl Into<String>,
    description: impl Into<String>,
    handler: F,
) -> FnWorkflow
where
    F: for<'c> Fn(&'c WorkflowContext, Value) -> BoxFuture<'c, WorkflowResult>
        + Send
        + Sync
        + 'static,
{
    FnWorkflow {
        name: name.into(),
        description: description.into(),
        handler: Box::new(handler),
    }
}

#[async_trait]
impl Workflow for FnWorkflow {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(&self, ctx: &WorkflowContext, input: Value) -> WorkflowResult {
        (self.handler)(ctx, input).await
    }
}

/// Collects workflows before the registry is frozen
#[derive(Default)]
pub struct WorkflowRegistryBuilder {
    workflows: HashMap<String, Arc<dyn Workflow>>,
}

impl WorkflowRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workflow; names must be unique
    pub fn register(mut self, workflow: Arc<dyn Workflow>) -> Result<Self, WorkflowError> {
        let name = workflow.name().to_string();
        if self.workflows.contains_key(&name) {
            return Err(WorkflowError::Duplicate(name));
        }
        tracing::debug!("Registered workflow '{}'", name);
        self.workflows.insert(name, workflow);
        Ok(self)
    }

    pub fn build(self) -> WorkflowRegistry {
        WorkflowRegistry {
            workflows: self.workflows,
        }
    }
}

/// Immutable name → workflow table
pub struct WorkflowRegistry {
    workflows: HashMap<String, Arc<dyn Workflow>>,
}

impl WorkflowRegistry {
    pub fn builder() -> WorkflowRegistryBuilder {
        WorkflowRegistryBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Workflow>> {
        self.workflows.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.workflows.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.workflows.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// (name, description) pairs, sorted by name
    pub fn list(&self) -> Vec<(&str, &str)> {
        let mut workflows: Vec<_> = self
            .workflows
            .values()
            .map(|w| (w.name(), w.description()))
            .collect();
        workflows.sort_by_key(|(name, _)| *name);
        workflows
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

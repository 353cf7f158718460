//! Shared workflow context
//!
//! Everything a workflow needs from the host, passed explicitly. The
//! capability registry is the only part that changes after startup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio_util::task::TaskTracker;
use vira_agent::config::{McpConfig, ViraFileConfig};
use vira_agent::llm::build_backend;
use vira_agent::mcp::McpConnector;
use vira_agent::{CapabilityConnector, CapabilityRegistry, LlmBackend, ModelCatalog};

#[derive(Clone)]
pub struct WorkflowContext {
    pub capabilities: Arc<CapabilityRegistry>,
    pub connector: Arc<dyn CapabilityConnector>,
    pub backend: Arc<dyn LlmBackend>,
    pub models: Arc<ModelCatalog>,
    /// Directory granted to the filesystem provider
    pub workspace_dir: PathBuf,
    /// Connection releases forced by cancellation
    pub releases: TaskTracker,
}

impl WorkflowContext {
    pub fn new(
        capabilities: Arc<CapabilityRegistry>,
        connector: Arc<dyn CapabilityConnector>,
        backend: Arc<dyn LlmBackend>,
        models: ModelCatalog,
    ) -> Self {
        Self {
            capabilities,
            connector,
            backend,
            models: Arc::new(models),
            workspace_dir: PathBuf::from("."),
            releases: TaskTracker::new(),
        }
    }

    /// Same collaborators, with a release tracker of its own
    pub fn for_invocation(&self) -> Self {
        Self {
            releases: TaskTracker::new(),
            ..self.clone()
        }
    }

    pub fn with_workspace_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workspace_dir = dir.into();
        self
    }

    /// Build the production context from `.vira.toml` and `.mcp.json`
    pub fn from_config(config: &ViraFileConfig, mcp: Option<McpConfig>) -> Result<Self> {
        let capabilities = match mcp {
            Some(mcp) => CapabilityRegistry::from_config(mcp),
            None => {
                tracing::info!("No capability providers configured");
                CapabilityRegistry::new()
            }
        };

        let backend = build_backend(&config.llm)?;
        tracing::info!("Using {} backend at {}", backend.kind(), config.llm.url);

        Ok(Self::new(
            Arc::new(capabilities),
            Arc::new(McpConnector::new()),
            backend,
            config.model_catalog()?,
        )
        .with_workspace_dir(config.workspace_dir()?))
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    /// Grant the workspace directory to a provider (idempotent)
    pub fn grant_workspace(&self, capability: &str) {
        let dir = self.workspace_dir.to_string_lossy();
        self.capabilities.augment_args(capability, &[dir.as_ref()]);
    }
}

impl std::fmt::Debug for WorkflowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowContext")
            .field("capabilities", &self.capabilities.available_names())
            .field("backend", &self.backend.kind())
            .field("models", &self.models.variants().len())
            .field("workspace_dir", &self.workspace_dir)
            .field("pending_releases", &self.releases.len())
            .finish()
    }
}

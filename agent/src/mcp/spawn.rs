//! MCP child-process connector
//!
//! Spawns each capability provider as a child process and completes the MCP
//! handshake. The session stays open until its owning agent releases it.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rmcp::{service::RunningService, transport::TokioChildProcess, RoleClient, ServiceExt};
use tokio::process::Command;

use super::registry::CapabilityProvider;
use super::session::{CapabilityConnector, CapabilitySession};

/// Default startup timeout for spawning and initializing an MCP server
const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Connector that spawns providers over stdio
#[derive(Debug, Clone)]
pub struct McpConnector {
    startup_timeout: Duration,
}

impl Default for McpConnector {
    fn default() -> Self {
        Self {
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
        }
    }
}

impl McpConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }
}

fn build_command(provider: &CapabilityProvider) -> Command {
    let mut cmd = Command::new(&provider.command);
    if !provider.args.is_empty() {
        cmd.args(&provider.args);
    }
    for (key, value) in &provider.env {
        let expanded = shellexpand::env(value).unwrap_or_else(|_| value.clone().into());
        cmd.env(key, expanded.as_ref());
    }
    cmd
}

#[async_trait]
impl CapabilityConnector for McpConnector {
    async fn connect(&self, provider: &CapabilityProvider) -> Result<Box<dyn CapabilitySession>> {
        tracing::debug!("Connecting to MCP server: {}", provider.name);

        let cmd = build_command(provider);

        // Wrap spawn + initialization in startup timeout
        let service = tokio::time::timeout(self.startup_timeout, async {
            let transport = TokioChildProcess::new(cmd)?;
            let svc = ().serve(transport).await?;
            Ok::<_, anyhow::Error>(svc)
        })
        .await
        .map_err(|_| {
            anyhow::anyhow!(
                "MCP server '{}' startup timed out after {:?}",
                provider.name,
                self.startup_timeout
            )
        })?
        .with_context(|| format!("Failed to start MCP server '{}'", provider.name))?;

        tracing::info!("Connected to MCP server '{}'", provider.name);

        Ok(Box::new(McpSession {
            name: provider.name.clone(),
            service,
        }))
    }
}

/// A running MCP client session
struct McpSession {
    name: String,
    service: RunningService<RoleClient, ()>,
}

#[async_trait]
impl CapabilitySession for McpSession {
    fn capability(&self) -> &str {
        &self.name
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let McpSession { name, service } = *self;
        service
            .cancel()
            .await
            .with_context(|| format!("MCP server '{}' did not shut down cleanly", name))?;
        Ok(())
    }
}

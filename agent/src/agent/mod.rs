//! Agent module - instruction-bound units with scoped connections
//!
//! An [`Agent`] is a name, an instruction, and the capabilities it may use.
//! Connecting it produces a [`ConnectedAgent`], which owns the open capability
//! sessions and at most one [`ModelBinding`]:
//!
//! 1. `Agent::scope_to` narrows the requested capabilities to those available
//! 2. `Agent::connect` / `Agent::with_connection` opens one session per capability
//! 3. `ConnectedAgent::attach_model` selects a model variant and binds the backend
//! 4. `ModelBinding::generate` issues the single generation call
//! 5. Release closes every session, on success, failure, or cancellation

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio_util::task::TaskTracker;

use crate::error::AgentError;
use crate::llm::{GenerateRequest, LlmBackend, RequestParams};
use crate::mcp::{CapabilityConnector, CapabilityRegistry, ConnectionScope};
use crate::models::{ModelCatalog, ModelPreferences, ModelVariant};

/// A named, instruction-bound execution unit
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    name: String,
    instruction: String,
    capabilities: Vec<String>,
}

impl Agent {
    /// Create an agent with no capabilities
    pub fn new(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
            capabilities: Vec::new(),
        }
    }

    /// Scope the agent to the requested capabilities that are available
    ///
    /// Unavailable capabilities are dropped from the scope, not treated as errors.
    pub fn scope_to(mut self, registry: &CapabilityRegistry, names: &[&str]) -> Self {
        for name in names {
            if !registry.has(name) {
                tracing::info!(
                    "Agent '{}': {}, narrowing scope",
                    self.name,
                    AgentError::CapabilityUnavailable(name.to_string())
                );
                continue;
            }
            if !self.capabilities.iter().any(|c| c == name) {
                self.capabilities.push(name.to_string());
            }
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Capabilities this agent is scoped to, in request order
    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    /// Open a session to every scoped capability
    ///
    /// If any connection fails, sessions opened so far are released before
    /// the error is returned.
    pub async fn connect(
        &self,
        registry: &CapabilityRegistry,
        connector: &dyn CapabilityConnector,
    ) -> Result<ConnectedAgent, AgentError> {
        self.open(registry, connector, ConnectionScope::new(self.name.clone()))
            .await
    }

    /// Like [`Agent::connect`], but a release forced by cancellation is
    /// spawned on `releases` instead of detached
    pub async fn connect_tracked(
        &self,
        registry: &CapabilityRegistry,
        connector: &dyn CapabilityConnector,
        releases: &TaskTracker,
    ) -> Result<ConnectedAgent, AgentError> {
        let scope = ConnectionScope::tracked(self.name.clone(), releases.clone());
        self.open(registry, connector, scope).await
    }

    async fn open(
        &self,
        registry: &CapabilityRegistry,
        connector: &dyn CapabilityConnector,
        mut scope: ConnectionScope,
    ) -> Result<ConnectedAgent, AgentError> {
        for capability in &self.capabilities {
            // Providers are never removed, but may have been disabled since scoping
            let Some(provider) = registry.provider(capability) else {
                tracing::warn!(
                    "Agent '{}': capability '{}' vanished before connect, skipping",
                    self.name,
                    capability
                );
                continue;
            };

            match connector.connect(&provider).await {
                Ok(session) => scope.push(session),
                Err(source) => {
                    scope.release().await;
                    return Err(AgentError::Connection {
                        capability: capability.clone(),
                        source,
                    });
                }
            }
        }

        tracing::info!(
            "Agent '{}': connected ({} capabilities)",
            self.name,
            scope.capabilities().len()
        );

        Ok(ConnectedAgent {
            agent: self.clone(),
            scope,
            binding: None,
        })
    }

    /// Run `body` while connected, releasing the connection on every exit path
    ///
    /// ```rust,ignore
    /// let text = agent
    ///     .with_connection(&registry, &connector, move |conn| {
    ///         Box::pin(async move {
    ///             let binding = conn.attach_model(backend, &catalog, &params.model_preferences)?;
    ///             binding.generate(&prompt, &params).await
    ///         })
    ///     })
    ///     .await?;
    /// ```
    pub async fn with_connection<T, F>(
        &self,
        registry: &CapabilityRegistry,
        connector: &dyn CapabilityConnector,
        body: F,
    ) -> Result<T, AgentError>
    where
        F: for<'c> FnOnce(&'c mut ConnectedAgent) -> BoxFuture<'c, Result<T, AgentError>>,
    {
        let connected = self.connect(registry, connector).await?;
        run_connected(connected, body).await
    }

    /// [`Agent::with_connection`] with releases tracked on `releases`
    ///
    /// If the returned future is dropped mid-body, the sessions are closed by
    /// a task on `releases`; `releases.close()` then `releases.wait()` waits
    /// for them.
    pub async fn with_tracked_connection<T, F>(
        &self,
        registry: &CapabilityRegistry,
        connector: &dyn CapabilityConnector,
        releases: &TaskTracker,
        body: F,
    ) -> Result<T, AgentError>
    where
        F: for<'c> FnOnce(&'c mut ConnectedAgent) -> BoxFuture<'c, Result<T, AgentError>>,
    {
        let connected = self.connect_tracked(registry, connector, releases).await?;
        run_connected(connected, body).await
    }
}

async fn run_connected<T, F>(mut connected: ConnectedAgent, body: F) -> Result<T, AgentError>
where
    F: for<'c> FnOnce(&'c mut ConnectedAgent) -> BoxFuture<'c, Result<T, AgentError>>,
{
    let outcome = body(&mut connected).await;
    connected.disconnect().await;
    outcome
}

/// An agent holding open capability sessions
///
/// Dropping it without calling [`ConnectedAgent::disconnect`] still closes
/// the sessions on the current tokio runtime, as a task on the tracker given
/// to [`Agent::connect_tracked`] when there is one.
pub struct ConnectedAgent {
    agent: Agent,
    scope: ConnectionScope,
    binding: Option<ModelBinding>,
}

impl ConnectedAgent {
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Capabilities with an open session
    pub fn connected_capabilities(&self) -> Vec<&str> {
        self.scope.capabilities()
    }

    /// Attach a model binding, selecting the variant for `backend`'s kind
    pub fn attach_model(
        &mut self,
        backend: Arc<dyn LlmBackend>,
        catalog: &ModelCatalog,
        preferences: &ModelPreferences,
    ) -> Result<&ModelBinding, AgentError> {
        if self.binding.is_some() {
            return Err(AgentError::AlreadyAttached(self.agent.name.clone()));
        }

        let variant = catalog.select(backend.kind(), preferences)?;
        tracing::info!(
            "Agent '{}': attached {} model '{}'",
            self.agent.name,
            backend.kind(),
            variant.name
        );

        Ok(&*self.binding.insert(ModelBinding {
            agent: self.agent.name.clone(),
            instruction: self.agent.instruction.clone(),
            backend,
            variant,
        }))
    }

    pub fn binding(&self) -> Option<&ModelBinding> {
        self.binding.as_ref()
    }

    /// Release the model binding and close every capability session
    pub async fn disconnect(self) {
        let ConnectedAgent {
            agent,
            scope,
            binding,
        } = self;
        drop(binding);
        scope.release().await;
        tracing::debug!("Agent '{}': disconnected", agent.name);
    }
}

/// The association between a connected agent and one model variant
pub struct ModelBinding {
    agent: String,
    instruction: String,
    backend: Arc<dyn LlmBackend>,
    variant: ModelVariant,
}

impl ModelBinding {
    pub fn variant(&self) -> &ModelVariant {
        &self.variant
    }

    /// Issue one generation call with the agent's instruction as system prompt
    pub async fn generate(
        &self,
        prompt: &str,
        params: &RequestParams,
    ) -> Result<String, AgentError> {
        let request = GenerateRequest {
            agent: self.agent.clone(),
            model: self.variant.name.clone(),
            system_prompt: (!self.instruction.is_empty()).then(|| self.instruction.clone()),
            prompt: prompt.to_string(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let text = self
            .backend
            .generate(request)
            .await
            .map_err(AgentError::Backend)?;

        tracing::info!(
            "Agent '{}': {} characters generated by '{}'",
            self.agent,
            text.len(),
            self.variant.name
        );
        Ok(text)
    }
}

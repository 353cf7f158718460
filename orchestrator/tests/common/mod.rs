//! Shared fakes for orchestrator integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use vira_agent::{
    CapabilityConnector, CapabilityProvider, CapabilityRegistry, CapabilitySession,
    GenerateRequest, LlmBackend, ModelCatalog, ModelVariant,
};
use vira_orchestrator::WorkflowContext;

pub const WORKSPACE: &str = "/work/project";

/// How the scripted backend answers one agent
#[derive(Debug, Clone)]
pub enum Script {
    Respond(String),
    Fail(String),
    Delay(Duration, String),
    Hang,
}

/// A generation call as the backend saw it
#[derive(Debug, Clone)]
pub struct Call {
    pub agent: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub prompt: String,
}

/// Backend answering per agent; unscripted agents echo `<agent> output`
#[derive(Default)]
pub struct ScriptedBackend {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, agent: &str, script: Script) -> Self {
        self.scripts.insert(agent.to_string(), script);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, agent: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.agent == agent).collect()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    fn kind(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        self.calls.lock().unwrap().push(Call {
            agent: request.agent.clone(),
            model: request.model.clone(),
            system_prompt: request.system_prompt.clone(),
            prompt: request.prompt.clone(),
        });

        match self.scripts.get(&request.agent).cloned() {
            Some(Script::Respond(text)) => Ok(text),
            Some(Script::Fail(reason)) => anyhow::bail!(reason),
            Some(Script::Delay(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(Script::Hang) => std::future::pending().await,
            None => Ok(format!("{} output", request.agent)),
        }
    }
}

/// Connector that counts sessions and records the arguments it connected with
#[derive(Default)]
pub struct CountingConnector {
    pub opened: AtomicUsize,
    pub live: Arc<AtomicIsize>,
    pub fail_on: Option<String>,
    connects: Mutex<Vec<(String, Vec<String>)>>,
}

impl CountingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(capability: &str) -> Self {
        Self {
            fail_on: Some(capability.to_string()),
            ..Default::default()
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> isize {
        self.live.load(Ordering::SeqCst)
    }

    /// Arguments of every connection made to `capability`, in order
    pub fn args_for(&self, capability: &str) -> Vec<Vec<String>> {
        self.connects
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == capability)
            .map(|(_, args)| args.clone())
            .collect()
    }
}

struct CountingSession {
    name: String,
    live: Arc<AtomicIsize>,
}

#[async_trait]
impl CapabilitySession for CountingSession {
    fn capability(&self) -> &str {
        &self.name
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.live.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl CapabilityConnector for CountingConnector {
    async fn connect(&self, provider: &CapabilityProvider) -> Result<Box<dyn CapabilitySession>> {
        if self.fail_on.as_deref() == Some(provider.name.as_str()) {
            anyhow::bail!("{} refused to start", provider.name);
        }
        self.connects
            .lock()
            .unwrap()
            .push((provider.name.clone(), provider.args.clone()));
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingSession {
            name: provider.name.clone(),
            live: Arc::clone(&self.live),
        }))
    }
}

pub fn registry() -> CapabilityRegistry {
    let registry = CapabilityRegistry::new();
    registry.insert(
        CapabilityProvider::new("filesystem", "npx")
            .with_args(["-y", "@modelcontextprotocol/server-filesystem"]),
    );
    registry.insert(CapabilityProvider::new("fetch", "uvx").with_args(["mcp-server-fetch"]));
    registry
}

pub fn catalog() -> ModelCatalog {
    ModelCatalog::new(vec![
        ModelVariant::new("scripted-small", "scripted", 0.5, 0.1, 0.1),
        ModelVariant::new("scripted-large", "scripted", 0.9, 0.6, 0.6),
    ])
    .unwrap()
}

pub fn context_with(
    registry: CapabilityRegistry,
    backend: Arc<ScriptedBackend>,
    connector: Arc<CountingConnector>,
) -> WorkflowContext {
    WorkflowContext::new(Arc::new(registry), connector, backend, catalog()).with_workspace_dir(WORKSPACE)
}

pub fn context(backend: Arc<ScriptedBackend>, connector: Arc<CountingConnector>) -> WorkflowContext {
    context_with(registry(), backend, connector)
}

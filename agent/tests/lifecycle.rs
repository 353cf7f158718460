//! Configuration through agent lifecycle, without external processes

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use vira_agent::config::{McpConfig, ViraFileConfig};
use vira_agent::{
    Agent, AgentError, CapabilityConnector, CapabilityProvider, CapabilityRegistry, CapabilitySession,
    FailureKind, GenerateRequest, LlmBackend, ModelPreferences, RequestParams,
};

#[derive(Default)]
struct TrackingConnector {
    live: Arc<AtomicUsize>,
}

struct TrackedSession {
    name: String,
    live: Arc<AtomicUsize>,
}

#[async_trait]
impl CapabilitySession for TrackedSession {
    fn capability(&self) -> &str {
        &self.name
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.live.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl CapabilityConnector for TrackingConnector {
    async fn connect(&self, provider: &CapabilityProvider) -> Result<Box<dyn CapabilitySession>> {
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedSession {
            name: provider.name.clone(),
            live: Arc::clone(&self.live),
        }))
    }
}

/// Answers with the model it was asked to use
struct ModelEcho;

#[async_trait]
impl LlmBackend for ModelEcho {
    fn kind(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        Ok(request.model)
    }
}

fn write_configs(dir: &std::path::Path) {
    std::fs::write(
        dir.join(".mcp.json"),
        r#"{
            "mcpServers": {
                "filesystem": { "command": "npx", "args": ["-y", "@modelcontextprotocol/server-filesystem"] },
                "fetch": { "command": "uvx", "args": ["mcp-server-fetch"], "disabled": true }
            }
        }"#,
    )
    .unwrap();
    std::fs::write(
        dir.join(".vira.toml"),
        r#"
        [[models]]
        name = "fast"
        backend = "ollama"
        capability = 0.5
        cost = 0.1
        latency = 0.1

        [[models]]
        name = "smart"
        backend = "ollama"
        capability = 0.95
        cost = 0.7
        latency = 0.8
        "#,
    )
    .unwrap();
}

#[tokio::test]
async fn test_configured_agent_runs_and_releases() {
    let dir = tempfile::tempdir().unwrap();
    write_configs(dir.path());

    let mcp = McpConfig::load_from_dir(dir.path()).unwrap().unwrap();
    let registry = CapabilityRegistry::from_config(mcp);
    let catalog = ViraFileConfig::load_from_dir(dir.path())
        .unwrap()
        .model_catalog()
        .unwrap();
    let connector = TrackingConnector::default();

    // fetch is disabled, so only filesystem survives scoping
    let agent = Agent::new("researcher", "Research").scope_to(&registry, &["filesystem", "fetch"]);
    assert_eq!(agent.capabilities(), ["filesystem".to_string()]);

    for (prefs, expected) in [
        (ModelPreferences::new(1.0, 0.0, 0.0).unwrap(), "smart"),
        (ModelPreferences::new(0.2, 0.4, 0.4).unwrap(), "fast"),
    ] {
        let params = RequestParams::new(prefs);
        let catalog = catalog.clone();
        let live = Arc::clone(&connector.live);

        let model = agent
            .with_connection(&registry, &connector, move |conn| {
                Box::pin(async move {
                    assert_eq!(conn.connected_capabilities(), vec!["filesystem"]);
                    assert_eq!(live.load(Ordering::SeqCst), 1);
                    let binding =
                        conn.attach_model(Arc::new(ModelEcho), &catalog, &params.model_preferences)?;
                    binding.generate("go", &params).await
                })
            })
            .await
            .unwrap();

        assert_eq!(model, expected);
        assert_eq!(connector.live.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_invalid_preferences_fail_selection() {
    let registry = CapabilityRegistry::new();
    let connector = TrackingConnector::default();
    let catalog = vira_agent::ModelCatalog::builtin();
    let zero = ModelPreferences {
        intelligence_priority: 0.0,
        cost_priority: 0.0,
        speed_priority: 0.0,
    };

    let err = Agent::new("planner", "Plan")
        .with_connection(&registry, &connector, move |conn| {
            Box::pin(async move {
                conn.attach_model(Arc::new(ModelEcho), &catalog, &zero)?;
                Ok::<_, AgentError>(())
            })
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::InvalidInput);
}

//! Single-agent executor
//!
//! Connect, bind a model, generate once, release. Every outcome is reported
//! as a [`WorkflowResult`].

use std::time::Instant;

use vira_agent::{Agent, RequestParams};

use crate::context::WorkflowContext;
use crate::result::WorkflowResult;

pub struct SingleAgentExecutor<'a> {
    ctx: &'a WorkflowContext,
}

impl<'a> SingleAgentExecutor<'a> {
    pub fn new(ctx: &'a WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Run `agent` on `prompt`
    ///
    /// Connections are released on every path. When the returned future is
    /// dropped before completion, the release runs on `ctx.releases`.
    pub async fn run(&self, agent: &Agent, prompt: &str, params: &RequestParams) -> WorkflowResult {
        let start = Instant::now();
        let backend = self.ctx.backend.clone();
        let models = self.ctx.models.clone();
        let prompt = prompt.to_string();
        let params = params.clone();

        tracing::info!("Agent '{}': connecting", agent.name());

        let outcome = agent
            .with_tracked_connection(
                &self.ctx.capabilities,
                self.ctx.connector.as_ref(),
                &self.ctx.releases,
                move |conn| {
                    Box::pin(async move {
                        let binding =
                            conn.attach_model(backend, &models, &params.model_preferences)?;
                        binding.generate(&prompt, &params).await
                    })
                },
            )
            .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(text) => {
                tracing::info!(
                    "Agent '{}': completed in {}ms ({} characters)",
                    agent.name(),
                    duration_ms,
                    text.len()
                );
                WorkflowResult::success_text(text)
            }
            Err(e) => {
                tracing::warn!("Agent '{}': failed after {}ms: {}", agent.name(), duration_ms, e);
                WorkflowResult::from_agent_error(agent.name(), &e)
            }
        }
    }
}

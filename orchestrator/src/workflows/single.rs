//! Workflows that run one agent once

use async_trait::async_trait;
use serde_json::Value;
use vira_agent::{Agent, FailureKind, ModelPreferences, RequestParams};

use crate::context::WorkflowContext;
use crate::executor::SingleAgentExecutor;
use crate::result::WorkflowResult;
use crate::workflow::{Workflow, WorkflowError};

/// Turns the invocation input into the agent's prompt
pub type PromptRenderer = fn(Value) -> Result<String, WorkflowError>;

/// A single agent with fixed capabilities and model preferences
pub struct SingleAgentWorkflow {
    pub name: &'static str,
    pub description: &'static str,
    pub agent: &'static str,
    pub instruction: &'static str,
    pub capabilities: &'static [&'static str],
    pub preferences: ModelPreferences,
    pub render: PromptRenderer,
}

#[async_trait]
impl Workflow for SingleAgentWorkflow {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    async fn run(&self, ctx: &WorkflowContext, input: Value) -> WorkflowResult {
        let prompt = match (self.render)(input) {
            Ok(prompt) => prompt,
            Err(e) => return WorkflowResult::failure(FailureKind::InvalidInput, e.to_string()),
        };

        if self.capabilities.contains(&"filesystem") {
            ctx.grant_workspace("filesystem");
        }

        let agent =
            Agent::new(self.agent, self.instruction).scope_to(&ctx.capabilities, self.capabilities);
        let params = RequestParams::new(self.preferences);

        SingleAgentExecutor::new(ctx).run(&agent, &prompt, &params).await
    }
}

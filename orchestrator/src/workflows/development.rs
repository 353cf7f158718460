//! `code-development`: architect, developer and tester in parallel, reviewed
//! by a fan-in agent

use async_trait::async_trait;
use serde_json::Value;
use vira_agent::{Agent, FailureKind, RequestParams};

use super::input::{structured_input, DevelopmentRequest};
use crate::context::WorkflowContext;
use crate::parallel::{ParallelAggregator, ParallelTaskSet};
use crate::prompts::{ARCHITECT_PROMPT, DEVELOPER_PROMPT, REVIEWER_PROMPT, TESTER_PROMPT};
use crate::result::WorkflowResult;
use crate::workflow::Workflow;

pub const NAME: &str = "code-development";

pub struct CodeDevelopmentWorkflow;

impl CodeDevelopmentWorkflow {
    fn task_set(ctx: &WorkflowContext, request: &DevelopmentRequest) -> ParallelTaskSet {
        let specialists = [
            ("architect", ARCHITECT_PROMPT),
            ("developer", DEVELOPER_PROMPT),
            ("tester", TESTER_PROMPT),
        ]
        .map(|(name, instruction)| {
            Agent::new(name, instruction).scope_to(&ctx.capabilities, &["filesystem"])
        });

        ParallelTaskSet::broadcast(
            &development_prompt(request),
            specialists,
            Agent::new("reviewer", REVIEWER_PROMPT),
        )
    }
}

fn development_prompt(request: &DevelopmentRequest) -> String {
    format!(
        "Development task: {}\n\
         Language: {}\n\
         Requirements: {}\n\n\
         The architect designs the architecture and technical specification, \
         the developer implements it, the tester writes the tests and QA strategy, \
         and the reviewer consolidates the final solution.\n\
         Contribute your part of a complete, production-ready solution.",
        request.task, request.language, request.requirements
    )
}

#[async_trait]
impl Workflow for CodeDevelopmentWorkflow {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Parallel architecture, implementation and testing, consolidated by a reviewer"
    }

    async fn run(&self, ctx: &WorkflowContext, input: Value) -> WorkflowResult {
        let request: DevelopmentRequest = match structured_input(input) {
            Ok(request) => request,
            Err(e) => return WorkflowResult::failure(FailureKind::InvalidInput, e.to_string()),
        };
        tracing::info!("Code development: {} in {}", request.task, request.language);

        ctx.grant_workspace("filesystem");
        let tasks = Self::task_set(ctx, &request);

        ParallelAggregator::new(ctx)
            .run(&tasks, &RequestParams::default())
            .await
    }
}

//! Parallel fan-out / fan-in aggregation
//!
//! Two phases:
//! 1. Every fan-out agent runs on its own prompt, concurrently
//! 2. The fan-in agent runs once on a composite of the successful outputs
//!
//! Fan-out is best-effort: a failed branch is logged and left out of the
//! composite. Only when every branch fails does the aggregation fail, with
//! each branch's agent and failure in the message, and the fan-in agent is
//! never run in that case.

use std::collections::HashSet;

use futures_util::future::join_all;
use vira_agent::{Agent, FailureKind, RequestParams};

use crate::context::WorkflowContext;
use crate::executor::SingleAgentExecutor;
use crate::result::WorkflowResult;

const COMPOSITE_HEADER: &str =
    "The following responses were produced independently by specialist agents \
     working on the same task. Combine them into a single final answer.";

/// One fan-out branch: an agent and the prompt it runs on
#[derive(Debug, Clone)]
pub struct FanOutTask {
    pub agent: Agent,
    pub prompt: String,
}

impl FanOutTask {
    pub fn new(agent: Agent, prompt: impl Into<String>) -> Self {
        Self {
            agent,
            prompt: prompt.into(),
        }
    }
}

/// Errors in the shape of a task set
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaskSetError {
    #[error("Parallel task set has no fan-out agents")]
    EmptyFanOut,

    #[error("Fan-in agent '{0}' also appears in fan-out")]
    FanInInFanOut(String),

    #[error("Fan-out agent '{0}' appears more than once")]
    DuplicateFanOut(String),
}

#[derive(Debug, Clone)]
pub struct ParallelTaskSet {
    pub fan_out: Vec<FanOutTask>,
    pub fan_in: Agent,
}

impl ParallelTaskSet {
    pub fn new(fan_in: Agent) -> Self {
        Self {
            fan_out: Vec::new(),
            fan_in,
        }
    }

    pub fn with_fan_out(mut self, agent: Agent, prompt: impl Into<String>) -> Self {
        self.fan_out.push(FanOutTask::new(agent, prompt));
        self
    }

    /// Every fan-out agent receives the same prompt
    pub fn broadcast(prompt: &str, agents: impl IntoIterator<Item = Agent>, fan_in: Agent) -> Self {
        Self {
            fan_out: agents
                .into_iter()
                .map(|agent| FanOutTask::new(agent, prompt))
                .collect(),
            fan_in,
        }
    }

    pub fn validate(&self) -> Result<(), TaskSetError> {
        if self.fan_out.is_empty() {
            return Err(TaskSetError::EmptyFanOut);
        }
        if self
            .fan_out
            .iter()
            .any(|task| task.agent.name() == self.fan_in.name())
        {
            return Err(TaskSetError::FanInInFanOut(self.fan_in.name().to_string()));
        }
        let mut seen = HashSet::new();
        for task in &self.fan_out {
            if !seen.insert(task.agent.name()) {
                return Err(TaskSetError::DuplicateFanOut(task.agent.name().to_string()));
            }
        }
        Ok(())
    }
}

/// Result of one fan-out branch
#[derive(Debug, Clone)]
pub struct BranchOutcome {
    pub agent: String,
    pub result: WorkflowResult,
}

impl BranchOutcome {
    /// `agent (kind): message` for a failure, `agent (success)` otherwise
    pub fn describe(&self) -> String {
        match &self.result {
            WorkflowResult::Failure { kind, message, .. } => {
                format!("{} ({}): {}", self.agent, kind, message)
            }
            WorkflowResult::Success { .. } => format!("{} (success)", self.agent),
        }
    }
}

pub struct ParallelAggregator<'a> {
    ctx: &'a WorkflowContext,
}

impl<'a> ParallelAggregator<'a> {
    pub fn new(ctx: &'a WorkflowContext) -> Self {
        Self { ctx }
    }

    pub async fn run(&self, tasks: &ParallelTaskSet, params: &RequestParams) -> WorkflowResult {
        if let Err(e) = tasks.validate() {
            return WorkflowResult::failure(FailureKind::InvalidInput, e.to_string());
        }

        let outcomes = self.fan_out(tasks, params).await;

        let successes: Vec<(&str, String)> = outcomes
            .iter()
            .filter_map(|outcome| match &outcome.result {
                WorkflowResult::Success { .. } => {
                    outcome.result.text().map(|text| (outcome.agent.as_str(), text))
                }
                WorkflowResult::Failure { kind, message, .. } => {
                    tracing::warn!(
                        "Fan-out agent '{}' failed ({}): {}",
                        outcome.agent,
                        kind,
                        message
                    );
                    None
                }
            })
            .collect();

        if successes.is_empty() {
            let branches: Vec<String> = outcomes.iter().map(BranchOutcome::describe).collect();
            return WorkflowResult::failure(
                FailureKind::AggregationFailed,
                format!(
                    "All {} fan-out agents failed: {}",
                    outcomes.len(),
                    branches.join("; ")
                ),
            );
        }

        tracing::info!(
            "Fan-out complete: {}/{} succeeded, running fan-in agent '{}'",
            successes.len(),
            outcomes.len(),
            tasks.fan_in.name()
        );

        let composite = compose_fan_in_prompt(&successes);
        SingleAgentExecutor::new(self.ctx)
            .run(&tasks.fan_in, &composite, params)
            .await
    }

    /// Run every branch concurrently; outcomes keep declaration order
    pub async fn fan_out(
        &self,
        tasks: &ParallelTaskSet,
        params: &RequestParams,
    ) -> Vec<BranchOutcome> {
        let executor = SingleAgentExecutor::new(self.ctx);
        let runs = tasks.fan_out.iter().map(|task| {
            let executor = &executor;
            async move {
                BranchOutcome {
                    agent: task.agent.name().to_string(),
                    result: executor.run(&task.agent, &task.prompt, params).await,
                }
            }
        });
        join_all(runs).await
    }
}

/// Header, then one `### <agent>` section per successful branch
pub fn compose_fan_in_prompt(successes: &[(&str, String)]) -> String {
    let mut prompt = String::from(COMPOSITE_HEADER);
    for (agent, text) in successes {
        prompt.push_str("\n\n### ");
        prompt.push_str(agent);
        prompt.push('\n');
        prompt.push_str(text.trim_end());
    }
    prompt
}

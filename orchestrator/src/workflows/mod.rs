//! Built-in workflows
//!
//! | Name | Agents | Strategy |
//! |---|---|---|
//! | `planning` | planner (filesystem) | single |
//! | `research` | researcher (fetch) | single |
//! | `code-development` | architect, developer, tester → reviewer | parallel |
//! | `project-orchestration` | orchestrator (filesystem, fetch) | single |
//! | `code-operation` | code specialist (filesystem) | single |

mod development;
pub mod input;
mod single;

use std::sync::Arc;

use serde_json::Value;
use vira_agent::ModelPreferences;

pub use development::CodeDevelopmentWorkflow;
pub use single::{PromptRenderer, SingleAgentWorkflow};

use crate::prompts::{
    CODE_SPECIALIST_PROMPT, ORCHESTRATOR_PROMPT, PLANNER_PROMPT, RESEARCHER_PROMPT,
};
use crate::workflow::{WorkflowError, WorkflowRegistry, WorkflowRegistryBuilder};
use input::{structured_input, text_input, CodeRequest, ProjectRequest};

const fn preferences(intelligence: f64, cost: f64, speed: f64) -> ModelPreferences {
    ModelPreferences {
        intelligence_priority: intelligence,
        cost_priority: cost,
        speed_priority: speed,
    }
}

fn planning_prompt(input: Value) -> Result<String, WorkflowError> {
    let task = text_input(input)?;
    Ok(format!(
        "Analyze this task and create a detailed execution plan: {task}\n\n\
         Include:\n\
         1. Task analysis and requirements\n\
         2. Step-by-step execution plan\n\
         3. Resource requirements\n\
         4. Time estimates\n\
         5. Success criteria\n\
         6. Risks and how to mitigate them\n\n\
         Structure the plan so it can be executed without further clarification."
    ))
}

fn research_prompt(input: Value) -> Result<String, WorkflowError> {
    let topic = text_input(input)?;
    Ok(format!(
        "Research this topic: {topic}\n\n\
         Include:\n\
         1. Methodology\n\
         2. Key findings\n\
         3. Current trends and developments\n\
         4. An evaluation of the sources and evidence\n\
         5. Conclusions\n\
         6. Actionable recommendations\n\
         7. Open questions worth investigating further"
    ))
}

fn orchestration_prompt(input: Value) -> Result<String, WorkflowError> {
    let request: ProjectRequest = structured_input(input)?;
    Ok(format!(
        "Coordinate the execution of this project:\n\n\
         Project: {}\n\
         Type: {}\n\
         Priority: {}\n\n\
         Break it into phases, assign each phase to the planning, research or \
         development specialists, manage the dependencies between phases, and \
         deliver the integrated result of every phase.",
        request.description, request.project_type, request.priority
    ))
}

fn code_operation_prompt(input: Value) -> Result<String, WorkflowError> {
    let request: CodeRequest = structured_input(input)?;
    Ok(format!(
        "Perform a repository operation:\n\n\
         Operation: {}\n\
         Target: {}\n\
         Instructions: {}\n\n\
         Provide:\n\
         1. Analysis of the target files\n\
         2. The exact commands to run\n\
         3. A step-by-step execution plan\n\
         4. Expected outcome\n\
         5. How the change fits the development workflow\n\
         6. Validation steps",
        request.operation, request.target, request.prompt
    ))
}

/// The single-agent built-ins
pub fn single_agent_workflows() -> Vec<SingleAgentWorkflow> {
    vec![
        SingleAgentWorkflow {
            name: "planning",
            description: "Break a task into an ordered execution plan",
            agent: "planner",
            instruction: PLANNER_PROMPT,
            capabilities: &["filesystem"],
            preferences: preferences(0.8, 0.1, 0.1),
            render: planning_prompt,
        },
        SingleAgentWorkflow {
            name: "research",
            description: "Investigate a topic and report findings",
            agent: "researcher",
            instruction: RESEARCHER_PROMPT,
            capabilities: &["fetch"],
            preferences: preferences(0.9, 0.05, 0.05),
            render: research_prompt,
        },
        SingleAgentWorkflow {
            name: "project-orchestration",
            description: "Coordinate a multi-phase project across specialists",
            agent: "orchestrator",
            instruction: ORCHESTRATOR_PROMPT,
            capabilities: &["filesystem", "fetch"],
            preferences: preferences(0.9, 0.05, 0.05),
            render: orchestration_prompt,
        },
        SingleAgentWorkflow {
            name: "code-operation",
            description: "Analyze or change a repository target",
            agent: "code-specialist",
            instruction: CODE_SPECIALIST_PROMPT,
            capabilities: &["filesystem"],
            preferences: preferences(0.8, 0.0, 0.2),
            render: code_operation_prompt,
        },
    ]
}

/// Register every built-in workflow
pub fn register_builtins(
    mut builder: WorkflowRegistryBuilder,
) -> Result<WorkflowRegistryBuilder, WorkflowError> {
    for workflow in single_agent_workflows() {
        builder = builder.register(Arc::new(workflow))?;
    }
    builder.register(Arc::new(CodeDevelopmentWorkflow))
}

/// Registry holding only the built-ins
pub fn builtin_registry() -> Result<WorkflowRegistry, WorkflowError> {
    Ok(register_builtins(WorkflowRegistry::builder())?.build())
}

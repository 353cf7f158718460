//! Workflow orchestration for VIRA agents
//!
//! This crate provides:
//! - [`WorkflowResult`], the single outcome of every invocation
//! - The single-agent executor and the parallel fan-out/fan-in aggregator
//! - The workflow registry and the runner that drives invocations
//! - Built-in workflows and their agent prompts
//!
//! # Example
//!
//! ```rust,ignore
//! use vira_orchestrator::{builtin_registry, WorkflowContext, WorkflowRunner};
//!
//! let ctx = WorkflowContext::from_config(&file_config, mcp_config)?;
//! let runner = WorkflowRunner::new(Arc::new(builtin_registry()?), ctx);
//!
//! let result = runner
//!     .invoke("planning", serde_json::json!("Migrate the billing service"))
//!     .await;
//! ```

pub mod context;
pub mod engine;
pub mod executor;
pub mod parallel;
pub mod prompts;
pub mod result;
pub mod workflow;
pub mod workflows;

pub use context::WorkflowContext;
pub use engine::{EngineConfig, Invocation, InvocationState, WorkflowRunner};
pub use executor::SingleAgentExecutor;
pub use parallel::{BranchOutcome, FanOutTask, ParallelAggregator, ParallelTaskSet, TaskSetError};
pub use result::WorkflowResult;
pub use workflow::{workflow_fn, Workflow, WorkflowError, WorkflowRegistry, WorkflowRegistryBuilder};
pub use workflows::builtin_registry;

/// Re-export commonly used types from the agent crate
pub use vira_agent::{Agent, FailureKind, ModelPreferences, RequestParams};

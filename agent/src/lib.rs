//! Agent lifecycle, capability providers and model selection for VIRA
//!
//! This crate provides:
//! - Configuration loading (`.vira.toml`, `.mcp.json`)
//! - The process-wide capability registry and scoped provider connections
//! - Model backends (Ollama, OpenAI-compatible) and the model selector
//! - Agents with scoped connections and a single model binding

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod mcp;
pub mod models;

pub use agent::{Agent, ConnectedAgent, ModelBinding};
pub use error::{AgentError, FailureKind};
pub use llm::{GenerateRequest, LlmBackend, RequestParams};
pub use mcp::{CapabilityConnector, CapabilityProvider, CapabilityRegistry, CapabilitySession};
pub use models::{ModelCatalog, ModelPreferences, ModelVariant, SelectionError};

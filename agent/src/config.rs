//! Configuration loading

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::models::{ModelCatalog, ModelVariant};

/// Find a config file by walking up the directory tree, then checking global config.
///
/// Search order:
/// 1. `start` and its parent directories (walking up to root)
/// 2. Global config at ~/.config/vira/
fn find_config_file(start: &Path, filename: &str) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }
    }

    let global_path = dirs::config_dir()?.join("vira").join(filename);
    global_path.exists().then_some(global_path)
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to read current directory")
}

// ============================================================================
// Capability providers (.mcp.json)
// ============================================================================

/// MCP server configuration (from .mcp.json)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct McpConfig {
    #[serde(rename = "mcpServers", default)]
    pub mcp_servers: HashMap<String, McpServerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct McpServerConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Disabled servers stay listed but are never offered to agents
    #[serde(default)]
    pub disabled: bool,
}

impl McpConfig {
    /// Load MCP config from .mcp.json, searching upward from the current directory
    pub fn load() -> Result<Option<Self>> {
        Self::load_from_dir(&current_dir()?)
    }

    /// Load MCP config from .mcp.json, searching upward from `start`
    pub fn load_from_dir(start: &Path) -> Result<Option<Self>> {
        match find_config_file(start, ".mcp.json") {
            Some(path) => {
                tracing::debug!("Loading MCP config from: {}", path.display());
                Self::load_from_path(&path).map(Some)
            }
            None => {
                tracing::debug!("No .mcp.json found");
                Ok(None)
            }
        }
    }

    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid {}", path.display()))
    }
}

// ============================================================================
// Application configuration (.vira.toml)
// ============================================================================

/// Top-level configuration (from .vira.toml)
#[derive(Debug, Default, Deserialize)]
pub struct ViraFileConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Model catalog; the built-in catalog is used when empty
    #[serde(default)]
    pub models: Vec<ModelVariant>,
}

/// LLM configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Backend kind: "ollama" or "openai"
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_llm_url")]
    pub url: String,
    /// Environment variable holding the API key (openai backend)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Runtime configuration section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfig {
    /// Directory granted to the filesystem provider (defaults to cwd)
    #[serde(default)]
    pub workspace_dir: Option<PathBuf>,
    /// Cancel invocations running longer than this
    #[serde(default)]
    pub invocation_timeout_secs: Option<u64>,
}

fn default_backend() -> String {
    "ollama".to_string()
}

fn default_llm_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_llm_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl ViraFileConfig {
    /// Load config from .vira.toml
    ///
    /// Search order:
    /// 1. Walk up directory tree from cwd looking for .vira.toml
    /// 2. Check ~/.config/vira/.vira.toml (global fallback)
    /// 3. Fall back to defaults
    pub fn load() -> Result<Self> {
        Self::load_from_dir(&current_dir()?)
    }

    /// Same as [`ViraFileConfig::load`], searching upward from `start`
    pub fn load_from_dir(start: &Path) -> Result<Self> {
        if let Some(config_path) = find_config_file(start, ".vira.toml") {
            tracing::debug!("Loading config from: {}", config_path.display());
            return Self::load_from_path(&config_path);
        }

        tracing::debug!("No .vira.toml found, using defaults");
        Ok(Self::default())
    }

    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid {}", path.display()))
    }

    /// Model catalog from config, or the built-in one
    pub fn model_catalog(&self) -> Result<ModelCatalog> {
        if self.models.is_empty() {
            return Ok(ModelCatalog::builtin());
        }
        Ok(ModelCatalog::new(self.models.clone())?)
    }

    /// Workspace directory, resolved against the current directory
    pub fn workspace_dir(&self) -> Result<PathBuf> {
        let cwd = current_dir()?;
        Ok(match self.runtime.workspace_dir {
            Some(ref dir) if dir.is_absolute() => dir.clone(),
            Some(ref dir) => cwd.join(dir),
            None => cwd,
        })
    }
}

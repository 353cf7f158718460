//! Process-wide capability registry
//!
//! Read-mostly: providers are loaded once at startup. The only mutation is
//! argument augmentation: each distinct argument sequence is appended to a
//! provider at most once, checked and applied under a single lock.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::{McpConfig, McpServerConfig};

/// A configured capability provider
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityProvider {
    pub name: String,
    pub command: String,
    /// Startup arguments, in order
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub available: bool,
}

impl CapabilityProvider {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
            available: true,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    fn from_server_config(name: String, config: McpServerConfig) -> Self {
        Self {
            name,
            command: config.command,
            args: config.args,
            env: config.env,
            available: !config.disabled,
        }
    }
}

#[derive(Debug, Default)]
struct Providers {
    by_name: HashMap<String, CapabilityProvider>,
    /// Argument sequences already appended, per provider
    augmented: HashMap<String, HashSet<Vec<String>>>,
}

/// Registry of capability providers shared by all invocations
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    providers: Mutex<Providers>,
}

impl CapabilityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from MCP server configuration
    pub fn from_config(config: McpConfig) -> Self {
        let by_name = config
            .mcp_servers
            .into_iter()
            .map(|(name, cfg)| (name.clone(), CapabilityProvider::from_server_config(name, cfg)))
            .collect();

        Self {
            providers: Mutex::new(Providers {
                by_name,
                augmented: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Providers> {
        self.providers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or replace a provider (setup time only)
    pub fn insert(&self, provider: CapabilityProvider) {
        self.lock().by_name.insert(provider.name.clone(), provider);
    }

    /// Whether a provider is configured and available
    pub fn has(&self, name: &str) -> bool {
        self.lock().by_name.get(name).is_some_and(|p| p.available)
    }

    /// Snapshot of an available provider
    pub fn provider(&self, name: &str) -> Option<CapabilityProvider> {
        self.lock().by_name.get(name).filter(|p| p.available).cloned()
    }

    /// Names of all available providers, sorted
    pub fn available_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .lock()
            .by_name
            .values()
            .filter(|p| p.available)
            .map(|p| p.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Append `extra` to a provider's startup arguments, once per registry
    ///
    /// The sequence is appended whole and in order the first time it is seen
    /// for `name`; later calls with the same sequence do nothing. No-op when
    /// the provider is absent or unavailable.
    pub fn augment_args<S: AsRef<str>>(&self, name: &str, extra: &[S]) {
        let extra: Vec<String> = extra.iter().map(|arg| arg.as_ref().to_string()).collect();

        let mut guard = self.lock();
        let Providers { by_name, augmented } = &mut *guard;
        let Some(provider) = by_name.get_mut(name).filter(|p| p.available) else {
            tracing::debug!("Capability '{}' not available, skipping argument augmentation", name);
            return;
        };

        let applied = augmented.entry(name.to_string()).or_default();
        if extra.is_empty() || !applied.insert(extra.clone()) {
            return;
        }
        tracing::debug!("Capability '{}': appending arguments {:?}", name, extra);
        provider.args.extend(extra);
    }
}

//! Capability providers (MCP servers)
//!
//! - [`CapabilityRegistry`]: process-wide set of configured providers
//! - [`CapabilityConnector`] / [`CapabilitySession`]: connection seam
//! - [`ConnectionScope`]: the sessions one agent holds open
//! - [`McpConnector`]: spawns providers as child processes over rmcp

mod registry;
mod session;
#[cfg(feature = "mcp")]
mod spawn;

pub use registry::{CapabilityProvider, CapabilityRegistry};
pub use session::{CapabilityConnector, CapabilitySession, ConnectionScope};
#[cfg(feature = "mcp")]
pub use spawn::McpConnector;

//! Shared core types used across the schema, store and persistence layers.

use serde::{Deserialize, Serialize};

/// How an MCP server is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    /// Locally spawned process (command + args).
    #[default]
    Stdio,
    /// Remote endpoint reached by URL.
    Sse,
}

impl ServerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerType::Stdio => "stdio",
            ServerType::Sse => "sse",
        }
    }
}

impl std::fmt::Display for ServerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServerType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "stdio" => Ok(ServerType::Stdio),
            "sse" => Ok(ServerType::Sse),
            _ => anyhow::bail!("Invalid server type: '{}'. Valid values: stdio, sse", value),
        }
    }
}

/// Environment variables in insertion order.
pub type EnvMap = indexmap::IndexMap<String, String>;

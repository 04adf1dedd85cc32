//! MCP configuration wire format
//!
//! The document exchanged via file, clipboard and share link:
//! `{ "mcpServers": { "<key>": { "command": ..., "args": [...], "env": {...} } } }`.
//! Server variants carry no explicit tag; they are told apart by the presence
//! of `command` or `url`, which is decided once in [`RawServer`].

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{EnvMap, ServerType};

/// Locally spawned MCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StdioServer {
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: EnvMap,
}

/// Remote MCP server reached over SSE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SseServer {
    pub url: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: EnvMap,
}

/// One entry of `mcpServers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum McpServer {
    Stdio(StdioServer),
    Sse(SseServer),
}

impl McpServer {
    pub fn stdio(command: impl Into<String>, args: Vec<String>, env: EnvMap) -> Self {
        McpServer::Stdio(StdioServer {
            command: command.into(),
            args,
            env,
        })
    }

    pub fn sse(url: impl Into<String>, env: EnvMap) -> Self {
        McpServer::Sse(SseServer {
            url: url.into(),
            env,
        })
    }

    pub fn server_type(&self) -> ServerType {
        match self {
            McpServer::Stdio(_) => ServerType::Stdio,
            McpServer::Sse(_) => ServerType::Sse,
        }
    }

    pub fn env(&self) -> &EnvMap {
        match self {
            McpServer::Stdio(server) => &server.env,
            McpServer::Sse(server) => &server.env,
        }
    }
}

/// Untyped shape of a server object before the variant is known.
///
/// Unknown keys are ignored so newer documents still load.
#[derive(Debug, Deserialize)]
struct RawServer {
    command: Option<String>,
    url: Option<String>,
    args: Option<Vec<String>>,
    env: Option<EnvMap>,
}

impl TryFrom<RawServer> for McpServer {
    type Error = String;

    fn try_from(raw: RawServer) -> Result<Self, Self::Error> {
        let env = raw.env.unwrap_or_default();
        match (raw.command, raw.url) {
            (Some(command), None) => Ok(McpServer::Stdio(StdioServer {
                command,
                args: raw.args.unwrap_or_default(),
                env,
            })),
            (None, Some(url)) => Ok(McpServer::Sse(SseServer { url, env })),
            (Some(_), Some(_)) => {
                Err("server cannot have both \"command\" and \"url\" properties".to_string())
            }
            (None, None) => {
                Err("server must have either \"command\" or \"url\" property".to_string())
            }
        }
    }
}

impl<'de> Deserialize<'de> for McpServer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawServer::deserialize(deserializer)?;
        McpServer::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Top-level MCP configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpConfig {
    pub mcp_servers: IndexMap<String, McpServer>,
}

impl McpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.mcp_servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mcp_servers.is_empty()
    }

    /// Overlay `other` on top of this config. Keys already present keep their
    /// position and take the incoming value.
    pub fn merge(&mut self, other: McpConfig) {
        for (key, server) in other.mcp_servers {
            self.mcp_servers.insert(key, server);
        }
    }
}

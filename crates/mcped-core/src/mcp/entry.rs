//! Editor-side server entries and conversion to and from the wire format.

use serde::{Deserialize, Serialize};

use super::schema::{McpServer, SseServer, StdioServer};
use crate::types::{EnvMap, ServerType};

/// Variant-specific fields of an entry, gated by its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryKind {
    Stdio {
        #[serde(default)]
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
    Sse {
        #[serde(default)]
        url: String,
    },
}

impl EntryKind {
    /// Blank fields for the given type.
    pub fn empty(server_type: ServerType) -> Self {
        match server_type {
            ServerType::Stdio => EntryKind::Stdio {
                command: String::new(),
                args: Vec::new(),
            },
            ServerType::Sse => EntryKind::Sse { url: String::new() },
        }
    }
}

/// One configured server as the editor holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Display name and export key.
    pub key: String,
    #[serde(flatten)]
    pub kind: EntryKind,
    #[serde(default)]
    pub env: EnvMap,
}

impl ServerEntry {
    /// New stdio entry with empty command, args and env.
    pub fn stdio(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: EntryKind::empty(ServerType::Stdio),
            env: EnvMap::new(),
        }
    }

    pub fn server_type(&self) -> ServerType {
        match self.kind {
            EntryKind::Stdio { .. } => ServerType::Stdio,
            EntryKind::Sse { .. } => ServerType::Sse,
        }
    }

    /// Switch the entry's type, clearing the fields of the previous variant.
    /// Setting the current type leaves the entry as is.
    pub fn set_type(&mut self, server_type: ServerType) {
        if self.server_type() != server_type {
            self.kind = EntryKind::empty(server_type);
        }
    }

    pub fn command(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Stdio { command, .. } => Some(command),
            EntryKind::Sse { .. } => None,
        }
    }

    pub fn args(&self) -> Option<&[String]> {
        match &self.kind {
            EntryKind::Stdio { args, .. } => Some(args),
            EntryKind::Sse { .. } => None,
        }
    }

    pub fn args_mut(&mut self) -> Option<&mut Vec<String>> {
        match &mut self.kind {
            EntryKind::Stdio { args, .. } => Some(args),
            EntryKind::Sse { .. } => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Sse { url } => Some(url),
            EntryKind::Stdio { .. } => None,
        }
    }

    /// Short description for list views: the command or URL, or a placeholder.
    pub fn summary(&self) -> &str {
        match &self.kind {
            EntryKind::Stdio { command, .. } if !command.is_empty() => command.as_str(),
            EntryKind::Stdio { .. } => "No command",
            EntryKind::Sse { url } if !url.is_empty() => url.as_str(),
            EntryKind::Sse { .. } => "No URL",
        }
    }

    /// Merge a partial update into this entry.
    ///
    /// The type is applied first; fields that do not belong to the resulting
    /// type are ignored.
    pub fn apply(&mut self, update: ServerUpdate) {
        if let Some(server_type) = update.server_type {
            self.set_type(server_type);
        }
        if let Some(key) = update.key {
            self.key = key;
        }
        match &mut self.kind {
            EntryKind::Stdio { command, args } => {
                if let Some(new_command) = update.command {
                    *command = new_command;
                }
                if let Some(new_args) = update.args {
                    *args = new_args;
                }
            }
            EntryKind::Sse { url } => {
                if let Some(new_url) = update.url {
                    *url = new_url;
                }
            }
        }
        if let Some(env) = update.env {
            self.env = env;
        }
    }
}

/// Partial update for [`ServerEntry::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerUpdate {
    pub key: Option<String>,
    pub server_type: Option<ServerType>,
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub url: Option<String>,
    pub env: Option<EnvMap>,
}

impl ServerUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_type(mut self, server_type: ServerType) -> Self {
        self.server_type = Some(server_type);
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = Some(args);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_env(mut self, env: EnvMap) -> Self {
        self.env = Some(env);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Convert an entry to its wire form, leaving out empty `args` and `env`.
pub fn server_entry_to_mcp_server(entry: &ServerEntry) -> McpServer {
    match &entry.kind {
        EntryKind::Stdio { command, args } => McpServer::Stdio(StdioServer {
            command: command.clone(),
            args: args.clone(),
            env: entry.env.clone(),
        }),
        EntryKind::Sse { url } => McpServer::Sse(SseServer {
            url: url.clone(),
            env: entry.env.clone(),
        }),
    }
}

/// Build an entry from a decoded wire server; absent collections come back empty.
pub fn mcp_server_to_entry(key: impl Into<String>, server: McpServer) -> ServerEntry {
    match server {
        McpServer::Stdio(StdioServer { command, args, env }) => ServerEntry {
            key: key.into(),
            kind: EntryKind::Stdio { command, args },
            env,
        },
        McpServer::Sse(SseServer { url, env }) => ServerEntry {
            key: key.into(),
            kind: EntryKind::Sse { url },
            env,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> EnvMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn stdio_entry_omits_empty_collections() {
        let entry = ServerEntry::stdio("fs");
        let value = serde_json::to_value(server_entry_to_mcp_server(&entry)).unwrap();
        assert_eq!(value, json!({"command": ""}));
    }

    #[test]
    fn sse_entry_never_emits_command() {
        let mut entry = ServerEntry::stdio("remote");
        entry.apply(
            ServerUpdate::new()
                .with_type(ServerType::Sse)
                .with_url("https://mcp.example.com")
                .with_env(env(&[("TOKEN", "abc")])),
        );
        let value = serde_json::to_value(server_entry_to_mcp_server(&entry)).unwrap();
        assert_eq!(
            value,
            json!({"url": "https://mcp.example.com", "env": {"TOKEN": "abc"}})
        );
    }

    #[test]
    fn round_trip_is_identity_for_store_entries() {
        let mut entry = ServerEntry::stdio("fs");
        entry.apply(
            ServerUpdate::new()
                .with_command("npx")
                .with_args(vec!["-y".into(), "pkg".into()])
                .with_env(env(&[("B", "2"), ("A", "1")])),
        );
        let back = mcp_server_to_entry("fs", server_entry_to_mcp_server(&entry));
        assert_eq!(back, entry);

        let blank = ServerEntry::stdio("blank");
        let back = mcp_server_to_entry("blank", server_entry_to_mcp_server(&blank));
        assert_eq!(back, blank);
    }

    #[test]
    fn switching_type_clears_other_variant() {
        let mut entry = ServerEntry::stdio("s");
        entry.apply(
            ServerUpdate::new()
                .with_command("node")
                .with_args(vec!["index.js".into()]),
        );

        entry.set_type(ServerType::Sse);
        assert_eq!(entry.url(), Some(""));
        assert_eq!(entry.command(), None);
        assert_eq!(entry.args(), None);

        entry.apply(ServerUpdate::new().with_url("https://x"));
        entry.set_type(ServerType::Stdio);
        assert_eq!(entry.url(), None);
        assert_eq!(entry.command(), Some(""));
        assert_eq!(entry.args(), Some(&[] as &[String]));
    }

    #[test]
    fn setting_same_type_keeps_fields() {
        let mut entry = ServerEntry::stdio("s");
        entry.apply(ServerUpdate::new().with_command("node"));
        entry.set_type(ServerType::Stdio);
        assert_eq!(entry.command(), Some("node"));
    }

    #[test]
    fn update_ignores_fields_of_other_variant() {
        let mut entry = ServerEntry::stdio("s");
        entry.apply(ServerUpdate::new().with_url("https://ignored"));
        assert_eq!(entry.url(), None);
        assert_eq!(entry.command(), Some(""));
    }

    #[test]
    fn persisted_shape_carries_type_tag() {
        let entry = ServerEntry::stdio("fs");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({"key": "fs", "type": "stdio", "command": "", "args": [], "env": {}})
        );
        let back: ServerEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn summary_falls_back_to_placeholder() {
        let mut entry = ServerEntry::stdio("s");
        assert_eq!(entry.summary(), "No command");
        entry.set_type(ServerType::Sse);
        assert_eq!(entry.summary(), "No URL");
    }
}

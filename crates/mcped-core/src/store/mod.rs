//! Entry store: the ordered server list and its mutation surface.
//!
//! Mutators addressed by key are permissive: an unknown key (or an
//! out-of-range argument index) changes nothing. They report whether anything
//! matched so front ends can tell the user.

pub mod keys;

use serde::{Deserialize, Serialize};

use crate::mcp::{
    McpConfig, ServerEntry, ServerUpdate, mcp_server_to_entry, server_entry_to_mcp_server,
};

pub use keys::{next_env_key, next_server_key};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStore {
    servers: Vec<ServerEntry>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_servers(servers: Vec<ServerEntry>) -> Self {
        Self { servers }
    }

    pub fn servers(&self) -> &[ServerEntry] {
        &self.servers
    }

    pub fn into_servers(self) -> Vec<ServerEntry> {
        self.servers
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.servers.iter().map(|s| s.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&ServerEntry> {
        self.servers.iter().find(|s| s.key == key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut ServerEntry> {
        self.servers.iter_mut().find(|s| s.key == key)
    }

    /// Append a blank stdio entry under the next free `server-N` key.
    pub fn add_server(&mut self) -> String {
        let key = next_server_key(&self.servers);
        tracing::debug!(key = %key, "adding server");
        self.servers.push(ServerEntry::stdio(key.clone()));
        key
    }

    /// Merge `update` into the entry with `key`.
    pub fn update_server(&mut self, key: &str, update: ServerUpdate) -> bool {
        let Some(entry) = self.get_mut(key) else {
            return false;
        };
        tracing::debug!(key, ?update, "updating server");
        entry.apply(update);
        true
    }

    /// Remove every entry with `key`.
    pub fn remove_server(&mut self, key: &str) -> bool {
        let before = self.servers.len();
        self.servers.retain(|s| s.key != key);
        let removed = self.servers.len() != before;
        if removed {
            tracing::debug!(key, "removed server");
        }
        removed
    }

    /// Append a copy of the entry with `key` under a fresh key.
    pub fn duplicate_server(&mut self, key: &str) -> Option<String> {
        let mut copy = self.get(key)?.clone();
        copy.key = next_server_key(&self.servers);
        tracing::debug!(from = key, to = %copy.key, "duplicating server");
        let new_key = copy.key.clone();
        self.servers.push(copy);
        Some(new_key)
    }

    pub fn clear_all(&mut self) {
        tracing::debug!(count = self.servers.len(), "clearing all servers");
        self.servers.clear();
    }

    /// Append an empty argument. Only stdio entries have arguments.
    pub fn add_arg(&mut self, key: &str) -> bool {
        match self.get_mut(key).and_then(ServerEntry::args_mut) {
            Some(args) => {
                args.push(String::new());
                true
            }
            None => false,
        }
    }

    pub fn update_arg(&mut self, key: &str, index: usize, value: impl Into<String>) -> bool {
        let Some(slot) = self
            .get_mut(key)
            .and_then(ServerEntry::args_mut)
            .and_then(|args| args.get_mut(index))
        else {
            return false;
        };
        *slot = value.into();
        true
    }

    /// Remove the argument at `index`, shifting later ones down.
    pub fn remove_arg(&mut self, key: &str, index: usize) -> bool {
        match self.get_mut(key).and_then(ServerEntry::args_mut) {
            Some(args) if index < args.len() => {
                args.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Add an empty variable under the next free `KEY_N` name.
    pub fn add_env(&mut self, key: &str) -> Option<String> {
        let entry = self.get_mut(key)?;
        let env_key = next_env_key(&entry.env);
        entry.env.insert(env_key.clone(), String::new());
        Some(env_key)
    }

    /// Set a variable, renaming it when `old_env_key != new_env_key`.
    ///
    /// A rename keeps the variable's position. Renaming onto a name that
    /// already exists overwrites that variable.
    pub fn update_env(
        &mut self,
        key: &str,
        old_env_key: &str,
        new_env_key: &str,
        value: impl Into<String>,
    ) -> bool {
        let Some(entry) = self.get_mut(key) else {
            return false;
        };
        let value = value.into();

        if old_env_key == new_env_key {
            entry.env.insert(new_env_key.to_string(), value);
            return true;
        }

        let position = entry.env.shift_remove_full(old_env_key).map(|(idx, _, _)| idx);
        if let Some(existing) = entry.env.get_mut(new_env_key) {
            *existing = value;
        } else if let Some(idx) = position {
            entry.env.shift_insert(idx, new_env_key.to_string(), value);
        } else {
            entry.env.insert(new_env_key.to_string(), value);
        }
        true
    }

    pub fn remove_env(&mut self, key: &str, env_key: &str) -> bool {
        self.get_mut(key)
            .is_some_and(|entry| entry.env.shift_remove(env_key).is_some())
    }

    /// Replace the whole list with one entry per server in `config`, in
    /// document order.
    pub fn import_json(&mut self, config: McpConfig) {
        self.servers = config
            .mcp_servers
            .into_iter()
            .map(|(key, server)| mcp_server_to_entry(key, server))
            .collect();
        tracing::debug!(count = self.servers.len(), "imported servers");
    }

    /// Build the wire document. Entries with a blank key are skipped; when two
    /// entries share a key the later one wins.
    pub fn export_json(&self) -> McpConfig {
        let mut config = McpConfig::new();
        for entry in &self.servers {
            if entry.key.trim().is_empty() {
                continue;
            }
            config
                .mcp_servers
                .insert(entry.key.clone(), server_entry_to_mcp_server(entry));
        }
        config
    }

    /// Overlay `config` on the current export and import the result.
    /// Returns how many servers `config` contributed.
    pub fn merge_json(&mut self, config: McpConfig) -> usize {
        let added = config.len();
        let mut merged = self.export_json();
        merged.merge(config);
        self.import_json(merged);
        added
    }
}

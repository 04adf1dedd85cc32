//! Key generation for new servers and environment variables.
//!
//! Both generators pick the lowest unused positive suffix from the current
//! state, so gaps left by deletions are filled first.

use std::collections::HashSet;

use crate::mcp::ServerEntry;
use crate::types::EnvMap;

pub const SERVER_KEY_PREFIX: &str = "server-";
pub const ENV_KEY_PREFIX: &str = "KEY_";

/// First `server-N` (N ≥ 1) not used by any entry.
pub fn next_server_key(servers: &[ServerEntry]) -> String {
    let existing: HashSet<&str> = servers.iter().map(|s| s.key.as_str()).collect();
    lowest_unused(SERVER_KEY_PREFIX, |candidate| existing.contains(candidate))
}

/// First `KEY_N` (N ≥ 1) absent from `env`.
pub fn next_env_key(env: &EnvMap) -> String {
    lowest_unused(ENV_KEY_PREFIX, |candidate| env.contains_key(candidate))
}

fn lowest_unused(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    (1..)
        .map(|n: u64| format!("{prefix}{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| format!("{prefix}{}", u64::MAX))
}

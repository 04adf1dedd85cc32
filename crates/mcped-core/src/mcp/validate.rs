//! Structural validation of untyped MCP JSON.
//!
//! [`validate_mcp_json`] accumulates one message per violation. The two
//! top-level shape checks and the `mcpServers` type check are fatal and
//! returned alone. [`check_add_json`] layers the add-server flow's tiers
//! (error / warning / valid) on top of the same rules.

use std::collections::HashSet;

use serde_json::Value;

use super::parser::{ParseError, parse_mcp_json};
use super::schema::McpConfig;

/// Outcome of [`validate_mcp_json`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn fatal(message: &str) -> Self {
        Self {
            valid: false,
            errors: vec![message.to_string()],
        }
    }

    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check an arbitrary JSON value against the MCP config structure.
pub fn validate_mcp_json(value: &Value) -> ValidationResult {
    let Value::Object(root) = value else {
        return ValidationResult::fatal("JSON must be an object");
    };

    let Some(servers) = root.get("mcpServers") else {
        return ValidationResult::fatal("Missing \"mcpServers\" property");
    };

    let Value::Object(servers) = servers else {
        return ValidationResult::fatal("\"mcpServers\" must be an object");
    };

    let mut errors = Vec::new();

    for (key, server) in servers {
        let Value::Object(server) = server else {
            errors.push(format!("Server \"{key}\" must be an object"));
            continue;
        };

        let command = server.get("command");
        let url = server.get("url");

        match (command, url) {
            (None, None) => errors.push(format!(
                "Server \"{key}\" must have either \"command\" or \"url\" property"
            )),
            (Some(_), Some(_)) => errors.push(format!(
                "Server \"{key}\" cannot have both \"command\" and \"url\" properties"
            )),
            _ => {}
        }

        if command.is_some_and(|v| !v.is_string()) {
            errors.push(format!("Server \"{key}\": \"command\" must be a string"));
        }

        if url.is_some_and(|v| !v.is_string()) {
            errors.push(format!("Server \"{key}\": \"url\" must be a string"));
        }

        if server.get("args").is_some_and(|v| !v.is_array()) {
            errors.push(format!("Server \"{key}\": \"args\" must be an array"));
        }

        if server.get("env").is_some_and(|v| !v.is_object()) {
            errors.push(format!("Server \"{key}\": \"env\" must be an object"));
        }
    }

    ValidationResult::from_errors(errors)
}

/// Severity tier of the add-server check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddStatus {
    /// Input is usable and introduces only new keys.
    Valid,
    /// Input is usable but some keys already exist and will be overwritten.
    Warning,
    /// Input cannot be added.
    Error,
}

impl AddStatus {
    pub fn can_add(&self) -> bool {
        matches!(self, AddStatus::Valid | AddStatus::Warning)
    }
}

/// Result of [`check_add_json`].
#[derive(Debug, Clone)]
pub struct AddCheck {
    pub status: AddStatus,
    pub message: String,
    /// Decoded config, present unless `status` is [`AddStatus::Error`].
    pub config: Option<McpConfig>,
    /// Incoming keys that already exist, in document order.
    pub collisions: Vec<String>,
}

impl AddCheck {
    fn error(message: impl Into<String>) -> Self {
        Self {
            status: AddStatus::Error,
            message: message.into(),
            config: None,
            collisions: Vec::new(),
        }
    }
}

/// Classify JSON text pasted into the add-server flow.
///
/// Runs the same parse and structural rules as every other import path, then
/// requires at least one server and reports key collisions against
/// `existing_keys` as a non-blocking warning.
pub fn check_add_json<'a>(
    text: &str,
    existing_keys: impl IntoIterator<Item = &'a str>,
) -> AddCheck {
    if text.trim().is_empty() {
        return AddCheck::error("Please enter JSON.");
    }

    let config = match parse_mcp_json(text) {
        Ok(config) => config,
        Err(err @ ParseError::Syntax { .. }) => return AddCheck::error(err.to_string()),
        Err(ParseError::Schema { errors }) => return AddCheck::error(errors.join("\n")),
    };

    if config.is_empty() {
        return AddCheck::error("No servers are defined in \"mcpServers\".");
    }

    let existing: HashSet<&str> = existing_keys.into_iter().collect();
    let collisions: Vec<String> = config
        .mcp_servers
        .keys()
        .filter(|key| existing.contains(key.as_str()))
        .cloned()
        .collect();

    let (status, message) = if collisions.is_empty() {
        (
            AddStatus::Valid,
            format!(
                "Valid JSON. {} server(s) defined.",
                config.mcp_servers.len()
            ),
        )
    } else {
        let list = collisions
            .iter()
            .map(|key| format!("\"{key}\""))
            .collect::<Vec<_>>()
            .join(", ");
        (
            AddStatus::Warning,
            format!("{list} already exist(s). Adding will overwrite the existing server(s)."),
        )
    };

    AddCheck {
        status,
        message,
        config: Some(config),
        collisions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_object_is_fatal() {
        let result = validate_mcp_json(&json!("text"));
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["JSON must be an object"]);

        let result = validate_mcp_json(&Value::Null);
        assert_eq!(result.errors, vec!["JSON must be an object"]);
    }

    #[test]
    fn missing_servers_is_fatal() {
        let result = validate_mcp_json(&json!({"servers": {}}));
        assert_eq!(result.errors, vec!["Missing \"mcpServers\" property"]);
    }

    #[test]
    fn null_servers_is_fatal() {
        let result = validate_mcp_json(&json!({"mcpServers": null}));
        assert_eq!(result.errors, vec!["\"mcpServers\" must be an object"]);
    }

    #[test]
    fn empty_servers_is_structurally_valid() {
        let result = validate_mcp_json(&json!({"mcpServers": {}}));
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn command_and_url_conflict_names_the_key() {
        let result = validate_mcp_json(&json!({"mcpServers": {"a": {"command": "x", "url": "y"}}}));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("\"a\""));
        assert!(result.errors[0].contains("both \"command\" and \"url\""));
    }

    #[test]
    fn accumulates_errors_across_servers_in_order() {
        let result = validate_mcp_json(&json!({
            "mcpServers": {
                "first": 42,
                "second": {"command": 7, "args": "nope", "env": null},
                "third": {}
            }
        }));
        assert_eq!(
            result.errors,
            vec![
                "Server \"first\" must be an object",
                "Server \"second\": \"command\" must be a string",
                "Server \"second\": \"args\" must be an array",
                "Server \"second\": \"env\" must be an object",
                "Server \"third\" must have either \"command\" or \"url\" property",
            ]
        );
    }

    #[test]
    fn valid_stdio_config_passes() {
        let result = validate_mcp_json(&json!({
            "mcpServers": {"fs": {"command": "npx", "args": ["-y", "pkg"]}}
        }));
        assert!(result.valid);
    }

    #[test]
    fn add_check_rejects_blank_and_broken_input() {
        assert_eq!(check_add_json("   ", []).status, AddStatus::Error);

        let check = check_add_json("{\"mcpServers\": ", []);
        assert_eq!(check.status, AddStatus::Error);
        assert!(check.message.starts_with("Invalid JSON"));
    }

    #[test]
    fn add_check_requires_a_server() {
        let check = check_add_json(r#"{"mcpServers": {}}"#, []);
        assert_eq!(check.status, AddStatus::Error);
        assert!(!check.status.can_add());
        assert!(check.message.contains("No servers"));
    }

    #[test]
    fn add_check_warns_on_collisions() {
        let text = r#"{"mcpServers": {"fs": {"command": "npx"}, "git": {"command": "uvx"}}}"#;
        let check = check_add_json(text, ["fs", "other"]);
        assert_eq!(check.status, AddStatus::Warning);
        assert!(check.status.can_add());
        assert_eq!(check.collisions, vec!["fs"]);
        assert!(check.message.contains("\"fs\""));
        assert!(check.config.is_some());
    }

    #[test]
    fn add_check_reports_count_when_valid() {
        let text = r#"{"mcpServers": {"fs": {"command": "npx"}, "web": {"url": "https://x"}}}"#;
        let check = check_add_json(text, ["other"]);
        assert_eq!(check.status, AddStatus::Valid);
        assert!(check.message.contains("2 server(s)"));
    }
}

//! MCP JSON parsing and serialization with readable errors

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use thiserror::Error;

use super::schema::{McpConfig, McpServer};
use super::validate::validate_mcp_json;

/// Why JSON text could not be turned into an [`McpConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text is not valid JSON.
    #[error("Invalid JSON: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
    /// Valid JSON that breaks the MCP structure; one message per violation.
    #[error("{}", .errors.join("\n"))]
    Schema { errors: Vec<String> },
}

/// Parse MCP JSON text, validating its structure.
pub fn parse_mcp_json(content: &str) -> Result<McpConfig, ParseError> {
    let value: Value = serde_json::from_str(content).map_err(|e| ParseError::Syntax {
        message: e.to_string(),
        line: e.line(),
        column: e.column(),
    })?;
    parse_mcp_value(value)
}

/// Validate an already-parsed JSON value and decode it.
///
/// Servers are decoded one at a time so every message names the server and,
/// where the structural pass could not see it, the offending field.
pub fn parse_mcp_value(value: Value) -> Result<McpConfig, ParseError> {
    let validation = validate_mcp_json(&value);
    if !validation.valid {
        return Err(ParseError::Schema {
            errors: validation.errors,
        });
    }

    let servers = match value {
        Value::Object(mut root) => root.remove("mcpServers"),
        _ => None,
    };
    let Some(Value::Object(servers)) = servers else {
        return Err(ParseError::Schema {
            errors: vec!["\"mcpServers\" must be an object".to_string()],
        });
    };

    let mut config = McpConfig::new();
    let mut errors = Vec::new();
    for (key, server) in servers {
        let field_errors = element_type_errors(&key, &server);
        if !field_errors.is_empty() {
            errors.extend(field_errors);
            continue;
        }
        match serde_json::from_value::<McpServer>(server) {
            Ok(server) => {
                config.mcp_servers.insert(key, server);
            }
            Err(e) => errors.push(format!("Server \"{key}\": {e}")),
        }
    }

    if errors.is_empty() {
        Ok(config)
    } else {
        Err(ParseError::Schema { errors })
    }
}

/// Non-string `args` elements and `env` values, which the structural pass
/// does not look inside.
fn element_type_errors(key: &str, server: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(Value::Array(args)) = server.get("args") {
        for (index, arg) in args.iter().enumerate() {
            if !arg.is_string() {
                errors.push(format!(
                    "Server \"{key}\": \"args[{index}]\" must be a string"
                ));
            }
        }
    }

    if let Some(Value::Object(env)) = server.get("env") {
        for (name, value) in env {
            if !value.is_string() {
                errors.push(format!(
                    "Server \"{key}\": \"env.{name}\" must be a string"
                ));
            }
        }
    }

    errors
}

/// Serialize a config the way it is saved and copied: two-space indented JSON.
pub fn stringify_mcp_json(config: &McpConfig) -> Result<String> {
    serde_json::to_string_pretty(config).context("Failed to serialize MCP configuration")
}

/// Read and parse an MCP JSON file.
pub fn read_mcp_json(path: &Path) -> Result<McpConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_mcp_json(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Write a config to `path`, creating parent directories.
pub fn write_mcp_json(path: &Path, config: &McpConfig) -> Result<()> {
    let content = stringify_mcp_json(config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

/// Lines around `line_num` (1-based) with the offending line marked.
pub fn line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2).min(lines.len());
    let end = (line_num + 2).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_valid_config() {
        let json = r#"{"mcpServers": {"fs": {"command": "npx", "args": ["-y", "pkg"]}}}"#;
        let config = parse_mcp_json(json).unwrap();
        assert_eq!(config.len(), 1);
        assert!(matches!(config.mcp_servers["fs"], McpServer::Stdio(_)));
    }

    #[test]
    fn test_parse_invalid_json_reports_position() {
        let err = parse_mcp_json("{\n  \"mcpServers\": {,\n}").unwrap_err();
        match &err {
            ParseError::Syntax { line, .. } => assert_eq!(*line, 2),
            other => panic!("expected syntax error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("Invalid JSON: "));
    }

    #[test]
    fn test_parse_schema_errors_are_joined() {
        let json = r#"{"mcpServers": {"a": {}, "b": {"command": "x", "url": "y"}}}"#;
        let err = parse_mcp_json(json).unwrap_err();
        let ParseError::Schema { errors } = &err else {
            panic!("expected schema error");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(err.to_string().lines().count(), 2);
    }

    #[test]
    fn test_parse_rejects_non_string_env_value() {
        let json = r#"{"mcpServers": {"alpha": {"command": "x"}, "beta": {"command": "x", "env": {"PORT": 8080}}}}"#;
        let err = parse_mcp_json(json).unwrap_err();
        let ParseError::Schema { errors } = &err else {
            panic!("expected schema error, got {err:?}");
        };
        assert_eq!(errors, &vec!["Server \"beta\": \"env.PORT\" must be a string"]);
    }

    #[test]
    fn test_parse_rejects_non_string_arg() {
        let json = r#"{"mcpServers": {"alpha": {"command": "x", "args": ["a", 1]}, "beta": {"command": "y"}}}"#;
        let msg = parse_mcp_json(json).unwrap_err().to_string();
        assert!(msg.contains("\"alpha\""));
        assert!(msg.contains("\"args[1]\""));
        assert!(!msg.contains("beta"));
    }

    #[test]
    fn test_parse_reports_every_broken_server() {
        let json = r#"{"mcpServers": {
            "a": {"command": "x", "args": [true]},
            "b": {"url": "y", "env": {"K": null}}
        }}"#;
        let ParseError::Schema { errors } = parse_mcp_json(json).unwrap_err() else {
            panic!("expected schema error");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("Server \"a\""));
        assert!(errors[1].starts_with("Server \"b\""));
    }

    #[test]
    fn test_stringify_roundtrip() {
        let json = r#"{"mcpServers": {"fs": {"command": "npx", "args": ["-y", "pkg"]}}}"#;
        let config = parse_mcp_json(json).unwrap();
        let text = stringify_mcp_json(&config).unwrap();

        assert!(text.contains("\n  \"mcpServers\""));
        let reparsed: Value = serde_json::from_str(&text).unwrap();
        let original: Value = serde_json::from_str(json).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_read_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"{{"mcpServers": {{"remote": {{"url": "https://mcp.example.com/sse"}}}}}}"#
        )
        .unwrap();

        let config = read_mcp_json(temp_file.path()).unwrap();
        assert!(config.mcp_servers.contains_key("remote"));
    }

    #[test]
    fn test_read_nonexistent_file() {
        let result = read_mcp_json(Path::new("/nonexistent/path/config.json"));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    fn test_line_context_marks_line() {
        let context = line_context("a\nb\nc\nd", 2);
        assert!(context.contains(">>>    2 | b"));
        assert!(context.contains("      1 | a"));
    }
}

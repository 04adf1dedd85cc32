//! MCP (Model Context Protocol) configuration model
//!
//! - `schema`: the wire document (`mcpServers`)
//! - `entry`: the editor's entry shape and conversion
//! - `validate`: structural checks over untyped JSON
//! - `parser`: text in, text out

pub mod entry;
pub mod parser;
pub mod schema;
pub mod validate;

pub use entry::{
    EntryKind, ServerEntry, ServerUpdate, mcp_server_to_entry, server_entry_to_mcp_server,
};
pub use parser::{ParseError, parse_mcp_json, stringify_mcp_json};
pub use schema::{McpConfig, McpServer, SseServer, StdioServer};
pub use validate::{AddCheck, AddStatus, ValidationResult, check_add_json, validate_mcp_json};

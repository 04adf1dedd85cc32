//! mcped Core Library
//!
//! Data model, validation, entry store and share links for editing MCP
//! server configuration files (`claude_desktop_config.json` and friends).

pub mod clipboard;
pub mod editor;
pub mod mcp;
pub mod notice;
pub mod settings;
pub mod share;
pub mod storage;
pub mod store;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Wire format and entries
    pub use crate::mcp::{
        AddCheck, AddStatus, EntryKind, McpConfig, McpServer, ParseError, ServerEntry,
        ServerUpdate, ValidationResult, check_add_json, mcp_server_to_entry, parse_mcp_json,
        server_entry_to_mcp_server, stringify_mcp_json, validate_mcp_json,
    };

    // Store
    pub use crate::store::{EntryStore, next_env_key, next_server_key};

    // Share links
    pub use crate::share::{
        DeflateCodec, ShareError, TokenCodec, generate_share_url, load_from_share_url,
    };

    // Session
    pub use crate::clipboard::{Clipboard, MemoryClipboard};
    pub use crate::editor::Editor;
    pub use crate::notice::{Notice, NoticeBoard, NoticeLevel};
    pub use crate::settings::EditorSettings;
    pub use crate::storage::{FileStorage, MemoryStorage, PersistedState, StateStorage};

    pub use crate::types::{EnvMap, ServerType};
}

//! Tool settings loaded from `settings.toml`.
//!
//! ```toml
//! share_base_url = "https://mcp-editor.example.com/"
//! notice_secs = 3
//! export_file_name = "claude_desktop_config.json"
//! storage_path = "/home/me/.local/share/mcped/mcped-storage.json"
//! ```
//!
//! Every key is optional; a missing file means defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::mcp::parser::line_context;

/// File name used when saving the configuration.
pub const EXPORT_FILE_NAME: &str = "claude_desktop_config.json";
pub const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:5173/";
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Page that share links point at; its query and fragment are ignored.
    pub share_base_url: String,
    /// Notice lifetime in seconds.
    pub notice_secs: u64,
    pub export_file_name: String,
    /// Overrides the default storage file location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            notice_secs: 3,
            export_file_name: EXPORT_FILE_NAME.to_string(),
            storage_path: None,
        }
    }
}

impl EditorSettings {
    pub fn share_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.share_base_url)
            .with_context(|| format!("Invalid 'share_base_url': {}", self.share_base_url))?;
        if url.cannot_be_a_base() {
            anyhow::bail!(
                "'share_base_url' must be a hierarchical URL: {}",
                self.share_base_url
            );
        }
        Ok(url)
    }

    pub fn notice_lifetime(&self) -> Duration {
        Duration::from_secs(self.notice_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.notice_secs == 0 {
            anyhow::bail!("'notice_secs' must be at least 1");
        }
        if self.export_file_name.trim().is_empty() {
            anyhow::bail!("'export_file_name' cannot be empty");
        }
        if self.export_file_name.contains(['/', '\\']) {
            anyhow::bail!(
                "'export_file_name' must be a file name, not a path: {}",
                self.export_file_name
            );
        }
        self.share_base_url()?;
        Ok(())
    }
}

/// `<config dir>/mcped/settings.toml`.
pub fn default_settings_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(config_dir.join("mcped").join(SETTINGS_FILE_NAME))
}

/// Load settings from `path`; a missing file yields defaults.
pub fn load_settings(path: &Path) -> Result<EditorSettings> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(EditorSettings::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    parse_settings_str(&content)
        .with_context(|| format!("Failed to parse settings file: {}", path.display()))
}

pub fn parse_settings_str(content: &str) -> Result<EditorSettings> {
    let settings: EditorSettings =
        toml::from_str(content).map_err(|e| describe_toml_error(&e, content))?;
    settings.validate()?;
    Ok(settings)
}

pub fn to_toml(settings: &EditorSettings) -> Result<String> {
    toml::to_string_pretty(settings).context("Failed to serialize settings to TOML")
}

/// Locate the error through its byte span and show the surrounding lines.
fn describe_toml_error(error: &toml::de::Error, content: &str) -> anyhow::Error {
    let line = error
        .span()
        .and_then(|span| content.get(..span.start))
        .map(|before| before.matches('\n').count() + 1);

    match line {
        Some(line) => anyhow::anyhow!(
            "Invalid settings at line {}: {}\n{}",
            line,
            error.message(),
            line_context(content, line)
        ),
        None => anyhow::anyhow!("Invalid settings: {}", error.message()),
    }
}

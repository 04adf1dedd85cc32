//! Editor session: the application root.
//!
//! Owns the entry store, the storage backend and the notice board. Front ends
//! create one session and route every user action through it. Each mutation
//! is persisted before the action returns, and each action leaves exactly one
//! notice describing its outcome.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::Url;

use crate::clipboard::Clipboard;
use crate::mcp::{
    AddCheck, McpConfig, ServerUpdate, check_add_json, parse_mcp_json, stringify_mcp_json,
};
use crate::notice::{Notice, NoticeBoard};
use crate::settings::EditorSettings;
use crate::share::{self, DeflateCodec, TokenCodec};
use crate::storage::{PersistedState, StateStorage};
use crate::store::EntryStore;

pub struct Editor<S: StateStorage> {
    store: EntryStore,
    storage: S,
    settings: EditorSettings,
    notices: NoticeBoard,
    codec: Box<dyn TokenCodec>,
    startup_url_checked: bool,
}

impl<S: StateStorage> Editor<S> {
    /// Open a session, rehydrating the entry list from `storage`.
    pub fn open(storage: S, settings: EditorSettings) -> Result<Self> {
        let servers = storage
            .load()
            .context("Failed to load saved servers")?
            .map(|state| state.servers)
            .unwrap_or_default();
        tracing::debug!(count = servers.len(), "opened editor session");

        Ok(Self {
            store: EntryStore::from_servers(servers),
            notices: NoticeBoard::new(settings.notice_lifetime()),
            storage,
            settings,
            codec: Box::new(DeflateCodec),
            startup_url_checked: false,
        })
    }

    /// Replace the share token codec.
    pub fn with_codec(mut self, codec: impl TokenCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// The live notice, if one is showing.
    pub fn notice(&self) -> Option<&Notice> {
        self.notices.current()
    }

    pub fn post(&mut self, notice: Notice) {
        self.notices.post(notice);
    }

    /// Run a store mutation and persist the result.
    pub fn mutate<R>(&mut self, f: impl FnOnce(&mut EntryStore) -> R) -> Result<R> {
        let result = f(&mut self.store);
        self.persist()?;
        Ok(result)
    }

    fn persist(&self) -> Result<()> {
        let state = PersistedState {
            servers: self.store.servers().to_vec(),
        };
        self.storage.save(&state).context("Failed to save servers")
    }

    pub fn add_server(&mut self) -> Result<String> {
        let key = self.mutate(EntryStore::add_server)?;
        self.post(Notice::success("New server added"));
        Ok(key)
    }

    pub fn update_server(&mut self, key: &str, update: ServerUpdate) -> Result<bool> {
        self.mutate(|store| store.update_server(key, update))
    }

    pub fn duplicate_server(&mut self, key: &str) -> Result<Option<String>> {
        let new_key = self.mutate(|store| store.duplicate_server(key))?;
        if new_key.is_some() {
            self.post(Notice::success("Server duplicated"));
        }
        Ok(new_key)
    }

    pub fn remove_server(&mut self, key: &str) -> Result<bool> {
        let removed = self.mutate(|store| store.remove_server(key))?;
        if removed {
            self.post(Notice::success("Server removed"));
        }
        Ok(removed)
    }

    /// Clear every entry. Destructive, so the caller must pass the user's
    /// confirmation; nothing happens without it or when the list is empty.
    pub fn clear_all(&mut self, confirmed: bool) -> Result<bool> {
        if self.store.is_empty() || !confirmed {
            return Ok(false);
        }
        self.mutate(EntryStore::clear_all)?;
        self.post(Notice::success("All servers cleared"));
        Ok(true)
    }

    /// Add servers from pasted JSON, merging over existing keys.
    ///
    /// Returns the check so the caller can show its tier and message.
    pub fn add_from_json(&mut self, text: &str) -> Result<AddCheck> {
        let mut check = check_add_json(text, self.store.keys());
        let Some(config) = check.config.take().filter(|_| check.status.can_add()) else {
            tracing::warn!(message = %check.message, "rejected add-server input");
            self.post(Notice::error(check.message.clone()));
            return Ok(check);
        };

        let added = self.mutate(|store| store.merge_json(config))?;
        self.post(Notice::success(format!("{added} server(s) added")));
        Ok(check)
    }

    /// Replace the entry list with a JSON document.
    ///
    /// Parse and schema errors become an error notice and leave the list as is.
    pub fn load_json_text(&mut self, text: &str) -> Result<bool> {
        match parse_mcp_json(text) {
            Ok(config) => {
                self.replace_with(config)?;
                self.post(Notice::success("Configuration loaded successfully"));
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(error = %err, "rejected configuration");
                self.post(Notice::error(err.to_string()));
                Ok(false)
            }
        }
    }

    pub fn load_json_file(&mut self, path: &Path) -> Result<bool> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                tracing::info!(path = %path.display(), "loading configuration file");
                self.load_json_text(&text)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to read file");
                self.post(Notice::error(format!("Failed to read {}", path.display())));
                Ok(false)
            }
        }
    }

    fn replace_with(&mut self, config: McpConfig) -> Result<()> {
        self.mutate(|store| store.import_json(config))
    }

    /// The JSON document as it would be saved.
    pub fn json_preview(&self) -> Result<String> {
        stringify_mcp_json(&self.store.export_json())
    }

    /// Write the export into `dir` under the configured file name.
    pub fn save_json_file(&mut self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.settings.export_file_name);
        crate::mcp::parser::write_mcp_json(&path, &self.store.export_json())?;
        tracing::info!(path = %path.display(), "saved configuration");
        self.post(Notice::success("Configuration saved"));
        Ok(path)
    }

    pub fn copy_json(&mut self, clipboard: &mut dyn Clipboard) -> Result<bool> {
        let json = self.json_preview()?;
        Ok(self.copy_text(clipboard, &json, "JSON copied to clipboard"))
    }

    pub fn share_url(&self) -> Result<Url> {
        let base = self.settings.share_base_url()?;
        Ok(share::generate_share_url(
            &self.store,
            &base,
            &*self.codec,
        )?)
    }

    pub fn copy_share_url(&mut self, clipboard: &mut dyn Clipboard) -> Result<bool> {
        let url = self.share_url()?;
        Ok(self.copy_text(clipboard, url.as_str(), "Share URL copied to clipboard"))
    }

    fn copy_text(&mut self, clipboard: &mut dyn Clipboard, text: &str, done: &str) -> bool {
        match clipboard.write_text(text) {
            Ok(()) => {
                self.post(Notice::success(done));
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "clipboard write failed");
                self.post(Notice::error("Failed to copy to clipboard"));
                false
            }
        }
    }

    /// Replace the entry list with the config carried by a share URL.
    pub fn load_share_url(&mut self, url: &str) -> Result<bool> {
        match share::decode_share_url(url, &*self.codec) {
            Ok(config) => {
                self.replace_with(config)?;
                self.post(Notice::success("Configuration loaded from URL"));
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load share URL");
                self.post(Notice::error("Failed to load configuration from URL"));
                Ok(false)
            }
        }
    }

    /// Startup check for a config embedded in the page URL.
    ///
    /// Runs at most once per session. Returns `None` when skipped (already
    /// checked, or the URL carries no token).
    pub fn load_startup_url(&mut self, url: &str) -> Result<Option<bool>> {
        if self.startup_url_checked {
            return Ok(None);
        }
        self.startup_url_checked = true;

        if !share::has_share_token(url) {
            return Ok(None);
        }
        self.load_share_url(url).map(Some)
    }

    // Argument and environment edits are silent: they only persist.

    pub fn add_arg(&mut self, key: &str) -> Result<bool> {
        self.mutate(|store| store.add_arg(key))
    }

    pub fn update_arg(&mut self, key: &str, index: usize, value: &str) -> Result<bool> {
        self.mutate(|store| store.update_arg(key, index, value))
    }

    pub fn remove_arg(&mut self, key: &str, index: usize) -> Result<bool> {
        self.mutate(|store| store.remove_arg(key, index))
    }

    pub fn add_env(&mut self, key: &str) -> Result<Option<String>> {
        self.mutate(|store| store.add_env(key))
    }

    pub fn update_env(
        &mut self,
        key: &str,
        old_env_key: &str,
        new_env_key: &str,
        value: &str,
    ) -> Result<bool> {
        self.mutate(|store| store.update_env(key, old_env_key, new_env_key, value))
    }

    pub fn remove_env(&mut self, key: &str, env_key: &str) -> Result<bool> {
        self.mutate(|store| store.remove_env(key, env_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::notice::NoticeLevel;
    use crate::storage::MemoryStorage;

    fn editor() -> Editor<MemoryStorage> {
        Editor::open(MemoryStorage::new(), EditorSettings::default()).unwrap()
    }

    struct FailingClipboard;

    impl Clipboard for FailingClipboard {
        fn write_text(&mut self, _text: &str) -> anyhow::Result<()> {
            anyhow::bail!("permission denied")
        }
    }

    #[test]
    fn every_mutation_is_persisted() {
        let mut editor = editor();
        let key = editor.add_server().unwrap();
        editor.add_arg(&key).unwrap();
        editor.update_arg(&key, 0, "--verbose").unwrap();

        assert_eq!(editor.storage().save_count(), 3);
        let saved = editor.storage().snapshot().unwrap();
        assert_eq!(saved.servers, editor.store().servers());
    }

    #[test]
    fn open_rehydrates_saved_servers() {
        let state = PersistedState {
            servers: vec![crate::mcp::ServerEntry::stdio("fs")],
        };
        let editor = Editor::open(MemoryStorage::with_state(state), EditorSettings::default())
            .unwrap();
        assert_eq!(editor.store().keys().collect::<Vec<_>>(), vec!["fs"]);
        assert_eq!(editor.storage().save_count(), 0);
    }

    #[test]
    fn clear_requires_confirmation() {
        let mut editor = editor();
        editor.add_server().unwrap();

        assert!(!editor.clear_all(false).unwrap());
        assert_eq!(editor.store().len(), 1);

        assert!(editor.clear_all(true).unwrap());
        assert!(editor.store().is_empty());
        assert_eq!(editor.notice().unwrap().message, "All servers cleared");
    }

    #[test]
    fn load_error_becomes_notice() {
        let mut editor = editor();
        editor.add_server().unwrap();

        assert!(!editor.load_json_text("{\"mcpServers\": 3}").unwrap());
        let notice = editor.notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.to_string(), "Error: \"mcpServers\" must be an object");
        assert_eq!(editor.store().len(), 1);
    }

    #[test]
    fn clipboard_failure_is_reported() {
        let mut editor = editor();
        assert!(!editor.copy_json(&mut FailingClipboard).unwrap());
        assert_eq!(
            editor.notice().unwrap().to_string(),
            "Error: Failed to copy to clipboard"
        );
    }

    #[test]
    fn copy_json_writes_preview() {
        let mut editor = editor();
        editor.add_server().unwrap();
        let mut clipboard = MemoryClipboard::new();

        assert!(editor.copy_json(&mut clipboard).unwrap());
        assert_eq!(clipboard.contents(), Some(editor.json_preview().unwrap().as_str()));
    }

    #[test]
    fn startup_url_is_checked_once() {
        let mut source = editor();
        source.add_server().unwrap();
        let url = source.share_url().unwrap();

        let mut editor = editor();
        assert_eq!(editor.load_startup_url(url.as_str()).unwrap(), Some(true));
        assert_eq!(editor.store().len(), 1);

        editor.clear_all(true).unwrap();
        assert_eq!(editor.load_startup_url(url.as_str()).unwrap(), None);
        assert!(editor.store().is_empty());
    }

    #[test]
    fn startup_url_without_token_is_skipped() {
        let mut editor = editor();
        assert_eq!(
            editor.load_startup_url("http://localhost:5173/").unwrap(),
            None
        );
        assert!(editor.notice().is_none());
    }

    #[test]
    fn add_from_json_blocks_on_error() {
        let mut editor = editor();
        let check = editor.add_from_json("{\"mcpServers\": {}}").unwrap();
        assert!(!check.status.can_add());
        assert!(editor.store().is_empty());
        assert_eq!(editor.storage().save_count(), 0);
    }
}

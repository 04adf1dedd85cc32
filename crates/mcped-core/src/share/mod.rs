//! Share links: the exported config compressed into a `config` query parameter.

pub mod codec;

use thiserror::Error;
use url::Url;

use crate::mcp::{McpConfig, ParseError, parser::parse_mcp_value};
use crate::store::EntryStore;

pub use codec::{DeflateCodec, TokenCodec};

/// Query parameter carrying the token.
pub const CONFIG_PARAM: &str = "config";

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("Invalid share URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("URL cannot carry a query string: {0}")]
    UnsupportedBase(String),

    #[error("Share URL has no \"config\" parameter")]
    MissingToken,

    #[error("Share token could not be decoded")]
    Undecodable,

    #[error("Shared configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Shared configuration is invalid: {0}")]
    Invalid(#[from] ParseError),

    #[error("Failed to encode share token: {0}")]
    Encode(#[from] std::io::Error),
}

/// Build `<origin><path>?config=<token>` for the store's current export.
///
/// Any query or fragment on `base` is dropped.
pub fn generate_share_url(
    store: &EntryStore,
    base: &Url,
    codec: &dyn TokenCodec,
) -> Result<Url, ShareError> {
    if base.cannot_be_a_base() {
        return Err(ShareError::UnsupportedBase(base.to_string()));
    }

    let json = compact_json(&store.export_json())?;
    let token = codec.encode(&json)?;

    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut().append_pair(CONFIG_PARAM, &token);
    Ok(url)
}

/// Extract and decode the config carried by a share URL.
///
/// The decoded document goes through the same structural validation as a
/// loaded file, so a malformed payload is reported instead of imported.
pub fn decode_share_url(url: &str, codec: &dyn TokenCodec) -> Result<McpConfig, ShareError> {
    let url = Url::parse(url)?;
    let token = url
        .query_pairs()
        .find(|(name, _)| name == CONFIG_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or(ShareError::MissingToken)?;

    let text = codec.decode(&token).ok_or(ShareError::Undecodable)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    Ok(parse_mcp_value(value)?)
}

/// Replace the store's entries with the config carried by `url`.
///
/// On any failure the store is left untouched. Returns the imported count.
pub fn load_from_share_url(
    store: &mut EntryStore,
    url: &str,
    codec: &dyn TokenCodec,
) -> Result<usize, ShareError> {
    let config = decode_share_url(url, codec)?;
    let count = config.len();
    store.import_json(config);
    tracing::info!(count, "loaded configuration from share URL");
    Ok(count)
}

/// Whether `url` looks like it carries a share token at all.
pub fn has_share_token(url: &str) -> bool {
    url.contains(&format!("{CONFIG_PARAM}="))
}

fn compact_json(config: &McpConfig) -> Result<String, ShareError> {
    // Share tokens use compact JSON; saved files use the pretty form.
    serde_json::to_string(config).map_err(ShareError::Json)
}

//! Reversible string codecs for share tokens.

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

/// Turns text into a URL-safe token and back.
pub trait TokenCodec {
    fn encode(&self, text: &str) -> std::io::Result<String>;

    /// `None` when the token is corrupt or decodes to nothing.
    fn decode(&self, token: &str) -> Option<String>;
}

/// Raw DEFLATE wrapped in unpadded URL-safe base64.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeflateCodec;

impl TokenCodec for DeflateCodec {
    fn encode(&self, text: &str) -> std::io::Result<String> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(text.as_bytes())?;
        let compressed = encoder.finish()?;
        Ok(URL_SAFE_NO_PAD.encode(compressed))
    }

    fn decode(&self, token: &str) -> Option<String> {
        let compressed = URL_SAFE_NO_PAD.decode(token.trim()).ok()?;
        let mut text = String::new();
        DeflateDecoder::new(compressed.as_slice())
            .read_to_string(&mut text)
            .ok()?;
        if text.is_empty() { None } else { Some(text) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_url_safe() {
        let token = DeflateCodec
            .encode(r#"{"mcpServers":{"a":{"url":"https://example.com/?q=1&r=2"}}}"#)
            .unwrap();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn decode_reverses_encode() {
        let text = "{\"mcpServers\":{}} ünïcødé";
        let token = DeflateCodec.encode(text).unwrap();
        assert_eq!(DeflateCodec.decode(&token).as_deref(), Some(text));
    }

    #[test]
    fn corrupt_token_decodes_to_none() {
        assert!(DeflateCodec.decode("not*base64!").is_none());
        assert!(DeflateCodec.decode("AAAA").is_none());
    }

    #[test]
    fn empty_payload_decodes_to_none() {
        let token = DeflateCodec.encode("").unwrap();
        assert!(DeflateCodec.decode(&token).is_none());
    }
}

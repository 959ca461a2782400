//! Rendering raw bytes for the terminal.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::errors::{MeltVaultError, Result};

/// How payload bytes are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Hex,
    Base64,
    /// UTF-8, with invalid sequences replaced.
    Text,
}

/// Parse an encoding name from the command line.
pub fn parse_encoding(name: &str) -> Result<Encoding> {
    match name.to_lowercase().as_str() {
        "hex" => Ok(Encoding::Hex),
        "base64" | "b64" => Ok(Encoding::Base64),
        "text" | "utf8" => Ok(Encoding::Text),
        other => Err(MeltVaultError::CommandFailed(format!(
            "unknown format '{other}' — supported: hex, base64, text"
        ))),
    }
}

/// Lowercase hex, two digits per byte.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Render `bytes` in the requested encoding.
pub fn render(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Hex => to_hex(bytes),
        Encoding::Base64 => BASE64.encode(bytes),
        Encoding::Text => String::from_utf8_lossy(bytes).into_owned(),
    }
}

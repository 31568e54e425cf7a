//! Stateless text helpers.
//!
//! Attachment bytes travel as standard base64. Untrusted strings (message
//! text, file names, key names) pass through [`escape_html`] before they reach
//! markup and through [`sanitize_terminal`] before they reach a terminal.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::errors::{ProtocolError, Result};

/// Encode attachment bytes for transport.
pub fn encode_attachment(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode transported attachment bytes.
pub fn decode_attachment(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data.as_bytes()).map_err(|e| ProtocolError::Attachment(e.to_string()))
}

/// Escape text for insertion into HTML element content or a quoted attribute.
pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Make text safe to draw in a terminal cell.
///
/// Line breaks and tabs collapse to a space; every other control character
/// (including ESC, which starts terminal escape sequences) is dropped.
pub fn sanitize_terminal(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

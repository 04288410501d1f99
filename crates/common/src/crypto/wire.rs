//! Single-line public key representation
//!
//! A public key PEM with its armor lines and line breaks removed is one base64 token
//! that survives chat messages and copy/paste. Turning it back into a key re-wraps the
//! token at 64 columns between the standard `PUBLIC KEY` markers and parses the result.

use super::keys::{KeyError, PublicKey};

/// Column width the base64 body is wrapped at
pub const WIRE_LINE_WIDTH: usize = 64;

const PEM_HEADER: &str = "-----BEGIN PUBLIC KEY-----";
const PEM_FOOTER: &str = "-----END PUBLIC KEY-----";
const PEM_TAG: &str = "PUBLIC KEY";

/// Encode a public key as one contiguous base64 string
pub fn to_wire(public_key: &PublicKey) -> Result<String, KeyError> {
    Ok(strip_armor(&public_key.to_pem()?))
}

/// Parse a string produced by [`to_wire`] back into a public key
///
/// Whitespace inside the token is ignored, so a key that picked up line breaks in
/// transit still parses.
///
/// # Errors
///
/// Returns a [`KeyError`] if the token is not valid base64, is truncated, or does not
/// describe a point on secp384r1.
pub fn from_wire(wire: &str) -> Result<PublicKey, KeyError> {
    let armored = wrap_wire(wire);
    let parsed = pem::parse(&armored)?;
    if parsed.tag() != PEM_TAG {
        return Err(anyhow::anyhow!("invalid PEM tag, expected {}", PEM_TAG).into());
    }
    PublicKey::from_der(parsed.contents())
}

/// Re-wrap a wire token into PEM text without parsing it
pub fn wrap_wire(wire: &str) -> String {
    let body: String = wire.chars().filter(|c| !c.is_whitespace()).collect();
    let mut pem = String::with_capacity(body.len() + body.len() / WIRE_LINE_WIDTH + 64);
    pem.push_str(PEM_HEADER);
    pem.push('\n');
    // base64 is ASCII, so byte chunks fall on char boundaries
    for line in body.as_bytes().chunks(WIRE_LINE_WIDTH) {
        pem.push_str(&String::from_utf8_lossy(line));
        pem.push('\n');
    }
    pem.push_str(PEM_FOOTER);
    pem.push('\n');
    pem
}

fn strip_armor(pem: &str) -> String {
    pem.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("-----"))
        .collect()
}

//! PKCS#7 block padding
//!
//! `N = 16 - (len % 16)` bytes of value `N` are always appended, so block-aligned
//! input gains a full block of `0x10`. Unpadding checks the declared length and that
//! every pad byte carries it.

use zeroize::Zeroize;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaddingError {
    #[error("invalid padding length {0}, expected 1..=16")]
    InvalidLength(u8),
    #[error("padding bytes do not all equal the declared length {0}")]
    InconsistentBytes(u8),
    #[error("ciphertext of {0} bytes is not a positive multiple of the block size")]
    Misaligned(usize),
}

/// Pad `data` up to the next block boundary
pub fn pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - (data.len() % BLOCK_SIZE);
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad_len, pad_len as u8);
    padded
}

/// Strip the padding from decrypted data
///
/// On failure the buffer is zeroized before it is dropped; no plaintext bytes are
/// ever handed back for data that fails the check.
pub fn unpad(mut padded: Vec<u8>) -> Result<Vec<u8>, PaddingError> {
    if padded.is_empty() || padded.len() % BLOCK_SIZE != 0 {
        let len = padded.len();
        padded.zeroize();
        return Err(PaddingError::Misaligned(len));
    }

    let pad_len = padded[padded.len() - 1];
    if pad_len == 0 || pad_len as usize > BLOCK_SIZE {
        padded.zeroize();
        return Err(PaddingError::InvalidLength(pad_len));
    }

    let body_len = padded.len() - pad_len as usize;
    if padded[body_len..].iter().any(|&b| b != pad_len) {
        padded.zeroize();
        return Err(PaddingError::InconsistentBytes(pad_len));
    }

    padded.truncate(body_len);
    Ok(padded)
}

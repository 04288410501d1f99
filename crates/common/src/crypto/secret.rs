//! Symmetric key derivation and block encryption
//!
//! The raw ECDH output is never used as a key directly. It is expanded with
//! HKDF-SHA256 into a 256-bit [`Secret`], which drives AES-256 in CBC mode.
//! Both sides of an exchange run the same derivation, so the same shared secret
//! always yields the same key.

use std::fmt;

use aes::Aes256;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::padding::BLOCK_SIZE;

/// Size of the derived AES-256 key in bytes
pub const SECRET_SIZE: usize = 32;
/// HKDF info label. A fixed context string, not a nonce.
pub const HKDF_INFO: &[u8] = b"handshake data";

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Errors that can occur during derivation or block encryption
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secret error: {0}")]
    Default(#[from] anyhow::Error),
}

/// Raw output of an ECDH agreement on secp384r1
pub struct SharedSecret(p384::ecdh::SharedSecret);

impl From<p384::ecdh::SharedSecret> for SharedSecret {
    fn from(shared: p384::ecdh::SharedSecret) -> Self {
        SharedSecret(shared)
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedSecret").field(&"<redacted>").finish()
    }
}

impl SharedSecret {
    /// The x-coordinate of the shared point, 48 bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.0.raw_secret_bytes().as_slice()
    }

    /// Expand into a 256-bit AES key with HKDF-SHA256 (no salt, [`HKDF_INFO`])
    pub fn derive(&self) -> Result<Secret, SecretError> {
        let hk = Hkdf::<Sha256>::new(None, self.as_bytes());
        let mut key = Zeroizing::new([0u8; SECRET_SIZE]);
        hk.expand(HKDF_INFO, &mut key[..])
            .map_err(|e| anyhow::anyhow!("hkdf expand error: {}", e))?;
        Ok(Secret(key))
    }
}

/// A 256-bit symmetric key derived from a [`SharedSecret`]
///
/// Lives only for the duration of one seal or open and is zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Zeroizing<[u8; SECRET_SIZE]>);

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&"<redacted>").finish()
    }
}

impl From<[u8; SECRET_SIZE]> for Secret {
    fn from(bytes: [u8; SECRET_SIZE]) -> Self {
        Secret(Zeroizing::new(bytes))
    }
}

impl Secret {
    /// Get a reference to the key bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0[..]
    }

    /// AES-256-CBC encrypt data that is already padded to whole blocks
    ///
    /// # Errors
    ///
    /// Returns an error if `iv` is not 16 bytes or `padded` is not a multiple of the
    /// block size.
    pub fn encrypt_blocks(&self, iv: &[u8], padded: &[u8]) -> Result<Vec<u8>, SecretError> {
        if padded.len() % BLOCK_SIZE != 0 {
            return Err(anyhow::anyhow!(
                "plaintext length {} is not a multiple of {}",
                padded.len(),
                BLOCK_SIZE
            )
            .into());
        }
        let cipher = Aes256CbcEnc::new_from_slices(self.bytes(), iv)
            .map_err(|_| anyhow::anyhow!("invalid key or iv length"))?;
        Ok(cipher.encrypt_padded_vec_mut::<NoPadding>(padded))
    }

    /// AES-256-CBC decrypt whole blocks, leaving any padding in place
    ///
    /// # Errors
    ///
    /// Returns an error if `iv` is not 16 bytes or `ciphertext` is not a multiple of
    /// the block size.
    pub fn decrypt_blocks(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, SecretError> {
        let cipher = Aes256CbcDec::new_from_slices(self.bytes(), iv)
            .map_err(|_| anyhow::anyhow!("invalid key or iv length"))?;
        cipher
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
            .map_err(|_| anyhow::anyhow!("ciphertext is not a whole number of blocks").into())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::keys::{EphemeralKeyPair, SecretKey};

    #[test]
    fn test_derivation_matches_on_both_sides() {
        let recipient = SecretKey::generate();
        let ephemeral = EphemeralKeyPair::generate();
        let (shared, ephemeral_public) = ephemeral.diffie_hellman(&recipient.public());

        let sender_key = shared.derive().unwrap();
        let recipient_key = recipient.diffie_hellman(&ephemeral_public).derive().unwrap();

        assert_eq!(sender_key, recipient_key);
        assert_eq!(sender_key.bytes().len(), SECRET_SIZE);
    }

    #[test]
    fn test_derivation_is_not_the_raw_secret() {
        let recipient = SecretKey::generate();
        let (shared, _) = EphemeralKeyPair::generate().diffie_hellman(&recipient.public());
        let key = shared.derive().unwrap();
        assert_ne!(key.bytes(), &shared.as_bytes()[..SECRET_SIZE]);
    }

    #[test]
    fn test_block_roundtrip() {
        let secret = Secret::from([7u8; SECRET_SIZE]);
        let iv = [1u8; 16];
        let data = [42u8; 48];

        let encrypted = secret.encrypt_blocks(&iv, &data).unwrap();
        assert_eq!(encrypted.len(), data.len());
        assert_ne!(encrypted.as_slice(), data.as_slice());

        let decrypted = secret.decrypt_blocks(&iv, &encrypted).unwrap();
        assert_eq!(decrypted.as_slice(), data.as_slice());
    }

    #[test]
    fn test_unaligned_input_rejected() {
        let secret = Secret::from([7u8; SECRET_SIZE]);
        let iv = [0u8; 16];
        assert!(secret.encrypt_blocks(&iv, &[0u8; 15]).is_err());
        assert!(secret.decrypt_blocks(&iv, &[0u8; 17]).is_err());
        assert!(secret.encrypt_blocks(&[0u8; 8], &[0u8; 16]).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let secret = Secret::from([9u8; SECRET_SIZE]);
        assert!(!format!("{:?}", secret).contains('9'));
    }
}

//! Hybrid sealing of a payload for a single recipient
//!
//! An [`Envelope`] is the pair of artifacts produced by one encryption:
//!
//! ```text
//! ciphertext blob:  [ iv: 16 bytes ][ AES-256-CBC(pad(plaintext)) ]
//! ephemeral key:    PEM SubjectPublicKeyInfo, secp384r1
//! ```
//!
//! Neither artifact carries a magic number, version or length prefix. Only the holder
//! of the recipient's secret key can rebuild the AES key from the ephemeral public key.

use super::keys::{EphemeralKeyPair, KeyError, PublicKey, SecretKey};
use super::padding::{pad, unpad, PaddingError, BLOCK_SIZE};
use super::secret::SecretError;
use super::wire;

/// Size of the CBC initialization vector in bytes
pub const IV_SIZE: usize = 16;
/// Smallest well-formed ciphertext blob: an IV and a single block
pub const MIN_CIPHERTEXT_SIZE: usize = IV_SIZE + BLOCK_SIZE;

/// Errors that can occur while sealing or opening an envelope
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("envelope error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("padding error: {0}")]
    Padding(#[from] PaddingError),
    #[error("secret error: {0}")]
    Secret(#[from] SecretError),
}

/// `IV || ciphertext` as written to disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CiphertextBlob(Vec<u8>);

impl From<Vec<u8>> for CiphertextBlob {
    fn from(bytes: Vec<u8>) -> Self {
        CiphertextBlob(bytes)
    }
}

impl From<CiphertextBlob> for Vec<u8> {
    fn from(blob: CiphertextBlob) -> Self {
        blob.0
    }
}

impl CiphertextBlob {
    /// Get a reference to the raw blob bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// The leading IV, or `None` if the blob is shorter than an IV
    pub fn iv(&self) -> Option<&[u8]> {
        self.0.get(..IV_SIZE)
    }

    /// Everything after the IV
    pub fn ciphertext(&self) -> &[u8] {
        self.0.get(IV_SIZE..).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ciphertext plus the ephemeral public key needed to open it
///
/// # Examples
///
/// ```ignore
/// let recipient = SecretKey::generate();
///
/// let envelope = Envelope::seal(b"hello world", &recipient.public())?;
/// let plaintext = envelope.open(&recipient)?;
/// assert_eq!(plaintext, b"hello world");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    ciphertext: CiphertextBlob,
    ephemeral_public: PublicKey,
}

impl Envelope {
    /// Encrypt `plaintext` so that only the holder of `recipient`'s secret key can read it
    ///
    /// 1. Generates a fresh ephemeral secp384r1 keypair
    /// 2. ECDH(ephemeral secret, recipient) -> shared secret
    /// 3. HKDF-SHA256 -> AES-256 key
    /// 4. PKCS#7 pads the plaintext
    /// 5. Encrypts under a random 16-byte IV in CBC mode
    ///
    /// The ephemeral secret is consumed by the agreement and never leaves this call.
    pub fn seal(plaintext: &[u8], recipient: &PublicKey) -> Result<Self, EnvelopeError> {
        let (shared_secret, ephemeral_public) =
            EphemeralKeyPair::generate().diffie_hellman(recipient);
        let key = shared_secret.derive()?;

        let padded = pad(plaintext);

        let mut iv = [0u8; IV_SIZE];
        getrandom::getrandom(&mut iv).map_err(|e| anyhow::anyhow!("failed to generate iv: {}", e))?;

        let encrypted = key.encrypt_blocks(&iv, &padded)?;

        let mut blob = Vec::with_capacity(IV_SIZE + encrypted.len());
        blob.extend_from_slice(&iv);
        blob.extend_from_slice(&encrypted);

        tracing::debug!(
            plaintext_len = plaintext.len(),
            ciphertext_len = blob.len(),
            "sealed envelope"
        );

        Ok(Self {
            ciphertext: blob.into(),
            ephemeral_public,
        })
    }

    /// Assemble an envelope from already-parsed parts
    pub fn from_parts(ciphertext: impl Into<CiphertextBlob>, ephemeral_public: PublicKey) -> Self {
        Self {
            ciphertext: ciphertext.into(),
            ephemeral_public,
        }
    }

    /// Assemble an envelope from the two on-disk artifacts
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Key`] if the ephemeral key PEM does not parse.
    pub fn from_artifacts(
        ciphertext: impl Into<CiphertextBlob>,
        ephemeral_public_pem: &str,
    ) -> Result<Self, EnvelopeError> {
        let ephemeral_public = PublicKey::from_pem(ephemeral_public_pem)?;
        Ok(Self::from_parts(ciphertext, ephemeral_public))
    }

    pub fn ciphertext(&self) -> &CiphertextBlob {
        &self.ciphertext
    }

    pub fn ephemeral_public(&self) -> &PublicKey {
        &self.ephemeral_public
    }

    /// The ephemeral public key encoded exactly like a long-term public key file
    pub fn ephemeral_public_pem(&self) -> Result<String, EnvelopeError> {
        Ok(self.ephemeral_public.to_pem()?)
    }

    /// Split into the ciphertext blob and the ephemeral public key PEM
    pub fn into_artifacts(self) -> Result<(Vec<u8>, String), EnvelopeError> {
        let pem = self.ephemeral_public_pem()?;
        Ok((self.ciphertext.into(), pem))
    }

    /// Decrypt with the recipient's secret key
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Padding`] if the blob is truncated or misaligned, or
    /// if the decrypted padding is invalid. Without an authentication tag this is
    /// the only signal of a wrong key or corrupted data, and it is probabilistic.
    pub fn open(&self, recipient_secret: &SecretKey) -> Result<Vec<u8>, EnvelopeError> {
        let blob_len = self.ciphertext.len();
        if blob_len < MIN_CIPHERTEXT_SIZE || (blob_len - IV_SIZE) % BLOCK_SIZE != 0 {
            return Err(PaddingError::Misaligned(blob_len.saturating_sub(IV_SIZE)).into());
        }
        let iv = self
            .ciphertext
            .iv()
            .ok_or_else(|| anyhow::anyhow!("ciphertext too short for iv"))?;

        let shared_secret = recipient_secret.diffie_hellman(&self.ephemeral_public);
        let key = shared_secret.derive()?;

        let padded = key.decrypt_blocks(iv, self.ciphertext.ciphertext())?;
        let plaintext = unpad(padded)?;

        tracing::debug!(
            ciphertext_len = blob_len,
            plaintext_len = plaintext.len(),
            "opened envelope"
        );

        Ok(plaintext)
    }

    /// Decrypt, first acknowledging an optional sender public key in wire format
    ///
    /// The sender key is parsed and nothing more. It is not bound to the ciphertext,
    /// not part of the key derivation, and no signature is checked.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Key`] if `sender` is present but malformed, before any
    /// decryption is attempted; otherwise as [`Envelope::open`].
    pub fn open_with_sender(
        &self,
        recipient_secret: &SecretKey,
        sender: Option<&str>,
    ) -> Result<Vec<u8>, EnvelopeError> {
        if let Some(sender) = sender.map(str::trim).filter(|s| !s.is_empty()) {
            let _sender_key = wire::from_wire(sender)?;
            tracing::warn!("sender public key parsed but not verified against the ciphertext");
        }
        self.open(recipient_secret)
    }
}

/// Encrypt `plaintext` for `recipient`, returning `(ciphertext blob, ephemeral public key PEM)`
pub fn encrypt(plaintext: &[u8], recipient: &PublicKey) -> Result<(Vec<u8>, String), EnvelopeError> {
    Envelope::seal(plaintext, recipient)?.into_artifacts()
}

/// Decrypt a ciphertext blob given the ephemeral public key PEM that accompanied it
pub fn decrypt(
    ciphertext_blob: &[u8],
    ephemeral_public_pem: &str,
    recipient_secret: &SecretKey,
) -> Result<Vec<u8>, EnvelopeError> {
    Envelope::from_artifacts(ciphertext_blob.to_vec(), ephemeral_public_pem)?.open(recipient_secret)
}

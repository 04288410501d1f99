//! Cryptographic primitives for DataCrypt
//!
//! This module implements the hybrid encryption scheme used to protect files for a
//! single recipient:
//!
//! - **Identity**: a long-term secp384r1 keypair (`SecretKey`/`PublicKey`) held by the
//!   recipient, stored as PKCS#8 / SubjectPublicKeyInfo PEM.
//! - **Key Exchange**: a fresh ephemeral secp384r1 keypair per encryption, combined
//!   with the recipient's public key via ECDH.
//! - **Key Derivation**: HKDF-SHA256 over the raw shared secret, no salt, fixed info
//!   label, 32 bytes of output.
//! - **Encryption**: AES-256-CBC over PKCS#7-padded plaintext with a random 16-byte IV.
//!
//! # Sealing
//!
//! 1. Generate an ephemeral keypair
//! 2. ECDH(ephemeral secret, recipient public) -> shared secret
//! 3. HKDF-SHA256(shared secret) -> AES-256 key
//! 4. Pad the plaintext and encrypt it under a random IV
//! 5. Emit `IV || ciphertext` and the ephemeral public key PEM
//!
//! # Opening
//!
//! The recipient repeats the agreement with their secret key and the ephemeral public
//! key, derives the same AES key, decrypts and strips the padding.
//!
//! There is no authentication tag. A wrong key or corrupted ciphertext is only caught
//! by the padding check, and only with high probability.

mod envelope;
mod keys;
mod padding;
mod secret;
mod wire;

pub use envelope::{
    decrypt, encrypt, CiphertextBlob, Envelope, EnvelopeError, IV_SIZE, MIN_CIPHERTEXT_SIZE,
};
pub use keys::{EphemeralKeyPair, KeyError, PublicKey, SecretKey, CURVE_NAME};
pub use padding::{pad, unpad, PaddingError, BLOCK_SIZE};
pub use secret::{Secret, SecretError, SharedSecret, HKDF_INFO, SECRET_SIZE};
pub use wire::{from_wire, to_wire, wrap_wire, WIRE_LINE_WIDTH};

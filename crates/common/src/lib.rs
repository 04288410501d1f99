/**
 * Cryptographic types and operations.
 *  - secp384r1 key pairs and their PEM / wire encodings
 *  - Ephemeral ECDH + HKDF + AES-256-CBC envelopes
 */
pub mod crypto;
/**
 * Files on disk: sealing a file into its `.enc` / `.key`
 *  artifact pair and opening that pair back up.
 */
pub mod files;
/**
 * The recipient's long-term identity key pair,
 *  provisioned once into an explicit key directory.
 */
pub mod identity;

pub mod prelude {
    pub use crate::crypto::{Envelope, EnvelopeError, KeyError, PublicKey, SecretKey};
    pub use crate::files::{decrypt_file, encrypt_file, EncryptedArtifacts, FileError};
    pub use crate::identity::{IdentityError, IdentityStatus, KeyStore};
}

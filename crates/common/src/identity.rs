//! Long-term identity key pair
//!
//! A [`KeyStore`] owns one directory holding exactly one identity:
//!
//! ```text
//! <key dir>/
//!   private_key.pem   PKCS#8, unencrypted
//!   public_key.pem    SubjectPublicKeyInfo
//! ```
//!
//! The directory is always supplied by the caller. Provisioning is idempotent and
//! never rotates an existing identity.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::crypto::{KeyError, PublicKey, SecretKey};
use crate::files::{stage, Permissions};

pub const PRIVATE_KEY_FILE_NAME: &str = "private_key.pem";
pub const PUBLIC_KEY_FILE_NAME: &str = "public_key.pem";

/// Outcome of [`KeyStore::ensure_identity_keys`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStatus {
    /// A fresh key pair was generated and written
    Generated,
    /// Both key files already existed and were left untouched
    AlreadyPresent,
    /// The private key existed alone; the public key was re-derived from it
    Restored,
}

impl IdentityStatus {
    pub fn generated(&self) -> bool {
        matches!(self, IdentityStatus::Generated)
    }
}

impl fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityStatus::Generated => write!(f, "generated"),
            IdentityStatus::AlreadyPresent => write!(f, "already present"),
            IdentityStatus::Restored => write!(f, "restored"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("file system error at {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("identity keys not found in {}", .0.display())]
    NotFound(PathBuf),
    #[error("key error in {}: {source}", path.display())]
    Key {
        path: PathBuf,
        #[source]
        source: KeyError,
    },
}

impl IdentityError {
    fn fs(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| IdentityError::FileSystem {
            path: path.to_path_buf(),
            source,
        }
    }

    fn key(path: &Path) -> impl FnOnce(KeyError) -> Self + '_ {
        move |source| IdentityError::Key {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The recipient's key directory
#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn private_key_path(&self) -> PathBuf {
        self.dir.join(PRIVATE_KEY_FILE_NAME)
    }

    pub fn public_key_path(&self) -> PathBuf {
        self.dir.join(PUBLIC_KEY_FILE_NAME)
    }

    /// Whether both halves of the identity are on disk
    pub fn exists(&self) -> bool {
        self.private_key_path().is_file() && self.public_key_path().is_file()
    }

    /// Provision the identity key pair if it is not already present
    ///
    /// Both PEM documents are produced in memory before anything touches the disk,
    /// then staged next to their final paths and moved into place. The private key
    /// is placed with a no-clobber rename: if a concurrent caller got there first,
    /// its pair wins and this call reports [`IdentityStatus::AlreadyPresent`]. That
    /// report is taken before the winner has placed its public key; if the winner then
    /// fails and rolls back, the identity is gone again and the next call regenerates it.
    ///
    /// A private key without its public key is repaired rather than replaced. A public
    /// key without its private key is useless and gets replaced by a new pair.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::FileSystem`] if the directory cannot be created or a
    /// file cannot be written. On error no new private key is left behind.
    pub fn ensure_identity_keys(&self) -> Result<IdentityStatus, IdentityError> {
        let private_path = self.private_key_path();
        let public_path = self.public_key_path();

        match (private_path.exists(), public_path.exists()) {
            (true, true) => {
                tracing::debug!(dir = %self.dir.display(), "identity keys already present");
                return Ok(IdentityStatus::AlreadyPresent);
            }
            (true, false) => return self.restore_public_key(),
            (false, true) => {
                tracing::warn!(
                    path = %public_path.display(),
                    "public key has no private key, replacing it with a new identity"
                );
            }
            (false, false) => {}
        }

        fs::create_dir_all(&self.dir).map_err(IdentityError::fs(&self.dir))?;

        let secret_key = SecretKey::generate();
        let private_pem = secret_key
            .to_pem()
            .map_err(IdentityError::key(&private_path))?;
        let public_pem = secret_key
            .public()
            .to_pem()
            .map_err(IdentityError::key(&public_path))?;

        let staged_private = stage(&self.dir, private_pem.as_bytes(), Permissions::Private)
            .map_err(IdentityError::fs(&self.dir))?;
        let staged_public = stage(&self.dir, public_pem.as_bytes(), Permissions::Public)
            .map_err(IdentityError::fs(&self.dir))?;

        if let Err(e) = staged_private.persist_noclobber(&private_path) {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                tracing::info!(dir = %self.dir.display(), "identity keys created concurrently");
                return Ok(IdentityStatus::AlreadyPresent);
            }
            return Err(IdentityError::fs(&private_path)(e.error));
        }

        if let Err(e) = staged_public.persist(&public_path) {
            // the pair is one artifact: don't leave half of it behind
            let _ = fs::remove_file(&private_path);
            return Err(IdentityError::fs(&public_path)(e.error));
        }

        tracing::info!(dir = %self.dir.display(), "generated new identity key pair");
        Ok(IdentityStatus::Generated)
    }

    /// Load and parse the private key
    pub fn load_secret_key(&self) -> Result<SecretKey, IdentityError> {
        let path = self.private_key_path();
        let pem = self.read(&path)?;
        SecretKey::from_pem(&pem).map_err(IdentityError::key(&path))
    }

    /// Load and parse the public key
    pub fn load_public_key(&self) -> Result<PublicKey, IdentityError> {
        let path = self.public_key_path();
        let pem = self.read(&path)?;
        PublicKey::from_pem(&pem).map_err(IdentityError::key(&path))
    }

    /// The identity public key as a single-line string for sharing
    pub fn public_key_wire(&self) -> Result<String, IdentityError> {
        let public_key = self.load_public_key()?;
        public_key
            .to_wire()
            .map_err(IdentityError::key(&self.public_key_path()))
    }

    fn read(&self, path: &Path) -> Result<Zeroizing<String>, IdentityError> {
        let contents = match fs::read(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(IdentityError::NotFound(self.dir.clone()))
            }
            Err(e) => return Err(IdentityError::fs(path)(e)),
        };
        String::from_utf8(contents)
            .map(Zeroizing::new)
            .map_err(|e| IdentityError::key(path)(KeyError::from(e)))
    }

    fn restore_public_key(&self) -> Result<IdentityStatus, IdentityError> {
        let public_path = self.public_key_path();
        let public_pem = self
            .load_secret_key()?
            .public()
            .to_pem()
            .map_err(IdentityError::key(&public_path))?;

        let staged = stage(&self.dir, public_pem.as_bytes(), Permissions::Public)
            .map_err(IdentityError::fs(&self.dir))?;
        if let Err(e) = staged.persist_noclobber(&public_path) {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                return Ok(IdentityStatus::AlreadyPresent);
            }
            return Err(IdentityError::fs(&public_path)(e.error));
        }

        tracing::info!(path = %public_path.display(), "restored public key from private key");
        Ok(IdentityStatus::Restored)
    }
}

/// Provision the identity key pair in `dir`; see [`KeyStore::ensure_identity_keys`]
pub fn ensure_identity_keys(dir: impl AsRef<Path>) -> Result<IdentityStatus, IdentityError> {
    KeyStore::new(dir.as_ref()).ensure_identity_keys()
}

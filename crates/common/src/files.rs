//! Encrypting and decrypting files on disk
//!
//! Sealing `report.pdf` produces two artifacts next to it:
//!
//! ```text
//! report.pdf.enc   IV || ciphertext
//! report.pdf.key   ephemeral public key (PEM)
//! ```
//!
//! Opening `report.pdf.enc` with `report.pdf.key` writes `report-decrypted.pdf`.
//! Every output is staged in a temporary file in the destination directory and only
//! moved into place once its contents are complete, so a failed run never leaves a
//! half-written artifact. Files are read fully into memory.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::crypto::{Envelope, EnvelopeError, KeyError, PublicKey, SecretKey};

/// Extension appended to a file's name for its ciphertext
pub const ENCRYPTED_EXTENSION: &str = "enc";
/// Extension of the ephemeral public key that accompanies a ciphertext
pub const EPHEMERAL_KEY_EXTENSION: &str = "key";
/// Inserted before the extension of a decrypted file
pub const DECRYPTED_SUFFIX: &str = "-decrypted";

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("file system error at {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

impl FileError {
    fn fs(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| FileError::FileSystem {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Paths of the two artifacts written by [`encrypt_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedArtifacts {
    pub ciphertext_path: PathBuf,
    pub ephemeral_key_path: PathBuf,
}

/// `report.pdf` -> `report.pdf.enc`
pub fn encrypted_path_for(path: &Path) -> PathBuf {
    append_extension(path, ENCRYPTED_EXTENSION)
}

/// `report.pdf` -> `report.pdf.key`
pub fn ephemeral_key_path_for(path: &Path) -> PathBuf {
    append_extension(path, EPHEMERAL_KEY_EXTENSION)
}

/// The key file that accompanies a ciphertext: `report.pdf.enc` -> `report.pdf.key`
pub fn key_path_for(encrypted_path: &Path) -> PathBuf {
    encrypted_path.with_extension(EPHEMERAL_KEY_EXTENSION)
}

/// Where a ciphertext decrypts to: `report.pdf.enc` -> `report-decrypted.pdf`
pub fn decrypted_path_for(encrypted_path: &Path) -> PathBuf {
    let original = match encrypted_path.extension() {
        Some(ext) if ext == ENCRYPTED_EXTENSION => encrypted_path.with_extension(""),
        _ => encrypted_path.to_path_buf(),
    };

    let mut name = original.file_stem().map(OsString::from).unwrap_or_default();
    name.push(DECRYPTED_SUFFIX);
    if let Some(ext) = original.extension() {
        name.push(".");
        name.push(ext);
    }
    original.with_file_name(name)
}

/// Seal the file at `path` for `recipient`, writing `<path>.enc` and `<path>.key`
///
/// Both artifacts are written or neither is.
pub fn encrypt_file(path: &Path, recipient: &PublicKey) -> Result<EncryptedArtifacts, FileError> {
    let plaintext = fs::read(path).map_err(FileError::fs(path))?;
    let (ciphertext, ephemeral_pem) = Envelope::seal(&plaintext, recipient)?.into_artifacts()?;

    let artifacts = EncryptedArtifacts {
        ciphertext_path: encrypted_path_for(path),
        ephemeral_key_path: ephemeral_key_path_for(path),
    };
    let dir = parent_dir(path);

    let staged_ciphertext =
        stage(dir, &ciphertext, Permissions::Public).map_err(FileError::fs(dir))?;
    let staged_key =
        stage(dir, ephemeral_pem.as_bytes(), Permissions::Public).map_err(FileError::fs(dir))?;

    staged_ciphertext
        .persist(&artifacts.ciphertext_path)
        .map_err(|e| FileError::fs(&artifacts.ciphertext_path)(e.error))?;
    if let Err(e) = staged_key.persist(&artifacts.ephemeral_key_path) {
        let _ = fs::remove_file(&artifacts.ciphertext_path);
        return Err(FileError::fs(&artifacts.ephemeral_key_path)(e.error));
    }

    tracing::info!(
        input = %path.display(),
        ciphertext = %artifacts.ciphertext_path.display(),
        key = %artifacts.ephemeral_key_path.display(),
        "encrypted file"
    );
    Ok(artifacts)
}

/// Open a ciphertext with its ephemeral key file and write the plaintext
///
/// `sender` is an optional wire-format sender public key. It is parsed and otherwise
/// ignored; see [`Envelope::open_with_sender`]. Returns the path of the decrypted file.
pub fn decrypt_file(
    encrypted_path: &Path,
    ephemeral_key_path: &Path,
    recipient_secret: &SecretKey,
    sender: Option<&str>,
) -> Result<PathBuf, FileError> {
    let ephemeral_bytes = fs::read(ephemeral_key_path).map_err(FileError::fs(ephemeral_key_path))?;
    let ephemeral_pem = String::from_utf8(ephemeral_bytes)
        .map_err(KeyError::from)
        .map_err(EnvelopeError::from)?;
    let ciphertext = fs::read(encrypted_path).map_err(FileError::fs(encrypted_path))?;

    let envelope = Envelope::from_artifacts(ciphertext, &ephemeral_pem)?;
    let plaintext = envelope.open_with_sender(recipient_secret, sender)?;

    let output_path = decrypted_path_for(encrypted_path);
    let dir = parent_dir(&output_path);
    stage(dir, &plaintext, Permissions::Private)
        .map_err(FileError::fs(dir))?
        .persist(&output_path)
        .map_err(|e| FileError::fs(&output_path)(e.error))?;

    tracing::info!(
        input = %encrypted_path.display(),
        output = %output_path.display(),
        "decrypted file"
    );
    Ok(output_path)
}

/// Access mode for a staged file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Permissions {
    /// Owner read/write only
    Private,
    /// World readable
    Public,
}

/// Write `contents` to a new temporary file inside `dir`, ready to be persisted
pub(crate) fn stage(dir: &Path, contents: &[u8], mode: Permissions) -> io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if mode == Permissions::Public {
            fs::set_permissions(file.path(), fs::Permissions::from_mode(0o644))?;
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(file)
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_artifact_paths() {
        let path = Path::new("/data/report.pdf");
        assert_eq!(encrypted_path_for(path), PathBuf::from("/data/report.pdf.enc"));
        assert_eq!(ephemeral_key_path_for(path), PathBuf::from("/data/report.pdf.key"));
        assert_eq!(
            key_path_for(Path::new("/data/report.pdf.enc")),
            PathBuf::from("/data/report.pdf.key")
        );
    }

    #[test]
    fn test_decrypted_path() {
        assert_eq!(
            decrypted_path_for(Path::new("/data/report.pdf.enc")),
            PathBuf::from("/data/report-decrypted.pdf")
        );
        assert_eq!(
            decrypted_path_for(Path::new("notes.enc")),
            PathBuf::from("notes-decrypted")
        );
        assert_eq!(
            decrypted_path_for(Path::new("archive.tar.gz.enc")),
            PathBuf::from("archive.tar-decrypted.gz")
        );
        // not an .enc file: keep the name and still avoid clobbering the input
        assert_eq!(
            decrypted_path_for(Path::new("blob.bin")),
            PathBuf::from("blob-decrypted.bin")
        );
    }

    #[test]
    fn test_parent_dir_of_bare_name() {
        assert_eq!(parent_dir(Path::new("file.txt")), Path::new("."));
        assert_eq!(parent_dir(Path::new("/tmp/file.txt")), Path::new("/tmp"));
    }
}

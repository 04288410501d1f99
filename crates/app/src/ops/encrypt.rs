use std::path::{Path, PathBuf};

use clap::Args;
use common::crypto::{KeyError, PublicKey};
use common::files::{encrypt_file, EncryptedArtifacts, FileError};

#[derive(Args, Debug, Clone)]
#[command(about = "Encrypt a file for a recipient's public key")]
pub struct Encrypt {
    /// File to encrypt
    #[arg(long)]
    pub file: PathBuf,

    /// Recipient public key in single-line form (see 'datacrypt keys show')
    #[arg(long, required_unless_present = "recipient_pem", conflicts_with = "recipient_pem")]
    pub recipient: Option<String>,

    /// Path to the recipient public key PEM file
    #[arg(long)]
    pub recipient_pem: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum EncryptError {
    #[error("invalid recipient public key: {0}")]
    Recipient(#[from] KeyError),
    #[error("failed to read {}: {source}", path.display())]
    RecipientFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no recipient public key given")]
    MissingRecipient,
    #[error("encryption failed: {0}")]
    File(#[from] FileError),
    #[error("encryption task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Encrypt {
    fn recipient_key(&self) -> Result<PublicKey, EncryptError> {
        match (&self.recipient, &self.recipient_pem) {
            (Some(wire), _) => Ok(PublicKey::from_wire(wire)?),
            (None, Some(path)) => {
                let pem = read_recipient_pem(path)?;
                Ok(PublicKey::from_pem(&pem)?)
            }
            (None, None) => Err(EncryptError::MissingRecipient),
        }
    }
}

fn read_recipient_pem(path: &Path) -> Result<String, EncryptError> {
    std::fs::read_to_string(path).map_err(|source| EncryptError::RecipientFile {
        path: path.to_path_buf(),
        source,
    })
}

#[async_trait::async_trait]
impl crate::op::Op for Encrypt {
    type Error = EncryptError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let recipient = self.recipient_key()?;
        let file = self.file.clone();

        let EncryptedArtifacts {
            ciphertext_path,
            ephemeral_key_path,
        } = tokio::task::spawn_blocking(move || encrypt_file(&file, &recipient)).await??;

        Ok(format!(
            "Encrypted {}\n\
             - Ciphertext: {}\n\
             - Ephemeral key: {}",
            self.file.display(),
            ciphertext_path.display(),
            ephemeral_key_path.display(),
        ))
    }
}

use std::path::PathBuf;

use clap::Args;
use common::files::{decrypt_file, key_path_for, FileError};
use common::identity::IdentityError;

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
#[command(about = "Decrypt a file with the local private key")]
pub struct Decrypt {
    /// Encrypted file (<name>.enc)
    #[arg(long)]
    pub file: PathBuf,

    /// Ephemeral key file (defaults to <name>.key next to the ciphertext)
    #[arg(long)]
    pub key: Option<PathBuf>,

    /// Sender public key in single-line form. Parsed but not verified.
    #[arg(long)]
    pub sender: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DecryptError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("failed to load private key: {0}")]
    Identity(#[from] IdentityError),
    #[error("decryption failed: {0}")]
    File(#[from] FileError),
    #[error("decryption task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[async_trait::async_trait]
impl crate::op::Op for Decrypt {
    type Error = DecryptError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let secret_key = ctx.state()?.key_store().load_secret_key()?;

        let file = self.file.clone();
        let key = self.key.clone().unwrap_or_else(|| key_path_for(&file));
        let sender = self.sender.clone();

        let output_path = tokio::task::spawn_blocking(move || {
            decrypt_file(&file, &key, &secret_key, sender.as_deref())
        })
        .await??;

        Ok(format!("Decrypted to {}", output_path.display()))
    }
}

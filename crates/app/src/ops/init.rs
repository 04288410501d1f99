use std::path::PathBuf;

use clap::Args;
use common::identity::{IdentityError, IdentityStatus};

use crate::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Directory for the identity key pair (default: <datacrypt dir>/keys)
    #[arg(long)]
    pub key_dir: Option<PathBuf>,

    /// Default log level written to the config (default: warn)
    #[arg(long = "default-log-level", default_value = "warn")]
    pub default_log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
    #[error("init failed: {0}")]
    Identity(#[from] IdentityError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            key_dir: self.key_dir.clone(),
            log_level: self.default_log_level.clone(),
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;
        let key_store = state.key_store();
        let status = key_store.ensure_identity_keys()?;

        let identity = match status {
            IdentityStatus::Generated => "generated",
            IdentityStatus::AlreadyPresent => "existing key pair kept",
            IdentityStatus::Restored => "public key restored from private key",
        };

        let output = format!(
            "Initialized datacrypt directory at: {}\n\
             - Config: {}\n\
             - Private key: {}\n\
             - Public key: {}\n\
             - Identity: {}",
            state.app_dir.display(),
            state.config_path.display(),
            key_store.private_key_path().display(),
            key_store.public_key_path().display(),
            identity,
        );

        Ok(output)
    }
}

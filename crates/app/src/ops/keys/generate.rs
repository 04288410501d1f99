use clap::Args;
use common::identity::{IdentityError, IdentityStatus};

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
#[command(about = "Generate the identity key pair if it does not exist yet")]
pub struct Generate;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("key generation failed: {0}")]
    Identity(#[from] IdentityError),
}

#[async_trait::async_trait]
impl crate::op::Op for Generate {
    type Error = GenerateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let key_store = ctx.state()?.key_store();
        let status = key_store.ensure_identity_keys()?;

        let output = match status {
            IdentityStatus::Generated => format!(
                "Generated new identity key pair in {}",
                key_store.dir().display()
            ),
            IdentityStatus::AlreadyPresent => format!(
                "Identity key pair already present in {}",
                key_store.dir().display()
            ),
            IdentityStatus::Restored => format!(
                "Restored public key {} from the existing private key",
                key_store.public_key_path().display()
            ),
        };

        Ok(output)
    }
}

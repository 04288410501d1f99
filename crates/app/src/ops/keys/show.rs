use std::fmt;
use std::path::PathBuf;

use clap::Args;
use common::identity::IdentityError;

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
#[command(about = "Print the public key in its single-line sharing format")]
pub struct Show {
    /// Print only the public key
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug)]
pub struct ShowOutput {
    public_key: String,
    private_key_path: PathBuf,
    public_key_path: PathBuf,
    quiet: bool,
}

impl fmt::Display for ShowOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quiet {
            return write!(f, "{}", self.public_key);
        }
        writeln!(f, "Public key: {}", self.public_key)?;
        writeln!(f, "- Private key file: {}", self.private_key_path.display())?;
        write!(f, "- Public key file: {}", self.public_key_path.display())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShowError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("{0}. Run 'datacrypt keys generate' first")]
    Identity(#[from] IdentityError),
}

#[async_trait::async_trait]
impl crate::op::Op for Show {
    type Error = ShowError;
    type Output = ShowOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let key_store = ctx.state()?.key_store();
        let public_key = key_store.public_key_wire()?;

        Ok(ShowOutput {
            public_key,
            private_key_path: key_store.private_key_path(),
            public_key_path: key_store.public_key_path(),
            quiet: self.quiet,
        })
    }
}

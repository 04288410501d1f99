//! Keys command - manage the local identity key pair
//!
//! - datacrypt keys generate   - Provision the key pair if it is missing
//! - datacrypt keys show       - Print the shareable public key

use clap::{Args, Subcommand};

pub mod generate;
pub mod show;

use crate::op::Op;

crate::command_enum! {
    (Generate, generate::Generate),
    (Show, show::Show),
}

pub type KeysCommand = Command;

#[derive(Args, Debug, Clone)]
#[command(about = "Manage the local identity key pair")]
pub struct Keys {
    #[command(subcommand)]
    pub command: KeysCommand,
}

#[async_trait::async_trait]
impl Op for Keys {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

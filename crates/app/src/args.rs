pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "datacrypt")]
#[command(about = "Encrypt files so only the holder of a private key can read them")]
#[command(version)]
pub struct Args {
    /// Path to the datacrypt directory (defaults to ~/.datacrypt)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}

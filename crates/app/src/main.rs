// CLI modules
mod args;
mod logging;
mod op;
mod ops;
mod state;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use ops::{Decrypt, Encrypt, Init, Keys, Version};

command_enum! {
    (Init, Init),
    (Keys, Keys),
    (Encrypt, Encrypt),
    (Decrypt, Decrypt),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let ctx = op::OpContext::new(args.config_path);
    let guard = logging::init_logging(args.log_level.as_deref(), &ctx);

    let result = args.command.execute(&ctx).await;
    // flush buffered log lines before exiting
    drop(guard);

    match result {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`check`], [`status`], [`init`], or
//! [`validate`]. Each handler lives in its own submodule.

pub mod check;
pub mod init;
pub mod run;
pub mod status;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::HandoverError;

pub async fn dispatch(cli: Cli) -> Result<(), HandoverError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Check(args)) => check::execute(args).await,
        Some(Commands::Status(args)) => status::execute(args).await,
        Some(Commands::Init(ref args)) => init::execute(args),
        Some(Commands::Validate(ref args)) => validate::execute(args),
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  handover v{version} \u{2014} failover configuration controller\n\n  \
         No command provided. To get started:\n\n    \
         handover init                     Generate a starter bootstrap file\n    \
         handover run                      Start the controller (auto-detects ./handover.yaml)\n    \
         handover check                    Dry-run resolution of every provider\n    \
         handover --help                   See all commands and options\n"
    );
}

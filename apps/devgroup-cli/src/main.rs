//! devgroup - add a managed device to a security group
//!
//! Finds a device in Intune by owner, name or identifier, resolves its
//! Entra ID device object and adds it to an eligible group.

use clap::Parser;

use devgroup_cli::cli::{parse_error_exit_code, Cli};
use devgroup_cli::{assign, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(parse_error_exit_code(&e));
        }
    };

    // Load .env if present
    let _ = dotenvy::dotenv();

    logging::init_logging(cli.verbose);

    match assign::execute(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

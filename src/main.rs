//! appforge's main application entry point.
//! Parses the command line, loads the configuration and runs every platform target.

use appforge::{
    cli::{get_args, Args},
    config::load_config,
    error::{default_error_handler, Result},
    logger::init_logger,
    targets::{run_all, Command, Context},
};
use log::info;

/// Main application entry point.
fn main() {
    let args = get_args();

    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Resolves the install root and loads its configuration
/// 2. Runs React Native, Android and iOS in sequence, creating or updating the client
fn run(args: Args) -> Result<()> {
    let root = args.install_root()?;
    let config = load_config(&root)?;
    let command = args.mode();

    match command {
        Command::Create => info!("Creating new client: {}", config.client_name),
        Command::Update => info!("Updating existing client: {}", config.client_name),
    }

    let ctx = Context::new(config, root);
    run_all(&ctx, command)?;

    info!("Operation completed successfully");
    Ok(())
}

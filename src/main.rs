mod checker;
mod cli;
mod compiler;
mod config;
mod handlers;
mod logger;
mod utils;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use env_logger::Env;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    ctrlc::set_handler(|| {
        log::error!("🛑 Interrupted.");
        std::process::exit(130);
    })?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { force, dry_run } => handlers::build::handle_build(force, dry_run),
        Commands::Check => handlers::check::handle_check(),
        Commands::List => handlers::list::handle_list(),
        Commands::Clean => handlers::clean::handle_clean(),
        Commands::Env => handlers::env::handle_env(),
    }
}

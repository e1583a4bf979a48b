use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "restyle", version, about = "Restyle: Incremental Stylesheet Compiler Runner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile stylesheets, skipping the run when nothing changed
    Build {
        /// Compile even if everything is up-to-date
        #[arg(short, long)]
        force: bool,

        /// Print compiler commands without executing them
        #[arg(short = 'd', long = "dry-run")]
        dry_run: bool,
    },

    /// Report whether a build is required, without compiling
    #[command(visible_alias = "st")]
    Check,

    /// List configured locations
    #[command(visible_alias = "ls")]
    List,

    /// Clean artifacts defined in restyle.toml
    Clean,

    /// Inspect environment variables
    Env,
}

use anyhow::{Context, Result};
use colored::*;
use log::info;
use std::env;

use crate::checker;
use crate::compiler;
use crate::config::load_config;

pub fn handle_build(force: bool, dry_run: bool) -> Result<()> {
    let current_dir = env::current_dir()?;
    let config = load_config(&current_dir)?;

    if !force {
        let decision =
            checker::evaluate(&config.build).context("Could not check file timestamps")?;
        if !decision.build_required {
            info!(
                "{} Stylesheets are up-to-date. Skipping compile.",
                "✨".green()
            );
            return Ok(());
        }
    }

    info!("{} Compiling stylesheet templates", "⚡".yellow());
    compiler::compile_all(&config, &current_dir, dry_run)
}

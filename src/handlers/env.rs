use anyhow::Result;
use colored::*;
use std::env;

use crate::config::load_config;
use crate::utils::is_sensitive_key;

/// Show the environment the compiler process will receive, i.e. the merged
/// [env] table and .env layer. Secrets stay readable as names only.
pub fn handle_env() -> Result<()> {
    let current_dir = env::current_dir()?;
    let config = load_config(&current_dir)?;

    println!("{} Compiler Environment (merged):", "🔍".cyan());

    if config.env.is_empty() {
        println!("  (none)");
        return Ok(());
    }

    let mut keys: Vec<&String> = config.env.keys().collect();
    keys.sort();

    for key in keys {
        if is_sensitive_key(key) {
            println!("  {} = {}", key.bold(), "[REDACTED]".red().dimmed());
        } else {
            println!("  {} = {}", key.bold(), config.env[key]);
        }
    }

    Ok(())
}

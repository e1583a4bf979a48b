use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::*;
use std::env;
use std::time::SystemTime;

use crate::checker;
use crate::config::load_config;

pub fn handle_check() -> Result<()> {
    let current_dir = env::current_dir()?;
    let config = load_config(&current_dir)?;

    let decision = checker::evaluate(&config.build).context("Could not check file timestamps")?;

    if decision.missing_build_dir {
        println!(
            "{} Output directory {} does not exist yet.",
            "📁".yellow(),
            config.build.directory.display().to_string().bold()
        );
    }

    for pair in &decision.pairs {
        let marker = if pair.stale {
            "stale".red().bold()
        } else {
            "fresh".green()
        };
        println!(
            "{} {} {} {}",
            marker,
            pair.source.display(),
            "→".dimmed(),
            pair.target.display()
        );
        println!(
            "      source: {} file(s), newest {}, oldest {}",
            pair.source_stats.count,
            fmt_time(pair.source_stats.youngest),
            fmt_time(pair.source_stats.oldest)
        );
        println!(
            "      target: {} file(s), newest {}, oldest {}",
            pair.target_stats.count,
            fmt_time(pair.target_stats.youngest),
            fmt_time(pair.target_stats.oldest)
        );
    }

    if decision.build_required {
        println!("\n{} Build required.", "🔨".yellow());
    } else {
        println!("\n{} Everything up-to-date.", "✨".green());
    }

    Ok(())
}

fn fmt_time(time: Option<SystemTime>) -> String {
    match time {
        Some(t) => DateTime::<Local>::from(t)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "-".to_string(),
    }
}

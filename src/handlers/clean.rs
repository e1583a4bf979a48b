use anyhow::Result;
use colored::*;
use std::env;
use std::fs;
use std::path::Path;

use crate::config::{RestyleConfig, load_config};

pub fn handle_clean() -> Result<()> {
    let current_dir = env::current_dir()?;
    let config = load_config(&current_dir)?;
    clean_targets(&config, &current_dir)
}

/// Remove generated artifacts. `[clean] targets` globs win when present;
/// otherwise the configured location targets are removed wholesale.
fn clean_targets(config: &RestyleConfig, root: &Path) -> Result<()> {
    println!("{} Cleaning targets...", "🧹".red());

    let mut removed = 0usize;

    match &config.clean {
        Some(section) => {
            for pattern in &section.targets {
                let full_pattern = format!("{}/{}", root.to_string_lossy(), pattern);
                for entry in glob::glob(&full_pattern)? {
                    if let Ok(path) = entry {
                        remove_entry(&path)?;
                        removed += 1;
                    }
                }
            }
        }
        None => {
            for location in &config.build.locations {
                if location.target.exists() {
                    remove_entry(&location.target)?;
                    removed += 1;
                }
            }
        }
    }

    if removed == 0 {
        println!("   Nothing to clean.");
    }
    Ok(())
}

fn remove_entry(path: &Path) -> Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)?;
        println!("   Deleted dir: {:?}", path.file_name().unwrap_or_default());
    } else {
        fs::remove_file(path)?;
        println!("   Deleted file: {:?}", path.file_name().unwrap_or_default());
    }
    Ok(())
}

use anyhow::{Context, Result};
use blake3::Hasher;
use chrono::Local;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{LogStrategy, RestyleConfig};
use crate::utils::is_sensitive_key;

const LOG_ROOT: &str = ".restyle";

pub fn strip_ansi(content: &str) -> String {
    let re = Regex::new(r"\x1b\[[0-9;]*m").unwrap();
    re.replace_all(content, "").to_string()
}

/// Persist one compiler run under `.restyle/logs/<date>/<exit>/`.
///
/// Returns the written path, or None when the configured strategy says this
/// run should not be logged.
pub fn write_log(
    pair_label: &str,
    cmd_str: &str,
    content: &str,
    config: &RestyleConfig,
    root: &Path,
    duration: Duration,
    exit_code: i32,
) -> Result<Option<PathBuf>> {
    // 1. Determine Strategy
    let (strategy, log_plain) = match &config.project {
        Some(p) => (p.log_strategy, p.log_plain.unwrap_or(true)),
        None => (None, true),
    };
    let strategy = strategy.unwrap_or(LogStrategy::None);

    match strategy {
        LogStrategy::None => return Ok(None),
        LogStrategy::ErrorOnly => {
            if exit_code == 0 {
                return Ok(None);
            }
        }
        LogStrategy::Always => {}
    }

    // 2. Generate Path
    let now = Local::now();
    let date_str = now.format("%Y-%m-%d").to_string();
    let time_str = now.format("%H%M%S").to_string();

    // Short hash keeps names unique when several pairs compile in one second
    let mut hasher = Hasher::new();
    hasher.update(pair_label.as_bytes());
    hasher.update(time_str.as_bytes());
    let hash_full = hasher.finalize().to_hex().to_string();
    let short_hash = &hash_full[0..6];

    let safe_label = pair_label.replace(['/', '\\'], "_");
    let filename = format!("{}_{}_{}.log", time_str, safe_label, short_hash);
    let log_dir = root
        .join(LOG_ROOT)
        .join("logs")
        .join(date_str)
        .join(exit_code.to_string());

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;
    let log_path = log_dir.join(filename);

    // 3. Format Content
    let mut file_content = String::new();

    file_content.push_str("=== RESTYLE COMPILE LOG ===\n");
    file_content.push_str(&format!("Location: {}\n", pair_label));
    file_content.push_str(&format!("Command: {}\n", cmd_str));
    file_content.push_str(&format!("Time: {}\n", now.to_rfc3339()));
    file_content.push_str("=== ENVIRONMENT SNAPSHOT ===\n");
    file_content.push_str(&env_snapshot(&config.env));
    file_content.push_str("============================\n\n");

    let body = if log_plain {
        strip_ansi(content)
    } else {
        content.to_string()
    };
    file_content.push_str(&body);
    if !body.ends_with('\n') {
        file_content.push('\n');
    }

    file_content.push_str("\n============================\n");
    file_content.push_str(&format!("Exit Code: {}\n", exit_code));
    file_content.push_str(&format!("Duration: {} ms\n", duration.as_millis()));
    file_content.push_str(&format!("End Time: {}\n", Local::now().to_rfc3339()));
    file_content.push_str("============================\n");

    fs::write(&log_path, file_content).context("Failed to write log file")?;

    Ok(Some(log_path))
}

fn env_snapshot(env_vars: &HashMap<String, String>) -> String {
    let mut sorted_keys: Vec<_> = env_vars.keys().collect();
    sorted_keys.sort();

    let mut snapshot = String::new();
    for key in sorted_keys {
        if is_sensitive_key(key) {
            snapshot.push_str(&format!("{} = [REDACTED]\n", key));
        } else {
            snapshot.push_str(&format!("{} = {}\n", key, env_vars[key]));
        }
    }
    snapshot
}

use anyhow::{Context, Result, bail};
use colored::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct RestyleConfig {
    pub project: Option<ProjectConfig>,
    pub build: BuildConfig,
    pub compiler: CompilerConfig,
    #[serde(default)]
    pub env: HashMap<String, String>,
    pub clean: Option<CleanConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Metadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub authors: Option<Vec<String>>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum LogStrategy {
    Always,
    ErrorOnly,
    None,
}

#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub shell: Option<String>,
    pub log_strategy: Option<LogStrategy>,
    pub log_plain: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct BuildConfig {
    /// Coarse output root; its absence means a first-ever build.
    pub directory: PathBuf,
    #[serde(default)]
    pub locations: Vec<Location>,
}

/// One source tree and the generated tree it compiles into.
#[derive(Debug, Deserialize, Clone)]
pub struct Location {
    pub source: PathBuf,
    pub target: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct CompilerConfig {
    /// Command template; `$source` and `$target` expand per location,
    /// `${VAR}` interpolates from the merged environment.
    pub command: String,
    /// Seconds before a compiler run is killed. 0 disables the timeout.
    pub timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CleanConfig {
    pub targets: Vec<String>,
}

pub fn load_config(dir: &Path) -> Result<RestyleConfig> {
    let config_path = dir.join("restyle.toml");
    if !config_path.exists() {
        bail!("❌ Critical: 'restyle.toml' not found in {:?}.", dir);
    }
    let content = fs::read_to_string(&config_path).context("Failed to read restyle.toml")?;

    // 1. Parse restyle.toml (Base Layer)
    let mut config: RestyleConfig =
        toml::from_str(&content).context("Failed to parse restyle.toml")?;

    // Validation
    if config.build.locations.is_empty() {
        bail!("❌ Configuration Error: no [[build.locations]] defined in restyle.toml.");
    }
    if config.compiler.command.trim().is_empty() {
        bail!("❌ Configuration Error: [compiler] command must not be empty.");
    }

    // Resolve paths relative to the config file's directory
    config.build.directory = resolve_path(dir, &config.build.directory);
    for loc in &mut config.build.locations {
        loc.source = resolve_path(dir, &loc.source);
        loc.target = resolve_path(dir, &loc.target);
    }

    // 2. Load .env using dotenvy (Override Layer)
    // Determines filename: .env or .env.<name> based on RESTYLE_ENV
    let env_filename = env::var("RESTYLE_ENV")
        .map(|v| format!(".env.{}", v))
        .unwrap_or_else(|_| ".env".to_string());

    let env_path = dir.join(&env_filename);

    if env_path.exists() {
        eprintln!(
            "{} Loading environment from: {}",
            "🌿".green(),
            env_filename.bold()
        );

        // Collected into the config map, not set globally; the compiler
        // process gets them at spawn time.
        for item in dotenvy::from_path_iter(&env_path)? {
            let (key, val) = item?;
            // .env overrides restyle.toml
            config.env.insert(key, val);
        }
    }

    Ok(config)
}

fn resolve_path(dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}

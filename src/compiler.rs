use anyhow::{Context, Result, bail};
use colored::*;
use log::info;
use std::path::Path;
use std::time::Duration;

use crate::config::RestyleConfig;
use crate::logger::write_log;
use crate::utils::{detect_shell, expand_command, run_shell_command};

const DEFAULT_TIMEOUT_SECS: u64 = 1800;

/// Run the external compiler once per configured location.
///
/// The staleness decision has already been made by the caller; this only
/// knows how to turn locations into command lines and execute them. The
/// first failing pair aborts the run.
pub fn compile_all(config: &RestyleConfig, root: &Path, dry_run: bool) -> Result<()> {
    let shell_cmd = detect_shell(config.project.as_ref().and_then(|p| p.shell.as_ref()));

    if !dry_run {
        ensure_compiler_available(&config.compiler.command)?;
    }

    let timeout = match config.compiler.timeout {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
    };

    for location in &config.build.locations {
        let label = display_relative(&location.source, root);
        let final_cmd = expand_command(
            &config.compiler.command,
            &location.source,
            &location.target,
            &config.env,
        );

        if dry_run {
            println!("{} [DRY-RUN] Executing: {}", "::".yellow(), final_cmd);
            continue;
        }

        info!("{} Compiling: {}", "⚡".yellow(), label.bold());
        info!("{} Executing: {}", "::".blue(), final_cmd);

        let outcome = run_shell_command(&final_cmd, &config.env, &label, &shell_cmd, timeout)?;

        if let Some(log_path) = write_log(
            &label,
            &final_cmd,
            &outcome.output,
            config,
            root,
            outcome.duration,
            outcome.exit_code,
        )? {
            info!("📝 Compiler output saved to {:?}", log_path);
        }

        if outcome.exit_code != 0 {
            bail!(
                "❌ Compilation failed for '{}' -> Exit code {}",
                label,
                outcome.exit_code
            );
        }
    }

    Ok(())
}

/// Fail fast with a readable error when the compiler binary is missing,
/// instead of a per-pair shell "command not found".
fn ensure_compiler_available(command: &str) -> Result<()> {
    let words =
        shell_words::split(command).context("Failed to parse the [compiler] command")?;
    let Some(program) = words.first() else {
        bail!("❌ Configuration Error: [compiler] command is empty.");
    };
    // The program itself may come from interpolation; leave that to the shell
    if program.contains('$') {
        return Ok(());
    }
    which::which(program)
        .with_context(|| format!("Compiler '{}' not found on PATH", program))?;
    Ok(())
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildConfig, CompilerConfig, Location};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn fake_config(command: &str) -> RestyleConfig {
        RestyleConfig {
            project: None,
            build: BuildConfig {
                directory: PathBuf::from("public"),
                locations: vec![Location {
                    source: PathBuf::from("styles"),
                    target: PathBuf::from("public/css"),
                }],
            },
            compiler: CompilerConfig {
                command: command.to_string(),
                timeout: Some(0),
            },
            env: HashMap::new(),
            clean: None,
        }
    }

    #[test]
    fn test_missing_compiler_is_reported() {
        let err = ensure_compiler_available("definitely-not-a-compiler-xyz --update").unwrap_err();
        assert!(err.to_string().contains("not found on PATH"));
    }

    #[test]
    fn test_interpolated_program_is_left_to_the_shell() {
        assert!(ensure_compiler_available("${COMPILER} --update").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_present_compiler_passes() {
        assert!(ensure_compiler_available("sh -c true").is_ok());
    }

    #[test]
    fn test_dry_run_executes_nothing() {
        // The command does not exist; dry-run must not even resolve it.
        let config = fake_config("definitely-not-a-compiler-xyz $source:$target");
        compile_all(&config, Path::new("."), true).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_compiler_aborts_with_pair_named() {
        let config = fake_config("sh -c 'exit 2'");
        let err = compile_all(&config, Path::new("."), false).unwrap_err();
        assert!(err.to_string().contains("styles"));
        assert!(err.to_string().contains("Exit code 2"));
    }
}

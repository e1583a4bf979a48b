use anyhow::{Context, Result, bail};
use colored::*;
use regex::Regex;
use std::collections::HashMap;
use std::env;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// What one compiler run produced, for error reporting and log files.
#[derive(Debug)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub output: String,
    pub duration: Duration,
}

/// Expand a compiler command template for one location.
///
/// `$source` / `$target` become the pair's paths; `${VAR}` is interpolated
/// from the merged environment. Unknown `${VAR}` references are left
/// untouched so the shell can still resolve them.
pub fn expand_command(
    template: &str,
    source: &Path,
    target: &Path,
    env_vars: &HashMap<String, String>,
) -> String {
    let expanded = template
        .replace("$source", &source.to_string_lossy())
        .replace("$target", &target.to_string_lossy());

    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    re.replace_all(&expanded, |caps: &regex::Captures| {
        match env_vars.get(&caps[1]) {
            Some(val) => val.clone(),
            None => caps[0].to_string(),
        }
    })
    .into_owned()
}

pub fn detect_shell(config_shell: Option<&String>) -> String {
    config_shell
        .cloned()
        .or_else(|| env::var("SHELL").ok())
        .unwrap_or_else(|| {
            if cfg!(windows) {
                "cmd".to_string()
            } else {
                "sh".to_string()
            }
        })
}

/// Run one command line through the shell.
///
/// Output is streamed to the console with a `[label]` prefix and also
/// collected for the execution log. A timeout kills the child and fails the
/// run; so does a spawn failure. A nonzero exit is NOT an error here, the
/// caller decides what to do with it (the log must be written either way).
pub fn run_shell_command(
    cmd_str: &str,
    env_vars: &HashMap<String, String>,
    label: &str,
    shell_cmd: &str,
    timeout: Option<Duration>,
) -> Result<RunOutcome> {
    // "cmd" or "cmd.exe" uses /C, everything else (sh, bash, zsh, fish,
    // powershell) takes -c
    let flag = if shell_cmd.contains("cmd") && !shell_cmd.contains("sh") {
        "/C"
    } else {
        "-c"
    };

    let started = Instant::now();
    let mut child = Command::new(shell_cmd)
        .arg(flag)
        .arg(cmd_str)
        .envs(env_vars)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("Failed to spawn shell process")?;

    let stdout_thread = stream_lines(child.stdout.take(), label.cyan().to_string(), false);
    let stderr_thread = stream_lines(child.stderr.take(), label.red().to_string(), true);

    let status = wait_child(&mut child, cmd_str, timeout)?;

    let mut output = String::new();
    for handle in [stdout_thread, stderr_thread].into_iter().flatten() {
        if let Ok(chunk) = handle.join() {
            output.push_str(&chunk);
        }
    }

    Ok(RunOutcome {
        exit_code: status.code().unwrap_or(-1),
        output,
        duration: started.elapsed(),
    })
}

fn wait_child(child: &mut Child, cmd_str: &str, timeout: Option<Duration>) -> Result<ExitStatus> {
    match timeout {
        Some(limit) => match child
            .wait_timeout(limit)
            .context("Failed to wait on shell process")?
        {
            Some(status) => Ok(status),
            None => {
                child.kill().ok();
                child.wait().ok();
                bail!(
                    "⏱️ Command timed out after {}s: '{}'",
                    limit.as_secs(),
                    cmd_str
                );
            }
        },
        None => child.wait().context("Failed to wait on shell process"),
    }
}

/// Echo each line with a colored prefix while collecting the raw text.
fn stream_lines<R: std::io::Read + Send + 'static>(
    pipe: Option<R>,
    prefix: String,
    to_stderr: bool,
) -> Option<thread::JoinHandle<String>> {
    let pipe = pipe?;
    Some(thread::spawn(move || {
        let mut collected = String::new();
        for line in BufReader::new(pipe).lines() {
            let Ok(line) = line else { break };
            if to_stderr {
                eprintln!("[{}] {}", prefix, line);
            } else {
                println!("[{}] {}", prefix, line);
            }
            collected.push_str(&line);
            collected.push('\n');
        }
        collected
    }))
}

/// Env keys whose values must never land in logs or terminal output.
pub fn is_sensitive_key(key: &str) -> bool {
    let upper = key.to_uppercase();
    upper.contains("KEY")
        || upper.contains("TOKEN")
        || upper.contains("PASS")
        || upper.contains("SECRET")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn paths() -> (PathBuf, PathBuf) {
        (PathBuf::from("styles"), PathBuf::from("public/css"))
    }

    #[test]
    fn test_expand_placeholders() {
        let (source, target) = paths();
        let cmd = expand_command("sass --update $source:$target", &source, &target, &HashMap::new());
        assert_eq!(cmd, "sass --update styles:public/css");
    }

    #[test]
    fn test_expand_env_interpolation() {
        let (source, target) = paths();
        let mut env_vars = HashMap::new();
        env_vars.insert("STYLE".to_string(), "compressed".to_string());

        let cmd = expand_command(
            "sass --style ${STYLE} $source:$target",
            &source,
            &target,
            &env_vars,
        );
        assert_eq!(cmd, "sass --style compressed styles:public/css");
    }

    #[test]
    fn test_expand_unknown_var_untouched() {
        let (source, target) = paths();
        let cmd = expand_command("sass ${NOPE} $source", &source, &target, &HashMap::new());
        assert_eq!(cmd, "sass ${NOPE} styles");
    }

    #[test]
    fn test_sensitive_keys() {
        assert!(is_sensitive_key("API_KEY"));
        assert!(is_sensitive_key("db_password"));
        assert!(is_sensitive_key("GH_TOKEN"));
        assert!(!is_sensitive_key("SASS_PATH"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_shell_command_captures_output() {
        let outcome =
            run_shell_command("echo styled", &HashMap::new(), "test", "sh", None).unwrap();
        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.output.contains("styled"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_shell_command_nonzero_exit() {
        let outcome = run_shell_command("exit 3", &HashMap::new(), "test", "sh", None).unwrap();
        assert_eq!(outcome.exit_code, 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_shell_command_timeout() {
        let result = run_shell_command(
            "sleep 5",
            &HashMap::new(),
            "test",
            "sh",
            Some(Duration::from_millis(100)),
        );
        assert!(result.unwrap_err().to_string().contains("timed out"));
    }
}

//! Host command execution and working-directory helpers

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::core::{BridgeError, BridgeResult, TerminalOutput};

/// Run a host command. The line is split on whitespace; no shell is involved.
pub async fn execute_command(
    command: &str,
    working_dir: Option<&str>,
) -> BridgeResult<TerminalOutput> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| BridgeError::new("Empty command"))?;
    let args: Vec<&str> = parts.collect();

    info!("Executing `{}` in {:?}", command.trim(), working_dir);
    run(program, &args, working_dir)
        .await
        .map_err(|e| BridgeError::new(format!("Failed to execute command: {}", e)))
}

/// Run the `docker` CLI with the given arguments
pub async fn execute_docker_command(
    args: &[String],
    working_dir: Option<&str>,
) -> BridgeResult<TerminalOutput> {
    info!("Executing docker {:?}", args);
    run("docker", args, working_dir)
        .await
        .map_err(|e| BridgeError::new(format!("Failed to execute docker command: {}", e)))
}

async fn run<S: AsRef<std::ffi::OsStr>>(
    program: &str,
    args: &[S],
    working_dir: Option<&str>,
) -> std::io::Result<TerminalOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    let output = cmd.output().await?;
    debug!("`{}` exited with {:?}", program, output.status.code());

    Ok(TerminalOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
        success: output.status.success(),
    })
}

pub fn home_directory() -> BridgeResult<String> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_string_lossy().into_owned())
        .ok_or_else(|| BridgeError::new("Failed to determine home directory"))
}

pub fn current_directory() -> BridgeResult<String> {
    std::env::current_dir()
        .map(|path| path.to_string_lossy().into_owned())
        .map_err(|e| BridgeError::new(format!("Failed to get current directory: {}", e)))
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &str) -> BridgeResult<PathBuf> {
    match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            let home = home_directory()?;
            Ok(Path::new(&home).join(rest.trim_start_matches('/')))
        }
        _ => Ok(PathBuf::from(path)),
    }
}

/// Validate that `path` is an existing directory and return its canonical form.
///
/// The process working directory is left alone; every terminal session keeps
/// its own.
pub async fn change_directory(path: &str) -> BridgeResult<String> {
    let expanded = expand_home(path)?;
    let canonical = tokio::fs::canonicalize(&expanded)
        .await
        .map_err(|e| BridgeError::new(format!("cd: {}: {}", path, e)))?;

    let metadata = tokio::fs::metadata(&canonical)
        .await
        .map_err(|e| BridgeError::new(format!("cd: {}: {}", path, e)))?;
    if !metadata.is_dir() {
        return Err(BridgeError::new(format!("cd: not a directory: {}", path)));
    }

    Ok(canonical.to_string_lossy().into_owned())
}

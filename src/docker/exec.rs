//! Exec helpers for running commands inside containers

use std::pin::Pin;

use bollard::container::LogOutput;
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use futures::{Stream, StreamExt};
use tracing::{debug, info};

use crate::core::DockerError;
use crate::docker::{DockerClient, DockerResult};

const SHELLS: [&str; 5] = ["bash", "zsh", "ash", "dash", "sh"];

/// Default process information from container inspect
#[derive(Debug, Clone)]
pub struct ExecDefaults {
    pub container_id: String,
    pub container_name: String,
    pub entrypoint: Vec<String>,
    pub cmd: Vec<String>,
    pub running: bool,
}

/// A started, non-interactive exec
pub struct ExecRun {
    pub exec_id: String,
    pub output: Pin<Box<dyn Stream<Item = DockerResult<LogOutput>> + Send>>,
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Detect whether a command vector looks like a shell invocation
pub fn looks_like_shell(cmd: &[String]) -> bool {
    match cmd.first() {
        Some(first) => SHELLS.contains(&basename(first)),
        None => false,
    }
}

/// Shell to run exec commands with: the first shell the image itself starts,
/// otherwise `/bin/sh`
pub fn preferred_shell(entrypoint: &[String], cmd: &[String]) -> String {
    entrypoint
        .iter()
        .chain(cmd)
        .find(|part| SHELLS.contains(&basename(part)))
        .cloned()
        .unwrap_or_else(|| "/bin/sh".to_string())
}

impl DockerClient {
    /// Fetch default exec information from container inspect
    pub async fn exec_defaults(&self, id: &str) -> DockerResult<ExecDefaults> {
        let inspect = self
            .inner()
            .inspect_container(id, None)
            .await
            .map_err(|e| DockerError::Container(format!("Failed to inspect {}: {}", id, e)))?;

        let config = inspect.config.unwrap_or_default();
        let name = inspect
            .name
            .unwrap_or_default()
            .trim_start_matches('/')
            .to_string();
        let running = inspect.state.and_then(|s| s.running).unwrap_or(false);

        Ok(ExecDefaults {
            container_id: id.to_string(),
            container_name: name,
            entrypoint: config.entrypoint.unwrap_or_default(),
            cmd: config.cmd.unwrap_or_default(),
            running,
        })
    }

    /// Create and start an exec with stdout and stderr attached, no TTY
    pub async fn run_exec(&self, container_id: &str, cmd: Vec<String>) -> DockerResult<ExecRun> {
        info!("Exec in {}: {:?}", container_id, cmd);

        let create = CreateExecOptions {
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            tty: Some(false),
            cmd: Some(cmd),
            ..Default::default()
        };

        let exec = self
            .inner()
            .create_exec(container_id, create)
            .await
            .map_err(|e| DockerError::Container(format!("Failed to create exec: {}", e)))?;

        let started = self
            .inner()
            .start_exec(
                &exec.id,
                Some(StartExecOptions {
                    detach: false,
                    tty: false,
                    output_capacity: None,
                }),
            )
            .await
            .map_err(|e| DockerError::Container(format!("Failed to start exec: {}", e)))?;

        match started {
            StartExecResults::Attached { output, .. } => Ok(ExecRun {
                exec_id: exec.id,
                output: Box::pin(
                    output.map(|item| item.map_err(|e| DockerError::Container(e.to_string()))),
                ),
            }),
            StartExecResults::Detached => Err(DockerError::Container(
                "Exec detached unexpectedly".to_string(),
            )),
        }
    }

    /// Exit code of a finished exec
    pub async fn exec_exit_code(&self, exec_id: &str) -> DockerResult<Option<i64>> {
        let inspect = self
            .inner()
            .inspect_exec(exec_id)
            .await
            .map_err(|e| DockerError::Container(format!("Failed to inspect exec: {}", e)))?;
        debug!("Exec {} finished with {:?}", exec_id, inspect.exit_code);
        Ok(inspect.exit_code)
    }
}

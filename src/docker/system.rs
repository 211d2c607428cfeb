//! Daemon-level information

use tracing::debug;

use crate::core::{DockerError, DockerSystemInfo};
use crate::docker::{DockerClient, DockerResult};

impl DockerClient {
    /// Combined `docker info` and `docker version` summary
    pub async fn system_info(&self) -> DockerResult<DockerSystemInfo> {
        debug!("Fetching docker system info");

        let info = self
            .inner()
            .info()
            .await
            .map_err(|e| DockerError::Connection(e.to_string()))?;

        let server_version = match info.server_version.clone() {
            Some(version) if !version.is_empty() => version,
            _ => self.version().to_string(),
        };

        Ok(merge_system_info(info, server_version))
    }
}

fn merge_system_info(info: bollard::models::SystemInfo, server_version: String) -> DockerSystemInfo {
    let fallback = DockerSystemInfo::default();
    DockerSystemInfo {
        server_version,
        os: info.operating_system.unwrap_or(fallback.os),
        arch: info.architecture.unwrap_or(fallback.arch),
        kernel_version: info.kernel_version.unwrap_or(fallback.kernel_version),
        ncpu: info.ncpu.unwrap_or(0),
        mem_total: info.mem_total.unwrap_or(0),
        containers: info.containers.unwrap_or(0),
        containers_running: info.containers_running.unwrap_or(0),
        containers_paused: info.containers_paused.unwrap_or(0),
        containers_stopped: info.containers_stopped.unwrap_or(0),
        images: info.images.unwrap_or(0),
    }
}

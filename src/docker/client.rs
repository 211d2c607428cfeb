use std::sync::Arc;

use bollard::Docker;
use tracing::{debug, info, warn};

use crate::core::DockerError;
use crate::docker::DockerResult;

/// Docker client wrapper
#[derive(Clone)]
pub struct DockerClient {
    inner: Arc<Docker>,
    host: String,
    version: String,
}

impl DockerClient {
    /// Create a new client from environment (DOCKER_HOST, etc.)
    pub async fn from_env() -> DockerResult<Self> {
        info!("Creating Docker client from environment");

        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| DockerError::Connection(e.to_string()))?;

        Self::new(docker, "local").await
    }

    /// Create a new client with custom host
    pub async fn with_host(host: &str) -> DockerResult<Self> {
        info!("Creating Docker client with host: {}", host);

        let docker = Docker::connect_with_http(host, 120, bollard::API_DEFAULT_VERSION)
            .map_err(|e| DockerError::Connection(e.to_string()))?;

        Self::new(docker, host).await
    }

    /// Internal constructor; an unreachable daemon still yields a client
    async fn new(docker: Docker, host: &str) -> DockerResult<Self> {
        debug!("Fetching Docker version information");

        let version = match docker.version().await {
            Ok(version) => version.version.unwrap_or_else(|| "unknown".to_string()),
            Err(e) => {
                warn!("Docker daemon at {} did not answer: {}", host, e);
                "unknown".to_string()
            }
        };
        info!("Docker client initialized: {} via {}", version, host);

        Ok(Self {
            inner: Arc::new(docker),
            host: host.to_string(),
            version,
        })
    }

    /// Host description this client was created for
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Engine version reported at connect time
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Ping the Docker daemon
    pub async fn ping(&self) -> DockerResult<String> {
        debug!("Pinging Docker daemon");

        self.inner
            .ping()
            .await
            .map_err(|e| DockerError::Connection(e.to_string()))
    }

    /// Get the inner Docker client (for advanced usage)
    pub fn inner(&self) -> &Docker {
        &self.inner
    }
}

//! Container operations

use bollard::container::{
    ListContainersOptions, RemoveContainerOptions, RestartContainerOptions, StopContainerOptions,
};
use tracing::{debug, info, warn};

use crate::core::{
    ContainerInfo, ContainerState, DockerError, PortInfo, COMPOSE_PROJECT_LABEL,
    COMPOSE_SERVICE_LABEL,
};
use crate::docker::{DockerClient, DockerResult};

impl DockerClient {
    /// List all containers
    pub async fn list_containers(&self, all: bool) -> DockerResult<Vec<ContainerInfo>> {
        debug!("Listing containers (all={})", all);

        let options = ListContainersOptions::<String> {
            all,
            ..Default::default()
        };

        let containers = self
            .inner()
            .list_containers(Some(options))
            .await
            .map_err(|e| DockerError::Container(format!("Failed to list containers: {}", e)))?;

        info!("Found {} containers", containers.len());

        Ok(containers.into_iter().map(ContainerInfo::from).collect())
    }

    /// Start a container
    pub async fn start_container(&self, id: &str) -> DockerResult<()> {
        info!("Starting container: {}", id);

        self.inner()
            .start_container::<String>(id, None)
            .await
            .map_err(|e| DockerError::Container(format!("Failed to start {}: {}", id, e)))?;

        info!("Container {} started successfully", id);
        Ok(())
    }

    /// Stop a container
    pub async fn stop_container(&self, id: &str, timeout: Option<i64>) -> DockerResult<()> {
        let timeout = timeout.unwrap_or(10);
        info!("Stopping container: {} (timeout={}s)", id, timeout);

        let options = StopContainerOptions { t: timeout };

        self.inner()
            .stop_container(id, Some(options))
            .await
            .map_err(|e| DockerError::Container(format!("Failed to stop {}: {}", id, e)))?;

        info!("Container {} stopped successfully", id);
        Ok(())
    }

    /// Restart a container
    pub async fn restart_container(&self, id: &str, timeout: Option<isize>) -> DockerResult<()> {
        let timeout = timeout.unwrap_or(10);
        info!("Restarting container: {} (timeout={}s)", id, timeout);

        let options = RestartContainerOptions { t: timeout };

        self.inner()
            .restart_container(id, Some(options))
            .await
            .map_err(|e| DockerError::Container(format!("Failed to restart {}: {}", id, e)))?;

        info!("Container {} restarted successfully", id);
        Ok(())
    }

    /// Pause a container
    pub async fn pause_container(&self, id: &str) -> DockerResult<()> {
        info!("Pausing container: {}", id);

        self.inner()
            .pause_container(id)
            .await
            .map_err(|e| DockerError::Container(format!("Failed to pause {}: {}", id, e)))?;

        info!("Container {} paused successfully", id);
        Ok(())
    }

    /// Unpause a container
    pub async fn unpause_container(&self, id: &str) -> DockerResult<()> {
        info!("Unpausing container: {}", id);

        self.inner()
            .unpause_container(id)
            .await
            .map_err(|e| DockerError::Container(format!("Failed to unpause {}: {}", id, e)))?;

        info!("Container {} unpaused successfully", id);
        Ok(())
    }

    /// Remove a container
    pub async fn remove_container(&self, id: &str, force: bool) -> DockerResult<()> {
        warn!("Removing container: {} (force={})", id, force);

        let options = RemoveContainerOptions {
            v: false,
            force,
            link: false,
        };

        self.inner()
            .remove_container(id, Some(options))
            .await
            .map_err(|e| DockerError::Container(format!("Failed to remove {}: {}", id, e)))?;

        info!("Container {} removed successfully", id);
        Ok(())
    }

    /// Full inspect document as JSON
    pub async fn inspect_container(&self, id: &str) -> DockerResult<serde_json::Value> {
        debug!("Inspecting container: {}", id);

        let response = self
            .inner()
            .inspect_container(id, None)
            .await
            .map_err(|e| DockerError::Container(format!("Failed to inspect {}: {}", id, e)))?;

        serde_json::to_value(response)
            .map_err(|e| DockerError::Container(format!("Failed to encode inspect output: {}", e)))
    }
}

impl From<bollard::models::ContainerSummary> for ContainerInfo {
    fn from(c: bollard::models::ContainerSummary) -> Self {
        let name = c
            .names
            .as_ref()
            .and_then(|names| names.first())
            .map(|n| n.trim_start_matches('/').to_string())
            .unwrap_or_else(|| "unnamed".to_string());

        let ports = c
            .ports
            .unwrap_or_default()
            .into_iter()
            .map(|p| PortInfo {
                private_port: p.private_port,
                public_port: p.public_port,
                protocol: p
                    .typ
                    .map(|t| t.to_string())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| "tcp".to_string()),
            })
            .collect();

        // Compose project/service drive grouping in the container list
        let labels = c.labels.unwrap_or_default();
        let project = labels.get(COMPOSE_PROJECT_LABEL).cloned();
        let service = labels.get(COMPOSE_SERVICE_LABEL).cloned();

        Self {
            id: c.id.unwrap_or_default(),
            name,
            image: c.image.unwrap_or_default(),
            status: c.status.unwrap_or_default(),
            state: c
                .state
                .as_deref()
                .map(ContainerState::parse)
                .unwrap_or(ContainerState::Unknown),
            created: c.created.unwrap_or(0),
            ports,
            project,
            service,
            labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_summary_conversion() {
        let summary = bollard::models::ContainerSummary {
            id: Some("abc123def456789".to_string()),
            names: Some(vec!["/web".to_string()]),
            image: Some("nginx:latest".to_string()),
            state: Some("running".to_string()),
            status: Some("Up 2 hours".to_string()),
            created: Some(1_700_000_000),
            ports: Some(vec![bollard::models::Port {
                private_port: 80,
                public_port: Some(8080),
                ..Default::default()
            }]),
            labels: Some(HashMap::from([
                (COMPOSE_PROJECT_LABEL.to_string(), "myapp".to_string()),
                (COMPOSE_SERVICE_LABEL.to_string(), "web".to_string()),
            ])),
            ..Default::default()
        };

        let info = ContainerInfo::from(summary);
        assert_eq!(info.name, "web");
        assert_eq!(info.state, ContainerState::Running);
        assert_eq!(info.project.as_deref(), Some("myapp"));
        assert_eq!(info.service.as_deref(), Some("web"));
        assert_eq!(info.ports[0].protocol, "tcp");
        assert_eq!(info.port_summary(), "8080:80");
    }

    #[test]
    fn test_unnamed_container() {
        let info = ContainerInfo::from(bollard::models::ContainerSummary::default());
        assert_eq!(info.name, "unnamed");
        assert_eq!(info.state, ContainerState::Unknown);
        assert!(info.project.is_none());
    }

    // Integration tests require Docker daemon
    #[tokio::test]
    #[ignore = "requires Docker daemon"]
    async fn test_list_containers() {
        let client = DockerClient::from_env().await.unwrap();
        let containers = client.list_containers(true).await;
        assert!(containers.is_ok());
    }
}

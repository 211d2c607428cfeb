//! Volume operations

use bollard::volume::{CreateVolumeOptions, ListVolumesOptions, RemoveVolumeOptions};
use tracing::{debug, info};

use crate::core::{DockerError, VolumeInfo};
use crate::docker::{DockerClient, DockerResult};

impl DockerClient {
    /// List all volumes
    pub async fn list_volumes(&self) -> DockerResult<Vec<VolumeInfo>> {
        debug!("Listing volumes");

        let options = ListVolumesOptions::<String> {
            filters: Default::default(),
        };

        let volumes = self
            .inner()
            .list_volumes(Some(options))
            .await
            .map_err(|e| DockerError::Volume(format!("Failed to list volumes: {}", e)))?;

        let volume_list = volumes.volumes.unwrap_or_default();
        info!("Found {} volumes", volume_list.len());

        Ok(volume_list.into_iter().map(VolumeInfo::from).collect())
    }

    /// Create a named volume with the default driver
    pub async fn create_volume(&self, name: &str) -> DockerResult<VolumeInfo> {
        info!("Creating volume: {}", name);

        let options = CreateVolumeOptions {
            name: name.to_string(),
            ..Default::default()
        };

        let volume = self
            .inner()
            .create_volume(options)
            .await
            .map_err(|e| DockerError::Volume(format!("Failed to create {}: {}", name, e)))?;

        info!("Volume {} created successfully", name);
        Ok(volume.into())
    }

    /// Remove a volume
    pub async fn remove_volume(&self, name: &str, force: bool) -> DockerResult<()> {
        info!("Removing volume: {} (force={})", name, force);

        self.inner()
            .remove_volume(name, Some(RemoveVolumeOptions { force }))
            .await
            .map_err(|e| DockerError::Volume(format!("Failed to remove {}: {}", name, e)))?;

        info!("Volume {} removed successfully", name);
        Ok(())
    }
}

impl From<bollard::models::Volume> for VolumeInfo {
    fn from(v: bollard::models::Volume) -> Self {
        let scope = v
            .scope
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "local".to_string());

        Self {
            name: v.name,
            driver: v.driver,
            mountpoint: v.mountpoint,
            created_at: v.created_at,
            labels: v.labels,
            options: v.options,
            scope,
        }
    }
}

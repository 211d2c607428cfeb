//! Image operations

use bollard::image::{ListImagesOptions, RemoveImageOptions};
use tracing::{debug, info, warn};

use crate::core::{DockerError, ImageInfo};
use crate::docker::{DockerClient, DockerResult};

impl DockerClient {
    /// List all images
    pub async fn list_images(&self, all: bool) -> DockerResult<Vec<ImageInfo>> {
        debug!("Listing images (all={})", all);

        let options = ListImagesOptions::<String> {
            all,
            ..Default::default()
        };

        let images = self
            .inner()
            .list_images(Some(options))
            .await
            .map_err(|e| DockerError::Image(format!("Failed to list images: {}", e)))?;

        info!("Found {} images", images.len());

        Ok(images.into_iter().map(ImageInfo::from).collect())
    }

    /// Remove an image
    pub async fn remove_image(&self, id: &str, force: bool) -> DockerResult<()> {
        if force {
            warn!("Force removing image: {}", id);
        } else {
            info!("Removing image: {}", id);
        }

        let options = RemoveImageOptions {
            force,
            ..Default::default()
        };

        self.inner()
            .remove_image(id, Some(options), None)
            .await
            .map_err(|e| DockerError::Image(format!("Failed to remove {}: {}", id, e)))?;

        info!("Image {} removed successfully", id);
        Ok(())
    }
}

impl From<bollard::models::ImageSummary> for ImageInfo {
    fn from(i: bollard::models::ImageSummary) -> Self {
        Self {
            virtual_size: i.virtual_size.unwrap_or(i.size),
            id: i.id,
            repo_tags: i.repo_tags,
            repo_digests: i.repo_digests,
            created: i.created,
            size: i.size,
            shared_size: i.shared_size,
            labels: i.labels,
            containers: i.containers,
        }
    }
}

//! The boundary between the view layer and the container runtime.
//!
//! Views only ever talk to the runtime through [`Bridge`]. Request/response
//! operations are async methods; streamed log and exec output is pushed
//! through the [`EventHub`] under per-container topics.

pub mod docker;
pub mod events;
pub mod host;
pub mod shell;
pub mod streams;

use async_trait::async_trait;

use crate::core::{
    BridgeResult, ContainerInfo, ContainerStats, DockerSystemInfo, ImageInfo, NetworkInfo,
    SystemStats, TerminalOutput, VolumeInfo,
};

pub use docker::DockerBridge;
pub use events::{EventHub, StreamEvent, Subscription, Topic};

/// Operations the view layer may invoke on the backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Bridge: Send + Sync {
    async fn list_containers(&self) -> BridgeResult<Vec<ContainerInfo>>;
    async fn list_images(&self) -> BridgeResult<Vec<ImageInfo>>;
    async fn list_volumes(&self) -> BridgeResult<Vec<VolumeInfo>>;
    async fn list_networks(&self) -> BridgeResult<Vec<NetworkInfo>>;

    async fn get_container_stats(&self, container_id: &str) -> BridgeResult<ContainerStats>;
    async fn get_system_stats(&self) -> BridgeResult<SystemStats>;
    async fn get_docker_system_info(&self) -> BridgeResult<DockerSystemInfo>;

    async fn start_container(&self, container_id: &str) -> BridgeResult<String>;
    async fn stop_container(&self, container_id: &str) -> BridgeResult<String>;
    async fn restart_container(&self, container_id: &str) -> BridgeResult<String>;
    async fn pause_container(&self, container_id: &str) -> BridgeResult<String>;
    async fn unpause_container(&self, container_id: &str) -> BridgeResult<String>;
    async fn remove_container(&self, container_id: &str, force: bool) -> BridgeResult<String>;

    async fn remove_image(&self, image_id: &str) -> BridgeResult<String>;
    async fn force_remove_image(&self, image_id: &str) -> BridgeResult<String>;

    async fn remove_volume(&self, volume_name: &str) -> BridgeResult<String>;
    async fn create_volume(&self, volume_name: &str) -> BridgeResult<String>;

    async fn remove_network(&self, network_id: &str) -> BridgeResult<String>;

    /// Last `tail` log lines; with `follow` the live stream is started as well
    async fn get_container_logs(
        &self,
        container_id: &str,
        tail: usize,
        follow: bool,
    ) -> BridgeResult<String>;
    async fn start_log_stream(&self, container_id: &str) -> BridgeResult<()>;
    async fn stop_log_stream(&self, container_id: &str) -> BridgeResult<()>;

    async fn inspect_container(&self, container_id: &str) -> BridgeResult<serde_json::Value>;

    /// Pick the shell used for exec sessions in this container
    async fn start_container_shell(&self, container_id: &str) -> BridgeResult<String>;
    /// Run a command inside the container; output arrives as exec events
    async fn exec_container_command(
        &self,
        container_id: &str,
        command: Vec<String>,
    ) -> BridgeResult<()>;

    async fn get_home_directory(&self) -> BridgeResult<String>;
    async fn get_current_directory(&self) -> BridgeResult<String>;
    /// Validate a directory and return its canonical path
    async fn change_directory(&self, path: &str) -> BridgeResult<String>;
    async fn execute_command(
        &self,
        command: &str,
        working_dir: Option<String>,
    ) -> BridgeResult<TerminalOutput>;
    async fn execute_docker_command(
        &self,
        args: Vec<String>,
        working_dir: Option<String>,
    ) -> BridgeResult<TerminalOutput>;
}

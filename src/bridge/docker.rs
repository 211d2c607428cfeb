//! Production bridge backed by the Docker Engine API

use std::sync::Arc;

use async_trait::async_trait;
use bollard::container::LogOutput;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::bridge::host::HostSampler;
use crate::bridge::streams::StreamTasks;
use crate::bridge::{shell, Bridge, EventHub, Topic};
use crate::core::{
    BridgeError, BridgeResult, ContainerInfo, ContainerStats, DockerSystemInfo, ImageInfo,
    NetworkInfo, SystemStats, TerminalOutput, VolumeInfo,
};
use crate::docker::{preferred_shell, DockerClient, DockerResult, ExecRun, LogLine};

pub struct DockerBridge {
    client: DockerClient,
    hub: EventHub,
    log_streams: Arc<StreamTasks>,
    host: Arc<HostSampler>,
}

impl DockerBridge {
    pub fn new(client: DockerClient, hub: EventHub) -> Self {
        Self {
            client,
            hub,
            log_streams: Arc::new(StreamTasks::new()),
            host: Arc::new(HostSampler::new()),
        }
    }

    /// Connect to `host`, or to the local daemon from the environment
    pub async fn connect(host: Option<&str>, hub: EventHub) -> DockerResult<Self> {
        let client = match host {
            Some(host) => DockerClient::with_host(host).await?,
            None => DockerClient::from_env().await?,
        };
        Ok(Self::new(client, hub))
    }

    pub fn client(&self) -> &DockerClient {
        &self.client
    }
}

/// Push every chunk of an exec's output to the hub, then its exit code
async fn pump_exec(client: DockerClient, hub: EventHub, container_id: String, run: ExecRun) {
    let output_topic = Topic::ExecOutput(container_id.clone());
    let error_topic = Topic::ExecError(container_id.clone());

    let mut output = run.output;
    while let Some(chunk) = output.next().await {
        match chunk {
            Ok(LogOutput::StdOut { message }) | Ok(LogOutput::Console { message }) => {
                hub.emit(&output_topic, String::from_utf8_lossy(&message));
            }
            Ok(LogOutput::StdErr { message }) => {
                hub.emit(&error_topic, String::from_utf8_lossy(&message));
            }
            Ok(LogOutput::StdIn { .. }) => {}
            Err(e) => {
                hub.emit(&error_topic, e.to_string());
                break;
            }
        }
    }

    let exit_code = match client.exec_exit_code(&run.exec_id).await {
        Ok(Some(code)) => code.to_string(),
        Ok(None) => String::new(),
        Err(e) => {
            warn!("Could not read exit code for exec {}: {}", run.exec_id, e);
            String::new()
        }
    };
    hub.emit(&Topic::ExecEnded(container_id), exit_code);
}

#[async_trait]
impl Bridge for DockerBridge {
    async fn list_containers(&self) -> BridgeResult<Vec<ContainerInfo>> {
        Ok(self.client.list_containers(true).await?)
    }

    async fn list_images(&self) -> BridgeResult<Vec<ImageInfo>> {
        Ok(self.client.list_images(false).await?)
    }

    async fn list_volumes(&self) -> BridgeResult<Vec<VolumeInfo>> {
        Ok(self.client.list_volumes().await?)
    }

    async fn list_networks(&self) -> BridgeResult<Vec<NetworkInfo>> {
        Ok(self.client.list_networks().await?)
    }

    async fn get_container_stats(&self, container_id: &str) -> BridgeResult<ContainerStats> {
        Ok(self.client.fetch_stats(container_id).await?)
    }

    async fn get_system_stats(&self) -> BridgeResult<SystemStats> {
        let host = Arc::clone(&self.host);
        tokio::task::spawn_blocking(move || host.sample())
            .await
            .map_err(|e| BridgeError::new(format!("Failed to sample host stats: {}", e)))
    }

    async fn get_docker_system_info(&self) -> BridgeResult<DockerSystemInfo> {
        Ok(self.client.system_info().await?)
    }

    async fn start_container(&self, container_id: &str) -> BridgeResult<String> {
        self.client.start_container(container_id).await?;
        Ok(format!("Container {} started successfully", container_id))
    }

    async fn stop_container(&self, container_id: &str) -> BridgeResult<String> {
        self.client.stop_container(container_id, None).await?;
        Ok(format!("Container {} stopped successfully", container_id))
    }

    async fn restart_container(&self, container_id: &str) -> BridgeResult<String> {
        self.client.restart_container(container_id, None).await?;
        Ok(format!("Container {} restarted successfully", container_id))
    }

    async fn pause_container(&self, container_id: &str) -> BridgeResult<String> {
        self.client.pause_container(container_id).await?;
        Ok(format!("Container {} paused successfully", container_id))
    }

    async fn unpause_container(&self, container_id: &str) -> BridgeResult<String> {
        self.client.unpause_container(container_id).await?;
        Ok(format!("Container {} unpaused successfully", container_id))
    }

    async fn remove_container(&self, container_id: &str, force: bool) -> BridgeResult<String> {
        self.log_streams.abort(container_id);
        self.client.remove_container(container_id, force).await?;
        Ok(format!("Container {} removed successfully", container_id))
    }

    async fn remove_image(&self, image_id: &str) -> BridgeResult<String> {
        self.client.remove_image(image_id, false).await?;
        Ok(format!("Image {} removed successfully", image_id))
    }

    async fn force_remove_image(&self, image_id: &str) -> BridgeResult<String> {
        self.client.remove_image(image_id, true).await?;
        Ok(format!("Image {} force removed successfully", image_id))
    }

    async fn remove_volume(&self, volume_name: &str) -> BridgeResult<String> {
        self.client.remove_volume(volume_name, false).await?;
        Ok(format!("Volume {} removed successfully", volume_name))
    }

    async fn create_volume(&self, volume_name: &str) -> BridgeResult<String> {
        let volume = self.client.create_volume(volume_name).await?;
        Ok(format!("Volume {} created successfully", volume.name))
    }

    async fn remove_network(&self, network_id: &str) -> BridgeResult<String> {
        self.client.remove_network(network_id).await?;
        Ok(format!("Network {} removed successfully", network_id))
    }

    async fn get_container_logs(
        &self,
        container_id: &str,
        tail: usize,
        follow: bool,
    ) -> BridgeResult<String> {
        let lines = self.client.fetch_logs(container_id, tail).await?;
        let text = lines
            .iter()
            .map(LogLine::render)
            .collect::<Vec<_>>()
            .join("\n");

        if follow {
            self.start_log_stream(container_id).await?;
        }
        Ok(text)
    }

    async fn start_log_stream(&self, container_id: &str) -> BridgeResult<()> {
        info!("Starting log stream for {}", container_id);

        let client = self.client.clone();
        let hub = self.hub.clone();
        let id = container_id.to_string();

        let handle = tokio::spawn(async move {
            let line_topic = Topic::LogStream(id.clone());
            let mut stream = Box::pin(client.follow_logs(&id));

            while let Some(item) = stream.next().await {
                match item {
                    Ok(line) => {
                        hub.emit(&line_topic, line.render());
                    }
                    Err(e) => {
                        hub.emit(&Topic::LogStreamError(id.clone()), e.to_string());
                        break;
                    }
                }
            }

            debug!("Log stream for {} ended", id);
            hub.emit(&Topic::LogStreamEnded(id.clone()), "");
        });

        self.log_streams.insert(container_id, handle);
        Ok(())
    }

    async fn stop_log_stream(&self, container_id: &str) -> BridgeResult<()> {
        if self.log_streams.abort(container_id) {
            info!("Stopped log stream for {}", container_id);
        }
        Ok(())
    }

    async fn inspect_container(&self, container_id: &str) -> BridgeResult<serde_json::Value> {
        Ok(self.client.inspect_container(container_id).await?)
    }

    async fn start_container_shell(&self, container_id: &str) -> BridgeResult<String> {
        let defaults = self.client.exec_defaults(container_id).await?;
        if !defaults.running {
            return Err(BridgeError::new(format!(
                "Container {} is not running",
                defaults.container_name
            )));
        }

        let shell = preferred_shell(&defaults.entrypoint, &defaults.cmd);
        info!("Using {} for exec in {}", shell, defaults.container_name);
        Ok(shell)
    }

    async fn exec_container_command(
        &self,
        container_id: &str,
        command: Vec<String>,
    ) -> BridgeResult<()> {
        if command.is_empty() {
            return Err(BridgeError::new("Empty command"));
        }

        let run = self.client.run_exec(container_id, command).await?;
        tokio::spawn(pump_exec(
            self.client.clone(),
            self.hub.clone(),
            container_id.to_string(),
            run,
        ));
        Ok(())
    }

    async fn get_home_directory(&self) -> BridgeResult<String> {
        shell::home_directory()
    }

    async fn get_current_directory(&self) -> BridgeResult<String> {
        shell::current_directory()
    }

    async fn change_directory(&self, path: &str) -> BridgeResult<String> {
        shell::change_directory(path).await
    }

    async fn execute_command(
        &self,
        command: &str,
        working_dir: Option<String>,
    ) -> BridgeResult<TerminalOutput> {
        shell::execute_command(command, working_dir.as_deref()).await
    }

    async fn execute_docker_command(
        &self,
        args: Vec<String>,
        working_dir: Option<String>,
    ) -> BridgeResult<TerminalOutput> {
        shell::execute_docker_command(&args, working_dir.as_deref()).await
    }
}

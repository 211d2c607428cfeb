use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};

use dockdeck::bridge::Bridge;
use dockdeck::controller::{perform, Request};
use dockdeck::core::{
    BridgeError, BridgeResult, ContainerInfo, ContainerStats, DockerSystemInfo, ImageInfo,
    NetworkInfo, SystemStats, TerminalOutput, VolumeInfo,
};
use dockdeck::ui::UiApp;

/// In-memory backend that records every call it receives
#[derive(Default)]
pub struct FakeBridge {
    pub containers: Mutex<Vec<ContainerInfo>>,
    pub images: Mutex<Vec<ImageInfo>>,
    pub volumes: Mutex<Vec<VolumeInfo>>,
    pub networks: Mutex<Vec<NetworkInfo>>,
    /// Queued list failures, consumed one per call
    pub list_failures: Mutex<VecDeque<String>>,
    /// Removal failures keyed by id or name
    pub remove_failures: Mutex<HashMap<String, String>>,
    pub calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeBridge {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    fn list<T: Clone>(&self, name: &str, items: &Mutex<Vec<T>>) -> BridgeResult<Vec<T>> {
        self.record(name);
        if let Some(message) = self.list_failures.lock().unwrap().pop_front() {
            return Err(BridgeError::new(message));
        }
        Ok(items.lock().unwrap().clone())
    }

    fn remove(&self, call: &str, key: &str) -> BridgeResult<String> {
        self.record(format!("{} {}", call, key));
        match self.remove_failures.lock().unwrap().get(key) {
            Some(message) => Err(BridgeError::new(message.clone())),
            None => Ok(key.to_string()),
        }
    }

    fn ok(&self, call: &str, key: &str) -> BridgeResult<String> {
        self.record(format!("{} {}", call, key));
        Ok(key.to_string())
    }
}

#[async_trait]
impl Bridge for FakeBridge {
    async fn list_containers(&self) -> BridgeResult<Vec<ContainerInfo>> {
        self.list("list_containers", &self.containers)
    }

    async fn list_images(&self) -> BridgeResult<Vec<ImageInfo>> {
        self.list("list_images", &self.images)
    }

    async fn list_volumes(&self) -> BridgeResult<Vec<VolumeInfo>> {
        self.list("list_volumes", &self.volumes)
    }

    async fn list_networks(&self) -> BridgeResult<Vec<NetworkInfo>> {
        self.list("list_networks", &self.networks)
    }

    async fn get_container_stats(&self, container_id: &str) -> BridgeResult<ContainerStats> {
        self.record(format!("get_container_stats {}", container_id));
        Ok(ContainerStats::default())
    }

    async fn get_system_stats(&self) -> BridgeResult<SystemStats> {
        self.record("get_system_stats");
        Ok(SystemStats::default())
    }

    async fn get_docker_system_info(&self) -> BridgeResult<DockerSystemInfo> {
        self.record("get_docker_system_info");
        Ok(DockerSystemInfo::default())
    }

    async fn start_container(&self, container_id: &str) -> BridgeResult<String> {
        self.ok("start_container", container_id)
    }

    async fn stop_container(&self, container_id: &str) -> BridgeResult<String> {
        self.ok("stop_container", container_id)
    }

    async fn restart_container(&self, container_id: &str) -> BridgeResult<String> {
        self.ok("restart_container", container_id)
    }

    async fn pause_container(&self, container_id: &str) -> BridgeResult<String> {
        self.ok("pause_container", container_id)
    }

    async fn unpause_container(&self, container_id: &str) -> BridgeResult<String> {
        self.ok("unpause_container", container_id)
    }

    async fn remove_container(&self, container_id: &str, force: bool) -> BridgeResult<String> {
        self.remove(&format!("remove_container force={}", force), container_id)
    }

    async fn remove_image(&self, image_id: &str) -> BridgeResult<String> {
        self.remove("remove_image", image_id)
    }

    async fn force_remove_image(&self, image_id: &str) -> BridgeResult<String> {
        self.ok("force_remove_image", image_id)
    }

    async fn remove_volume(&self, volume_name: &str) -> BridgeResult<String> {
        self.remove("remove_volume", volume_name)
    }

    async fn create_volume(&self, volume_name: &str) -> BridgeResult<String> {
        self.volumes.lock().unwrap().push(VolumeInfo {
            name: volume_name.to_string(),
            driver: "local".to_string(),
            ..Default::default()
        });
        self.ok("create_volume", volume_name)
    }

    async fn remove_network(&self, network_id: &str) -> BridgeResult<String> {
        self.remove("remove_network", network_id)
    }

    async fn get_container_logs(
        &self,
        container_id: &str,
        tail: usize,
        follow: bool,
    ) -> BridgeResult<String> {
        self.record(format!("get_container_logs {} {} {}", container_id, tail, follow));
        Ok("2024-01-01T00:00:00Z first\n".to_string())
    }

    async fn start_log_stream(&self, container_id: &str) -> BridgeResult<()> {
        self.record(format!("start_log_stream {}", container_id));
        Ok(())
    }

    async fn stop_log_stream(&self, container_id: &str) -> BridgeResult<()> {
        self.record(format!("stop_log_stream {}", container_id));
        Ok(())
    }

    async fn inspect_container(&self, container_id: &str) -> BridgeResult<serde_json::Value> {
        self.record(format!("inspect_container {}", container_id));
        Ok(serde_json::json!({ "Id": container_id }))
    }

    async fn start_container_shell(&self, container_id: &str) -> BridgeResult<String> {
        self.record(format!("start_container_shell {}", container_id));
        Ok("/bin/sh".to_string())
    }

    async fn exec_container_command(
        &self,
        container_id: &str,
        command: Vec<String>,
    ) -> BridgeResult<()> {
        self.record(format!("exec_container_command {} {}", container_id, command.join(" ")));
        Ok(())
    }

    async fn get_home_directory(&self) -> BridgeResult<String> {
        Ok("/home/dev".to_string())
    }

    async fn get_current_directory(&self) -> BridgeResult<String> {
        Ok("/work".to_string())
    }

    async fn change_directory(&self, path: &str) -> BridgeResult<String> {
        self.record(format!("change_directory {}", path));
        Ok(path.to_string())
    }

    async fn execute_command(
        &self,
        command: &str,
        working_dir: Option<String>,
    ) -> BridgeResult<TerminalOutput> {
        self.record(format!(
            "execute_command {} in {}",
            command,
            working_dir.unwrap_or_default()
        ));
        Ok(TerminalOutput {
            stdout: format!("ran {}\n", command),
            exit_code: Some(0),
            success: true,
            ..Default::default()
        })
    }

    async fn execute_docker_command(
        &self,
        args: Vec<String>,
        _working_dir: Option<String>,
    ) -> BridgeResult<TerminalOutput> {
        self.record(format!("execute_docker_command {}", args.join(" ")));
        Ok(TerminalOutput::default())
    }
}

/// Run requests and every follow-up they trigger until nothing is left
#[allow(dead_code)]
pub async fn drive(app: &mut UiApp, bridge: &Arc<FakeBridge>, requests: Vec<Request>) {
    let bridge: Arc<dyn Bridge> = bridge.clone();
    let mut queue: VecDeque<Request> = requests.into();
    while let Some(request) = queue.pop_front() {
        if let Some(event) = perform(Arc::clone(&bridge), request).await {
            queue.extend(app.state.apply(event));
        }
    }
}

/// Press a key and run whatever it asked of the bridge
#[allow(dead_code)]
pub async fn press(app: &mut UiApp, bridge: &Arc<FakeBridge>, code: KeyCode) {
    press_with(app, bridge, code, KeyModifiers::NONE).await
}

#[allow(dead_code)]
pub async fn press_with(
    app: &mut UiApp,
    bridge: &Arc<FakeBridge>,
    code: KeyCode,
    modifiers: KeyModifiers,
) {
    let requests = app.handle_event(Event::Key(KeyEvent::new(code, modifiers)));
    drive(app, bridge, requests).await;
}

#[allow(dead_code)]
pub async fn type_text(app: &mut UiApp, bridge: &Arc<FakeBridge>, text: &str) {
    for c in text.chars() {
        press(app, bridge, KeyCode::Char(c)).await;
    }
}

/// Render the app to a TestBackend and capture output as a string
#[allow(dead_code)]
pub fn render_app(app: &UiApp, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| app.draw(frame)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    let mut output = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            output.push_str(buffer[(x, y)].symbol());
        }
        output.push('\n');
    }
    output
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::{
    ConfirmDialog, InputDialog, InputPurpose, Modal, NotificationLevel, ResourceKind, Tab,
};

/// Label docker compose puts on every container it starts
pub const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";
/// Label carrying the compose service name
pub const COMPOSE_SERVICE_LABEL: &str = "com.docker.compose.service";

/// Tag the engine reports for untagged images
pub const UNTAGGED: &str = "<none>:<none>";

/// Networks managed by the runtime itself
pub const SYSTEM_NETWORKS: [&str; 3] = ["bridge", "host", "none"];

/// Port mapping information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    pub private_port: u16,
    pub public_port: Option<u16>,
    pub protocol: String,
}

impl PortInfo {
    /// Render as `public:private`, or the bare private port when unpublished
    pub fn mapping(&self) -> String {
        match self.public_port {
            Some(public) => format!("{}:{}", public, self.private_port),
            None => self.private_port.to_string(),
        }
    }
}

/// Container runtime state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    Unknown,
}

impl ContainerState {
    /// Parse the engine's state string; anything unrecognised is `Unknown`
    pub fn parse(state: &str) -> Self {
        match state.to_ascii_lowercase().as_str() {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "removing" => ContainerState::Removing,
            "exited" => ContainerState::Exited,
            "dead" => ContainerState::Dead,
            _ => ContainerState::Unknown,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ContainerState::Running)
    }
}

impl std::fmt::Display for ContainerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContainerState::Created => "created",
            ContainerState::Running => "running",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Removing => "removing",
            ContainerState::Exited => "exited",
            ContainerState::Dead => "dead",
            ContainerState::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Container as returned by `list_containers`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub image: String,
    pub status: String,
    pub state: ContainerState,
    pub created: i64,
    pub ports: Vec<PortInfo>,
    pub project: Option<String>,
    pub service: Option<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl Default for ContainerInfo {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            image: String::new(),
            status: String::new(),
            state: ContainerState::Unknown,
            created: 0,
            ports: vec![],
            project: None,
            service: None,
            labels: HashMap::new(),
        }
    }
}

impl ContainerInfo {
    /// First 12 characters of the id, as the docker CLI prints it
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    /// Port mappings joined for table display
    pub fn port_summary(&self) -> String {
        if self.ports.is_empty() {
            return "-".to_string();
        }
        self.ports
            .iter()
            .map(PortInfo::mapping)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Image as returned by `list_images`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub id: String,
    pub repo_tags: Vec<String>,
    #[serde(default)]
    pub repo_digests: Vec<String>,
    pub created: i64,
    pub size: i64,
    pub virtual_size: i64,
    #[serde(default)]
    pub shared_size: i64,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub containers: i64,
}

impl ImageInfo {
    /// Untagged images carry no tag or only the `<none>:<none>` sentinel
    pub fn is_dangling(&self) -> bool {
        self.repo_tags.is_empty() || self.repo_tags.iter().all(|t| t == UNTAGGED)
    }

    /// The first real tag, or `<none>` for dangling images
    pub fn display_tag(&self) -> String {
        self.repo_tags
            .iter()
            .find(|t| t.as_str() != UNTAGGED)
            .cloned()
            .unwrap_or_else(|| "<none>".to_string())
    }

    /// Image id without the `sha256:` prefix, truncated to 12 characters
    pub fn short_id(&self) -> &str {
        short_id(self.id.trim_start_matches("sha256:"))
    }
}

/// Volume as returned by `list_volumes`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub name: String,
    pub driver: String,
    pub mountpoint: String,
    pub created_at: Option<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub options: HashMap<String, String>,
    pub scope: String,
}

/// IPAM settings of a network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkIpam {
    pub driver: Option<String>,
    pub config: Vec<IpamConfig>,
    #[serde(default)]
    pub options: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpamConfig {
    pub subnet: Option<String>,
    pub gateway: Option<String>,
    pub ip_range: Option<String>,
}

/// Endpoint of a container attached to a network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkContainer {
    pub name: Option<String>,
    pub endpoint_id: Option<String>,
    pub mac_address: Option<String>,
    pub ipv4_address: Option<String>,
    pub ipv6_address: Option<String>,
}

/// Network as returned by `list_networks`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub id: String,
    pub name: String,
    pub driver: String,
    pub scope: String,
    pub created: Option<String>,
    pub internal: bool,
    pub attachable: bool,
    pub ingress: bool,
    pub ipam: NetworkIpam,
    #[serde(default)]
    pub containers: HashMap<String, NetworkContainer>,
    #[serde(default)]
    pub options: HashMap<String, String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl NetworkInfo {
    /// `bridge`, `host` and `none` belong to the runtime and are never removable
    pub fn is_system(&self) -> bool {
        is_system_network(&self.name)
    }

    pub fn subnet(&self) -> Option<&str> {
        self.ipam.config.iter().find_map(|c| c.subnet.as_deref())
    }

    pub fn gateway(&self) -> Option<&str> {
        self.ipam.config.iter().find_map(|c| c.gateway.as_deref())
    }
}

pub fn is_system_network(name: &str) -> bool {
    SYSTEM_NETWORKS.contains(&name)
}

/// One stats sample for a single container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerStats {
    pub cpu_percentage: f64,
    pub memory_usage: u64,
    pub memory_limit: u64,
    pub memory_percentage: f64,
    pub network_rx: u64,
    pub network_tx: u64,
    pub block_read: u64,
    pub block_write: u64,
    pub pids: u64,
}

/// Host-wide resource sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub cpu_percentage: f64,
    pub cpu_count: usize,
    pub memory_used: u64,
    pub memory_total: u64,
    pub disk_used: u64,
    pub disk_total: u64,
}

impl SystemStats {
    pub fn memory_percentage(&self) -> f64 {
        if self.memory_total == 0 {
            0.0
        } else {
            self.memory_used as f64 / self.memory_total as f64 * 100.0
        }
    }
}

/// Daemon information from `docker info`/`docker version`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerSystemInfo {
    pub server_version: String,
    pub os: String,
    pub arch: String,
    pub kernel_version: String,
    pub ncpu: i64,
    pub mem_total: i64,
    pub containers: i64,
    pub containers_running: i64,
    pub containers_paused: i64,
    pub containers_stopped: i64,
    pub images: i64,
}

impl Default for DockerSystemInfo {
    fn default() -> Self {
        Self {
            server_version: "unknown".to_string(),
            os: "unknown".to_string(),
            arch: "unknown".to_string(),
            kernel_version: "unknown".to_string(),
            ncpu: 0,
            mem_total: 0,
            containers: 0,
            containers_running: 0,
            containers_paused: 0,
            containers_stopped: 0,
            images: 0,
        }
    }
}

/// Captured result of a terminal command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub success: bool,
}

impl TerminalOutput {
    /// Output produced client-side without touching the bridge
    pub fn local(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
            success: true,
        }
    }

    pub fn local_error(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(1),
            success: false,
        }
    }
}

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(12) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_state_parse() {
        assert_eq!(ContainerState::parse("running"), ContainerState::Running);
        assert_eq!(ContainerState::parse("Exited"), ContainerState::Exited);
        assert_eq!(ContainerState::parse("paused"), ContainerState::Paused);
        assert_eq!(ContainerState::parse("weird"), ContainerState::Unknown);
    }

    #[test]
    fn test_port_mapping() {
        let published = PortInfo {
            private_port: 80,
            public_port: Some(8080),
            protocol: "tcp".to_string(),
        };
        let internal = PortInfo {
            private_port: 5432,
            public_port: None,
            protocol: "tcp".to_string(),
        };
        assert_eq!(published.mapping(), "8080:80");
        assert_eq!(internal.mapping(), "5432");

        let container = ContainerInfo {
            ports: vec![published, internal],
            ..Default::default()
        };
        assert_eq!(container.port_summary(), "8080:80, 5432");
        assert_eq!(ContainerInfo::default().port_summary(), "-");
    }

    #[test]
    fn test_dangling_images() {
        let tagged = ImageInfo {
            repo_tags: vec!["nginx:latest".to_string()],
            ..Default::default()
        };
        let sentinel = ImageInfo {
            repo_tags: vec![UNTAGGED.to_string()],
            ..Default::default()
        };
        assert!(!tagged.is_dangling());
        assert!(sentinel.is_dangling());
        assert!(ImageInfo::default().is_dangling());
        assert_eq!(tagged.display_tag(), "nginx:latest");
        assert_eq!(sentinel.display_tag(), "<none>");
    }

    #[test]
    fn test_short_ids() {
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id("0123456789abcdef"), "0123456789ab");

        let image = ImageInfo {
            id: "sha256:0123456789abcdef".to_string(),
            ..Default::default()
        };
        assert_eq!(image.short_id(), "0123456789ab");
    }

    #[test]
    fn test_system_networks() {
        for name in ["bridge", "host", "none"] {
            assert!(is_system_network(name));
        }
        assert!(!is_system_network("myapp_default"));
    }
}

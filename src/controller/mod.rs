//! Executes view requests against the bridge.
//!
//! State code never awaits. It returns [`Request`]s; the app loop spawns
//! [`perform`] for each one and feeds the resulting [`AppEvent`] back into
//! the state on the UI thread.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bridge::Bridge;
use crate::core::{
    describe_failure, is_system_network, BridgeError, BridgeResult, ContainerInfo,
    ContainerStats, DockerSystemInfo, ImageInfo, NetworkInfo, Rejection,
    ResourceKind, SystemStats, TerminalOutput, VolumeInfo,
};
use crate::state::confirm::RemovalTarget;
use crate::state::list::LoadTicket;
use crate::state::terminal::TerminalRequest;

/// Lifecycle operations on a single container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerAction {
    Start,
    Stop,
    Restart,
    Pause,
    Unpause,
}

impl ContainerAction {
    pub fn verb(&self) -> &'static str {
        match self {
            ContainerAction::Start => "start",
            ContainerAction::Stop => "stop",
            ContainerAction::Restart => "restart",
            ContainerAction::Pause => "pause",
            ContainerAction::Unpause => "unpause",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            ContainerAction::Start => "started",
            ContainerAction::Stop => "stopped",
            ContainerAction::Restart => "restarted",
            ContainerAction::Pause => "paused",
            ContainerAction::Unpause => "unpaused",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTarget {
    pub key: String,
    pub name: String,
}

impl ActionTarget {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

impl From<&ContainerInfo> for ActionTarget {
    fn from(container: &ContainerInfo) -> Self {
        Self::new(&container.id, &container.name)
    }
}

impl From<&RemovalTarget> for ActionTarget {
    fn from(target: &RemovalTarget) -> Self {
        Self::new(&target.key, &target.name)
    }
}

/// Work the state asks the loop to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    LoadContainers(LoadTicket),
    LoadImages(LoadTicket),
    LoadVolumes(LoadTicket),
    LoadNetworks(LoadTicket),
    ContainerStats(String),
    SystemStats,
    SystemInfo,
    /// One call per target, run concurrently
    Lifecycle {
        action: ContainerAction,
        targets: Vec<ActionTarget>,
    },
    Remove {
        kind: ResourceKind,
        targets: Vec<RemovalTarget>,
    },
    ForceRemoveImage(RemovalTarget),
    CreateVolume(String),
    Inspect {
        id: String,
        name: String,
    },
    /// Backlog only; following starts once it has been shown
    LoadLogs {
        id: String,
        tail: usize,
    },
    FollowLogs(String),
    StopLogs(String),
    StartShell(String),
    Exec {
        id: String,
        command: Vec<String>,
    },
    Terminal(TerminalRequest),
    /// Starting directory for new terminal sessions
    WorkingDirectory,
}

/// A finished request, applied by `AppState::apply`
#[derive(Debug, Clone)]
pub enum AppEvent {
    ContainersLoaded(LoadTicket, BridgeResult<Vec<ContainerInfo>>),
    ImagesLoaded(LoadTicket, BridgeResult<Vec<ImageInfo>>),
    VolumesLoaded(LoadTicket, BridgeResult<Vec<VolumeInfo>>),
    NetworksLoaded(LoadTicket, BridgeResult<Vec<NetworkInfo>>),
    StatsLoaded {
        id: String,
        result: BridgeResult<ContainerStats>,
    },
    SystemStatsLoaded(BridgeResult<SystemStats>),
    SystemInfoLoaded(BridgeResult<DockerSystemInfo>),
    ActionFinished(ActionReport),
    Inspected {
        name: String,
        result: BridgeResult<serde_json::Value>,
    },
    LogsLoaded {
        id: String,
        result: BridgeResult<String>,
    },
    FollowStarted {
        id: String,
        result: BridgeResult<()>,
    },
    ShellStarted {
        id: String,
        result: BridgeResult<String>,
    },
    ExecSent {
        id: String,
        result: BridgeResult<()>,
    },
    DirectoryChanged {
        session: Uuid,
        entry: Uuid,
        result: BridgeResult<String>,
    },
    CommandFinished {
        session: Uuid,
        entry: Uuid,
        result: BridgeResult<TerminalOutput>,
    },
    WorkingDirectoryResolved(BridgeResult<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFailure {
    pub target: ActionTarget,
    pub error: BridgeError,
}

/// Outcome of one user action over one or more targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub kind: ResourceKind,
    pub verb: &'static str,
    pub past_tense: &'static str,
    pub succeeded: Vec<ActionTarget>,
    pub failed: Vec<ActionFailure>,
    /// Set for the follow-up force removal of an image
    pub forced: bool,
}

impl ActionReport {
    fn collect(
        kind: ResourceKind,
        verb: &'static str,
        past_tense: &'static str,
        targets: Vec<ActionTarget>,
        results: Vec<BridgeResult<String>>,
    ) -> Self {
        let mut report = Self {
            kind,
            verb,
            past_tense,
            succeeded: Vec::new(),
            failed: Vec::new(),
            forced: false,
        };
        for (target, result) in targets.into_iter().zip(results) {
            match result {
                Ok(message) => {
                    debug!("{}", message);
                    report.succeeded.push(target);
                }
                Err(error) => {
                    warn!("Failed to {} {} {}: {}", verb, kind, target.key, error);
                    report.failed.push(ActionFailure { target, error });
                }
            }
        }
        report
    }

    /// Every key the action touched, succeeded or not
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.succeeded
            .iter()
            .map(|t| t.key.as_str())
            .chain(self.failed.iter().map(|f| f.target.key.as_str()))
    }

    pub fn any_succeeded(&self) -> bool {
        !self.succeeded.is_empty()
    }

    /// Notification text for the successful part, e.g. `Removed volume 'data'`
    pub fn summary(&self) -> Option<String> {
        let past = capitalize(self.past_tense);
        match self.succeeded.as_slice() {
            [] => None,
            [single] => Some(format!("{} {} '{}'", past, self.kind, single.name)),
            many => Some(format!("{} {} {}s", past, many.len(), self.kind)),
        }
    }

    /// Modal text for the failed part: raw messages plus remediation hints
    pub fn failure_message(&self) -> Option<String> {
        let mut text = match self.failed.as_slice() {
            [] => return None,
            [single] => format!(
                "Failed to {} {} '{}': {}",
                self.verb,
                self.kind,
                single.target.name,
                single.error.message()
            ),
            many => {
                let total = many.len() + self.succeeded.len();
                let mut text = format!(
                    "Failed to {} {} of {} {}s:",
                    self.verb,
                    many.len(),
                    total,
                    self.kind
                );
                for failure in many {
                    text.push_str(&format!("\n  {}: {}", failure.target.name, failure.error.message()));
                }
                text
            }
        };

        let mut hints: Vec<&'static str> = Vec::new();
        for hint in self.failed.iter().filter_map(|f| f.error.kind().hint()) {
            if !hints.contains(&hint) {
                hints.push(hint);
            }
        }
        for hint in hints {
            text.push_str("\n\n");
            text.push_str(hint);
        }
        Some(text)
    }

    /// The single failure, when exactly one target failed
    pub fn sole_failure(&self) -> Option<&ActionFailure> {
        match self.failed.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

async fn container_action(bridge: &dyn Bridge, action: ContainerAction, id: &str) -> BridgeResult<String> {
    match action {
        ContainerAction::Start => bridge.start_container(id).await,
        ContainerAction::Stop => bridge.stop_container(id).await,
        ContainerAction::Restart => bridge.restart_container(id).await,
        ContainerAction::Pause => bridge.pause_container(id).await,
        ContainerAction::Unpause => bridge.unpause_container(id).await,
    }
}

/// Apply a lifecycle action to every target concurrently.
///
/// A failing target never stops the others; every outcome ends up in the
/// report.
pub async fn run_container_action(
    bridge: &dyn Bridge,
    action: ContainerAction,
    targets: Vec<ActionTarget>,
) -> ActionReport {
    info!("{} {} container(s)", action.verb(), targets.len());
    let results = join_all(
        targets
            .iter()
            .map(|target| container_action(bridge, action, &target.key)),
    )
    .await;
    ActionReport::collect(
        ResourceKind::Container,
        action.verb(),
        action.past_tense(),
        targets,
        results,
    )
}

async fn remove_one(bridge: &dyn Bridge, kind: ResourceKind, target: &RemovalTarget) -> BridgeResult<String> {
    match kind {
        ResourceKind::Container => bridge.remove_container(&target.key, target.force).await,
        ResourceKind::Image if target.force => bridge.force_remove_image(&target.key).await,
        ResourceKind::Image => bridge.remove_image(&target.key).await,
        ResourceKind::Volume => bridge.remove_volume(&target.key).await,
        ResourceKind::Network if is_system_network(&target.name) => {
            Err(BridgeError::new(
                Rejection::SystemNetwork {
                    name: target.name.clone(),
                }
                .to_string(),
            ))
        }
        ResourceKind::Network => bridge.remove_network(&target.key).await,
    }
}

/// Remove every target concurrently
pub async fn run_removal(
    bridge: &dyn Bridge,
    kind: ResourceKind,
    targets: Vec<RemovalTarget>,
) -> ActionReport {
    info!("Removing {} {}(s)", targets.len(), kind);
    let forced = kind == ResourceKind::Image && targets.iter().all(|t| t.force);
    let results = join_all(targets.iter().map(|target| remove_one(bridge, kind, target))).await;
    let mut report = ActionReport::collect(
        kind,
        "remove",
        "removed",
        targets.iter().map(ActionTarget::from).collect(),
        results,
    );
    report.forced = forced;
    report
}

/// Run one request to completion.
///
/// Returns `None` for fire-and-forget requests whose outcome the state does
/// not need.
pub async fn perform(bridge: Arc<dyn Bridge>, request: Request) -> Option<AppEvent> {
    let bridge = bridge.as_ref();
    let event = match request {
        Request::LoadContainers(ticket) => {
            AppEvent::ContainersLoaded(ticket, bridge.list_containers().await)
        }
        Request::LoadImages(ticket) => AppEvent::ImagesLoaded(ticket, bridge.list_images().await),
        Request::LoadVolumes(ticket) => {
            AppEvent::VolumesLoaded(ticket, bridge.list_volumes().await)
        }
        Request::LoadNetworks(ticket) => {
            AppEvent::NetworksLoaded(ticket, bridge.list_networks().await)
        }
        Request::ContainerStats(id) => {
            let result = bridge.get_container_stats(&id).await;
            AppEvent::StatsLoaded { id, result }
        }
        Request::SystemStats => AppEvent::SystemStatsLoaded(bridge.get_system_stats().await),
        Request::SystemInfo => AppEvent::SystemInfoLoaded(bridge.get_docker_system_info().await),
        Request::Lifecycle { action, targets } => {
            AppEvent::ActionFinished(run_container_action(bridge, action, targets).await)
        }
        Request::Remove { kind, targets } => {
            AppEvent::ActionFinished(run_removal(bridge, kind, targets).await)
        }
        Request::ForceRemoveImage(target) => {
            let target = RemovalTarget {
                force: true,
                ..target
            };
            AppEvent::ActionFinished(run_removal(bridge, ResourceKind::Image, vec![target]).await)
        }
        Request::CreateVolume(name) => {
            let result = bridge.create_volume(&name).await;
            AppEvent::ActionFinished(ActionReport::collect(
                ResourceKind::Volume,
                "create",
                "created",
                vec![ActionTarget::new(&name, &name)],
                vec![result],
            ))
        }
        Request::Inspect { id, name } => AppEvent::Inspected {
            name,
            result: bridge.inspect_container(&id).await,
        },
        Request::LoadLogs { id, tail } => {
            let result = bridge.get_container_logs(&id, tail, false).await;
            AppEvent::LogsLoaded { id, result }
        }
        Request::FollowLogs(id) => {
            let result = bridge.start_log_stream(&id).await;
            AppEvent::FollowStarted { id, result }
        }
        Request::StopLogs(id) => {
            if let Err(e) = bridge.stop_log_stream(&id).await {
                debug!("Stopping log stream for {} failed: {}", id, e);
            }
            return None;
        }
        Request::StartShell(id) => {
            let result = bridge.start_container_shell(&id).await;
            AppEvent::ShellStarted { id, result }
        }
        Request::Exec { id, command } => {
            let result = bridge.exec_container_command(&id, command).await;
            AppEvent::ExecSent { id, result }
        }
        Request::Terminal(request) => perform_terminal(bridge, request).await,
        Request::WorkingDirectory => {
            let result = match bridge.get_current_directory().await {
                Ok(dir) => Ok(dir),
                Err(e) => {
                    debug!("Current directory unavailable ({}), using home", e);
                    bridge.get_home_directory().await
                }
            };
            AppEvent::WorkingDirectoryResolved(result)
        }
    };
    Some(event)
}

async fn perform_terminal(bridge: &dyn Bridge, request: TerminalRequest) -> AppEvent {
    match request {
        TerminalRequest::ChangeDirectory {
            session,
            entry,
            path,
        } => AppEvent::DirectoryChanged {
            session,
            entry,
            result: bridge.change_directory(&path).await,
        },
        TerminalRequest::Execute {
            session,
            entry,
            command,
            cwd,
        } => AppEvent::CommandFinished {
            session,
            entry,
            result: bridge.execute_command(&command, Some(cwd)).await,
        },
        TerminalRequest::Docker {
            session,
            entry,
            args,
            cwd,
        } => AppEvent::CommandFinished {
            session,
            entry,
            result: bridge.execute_docker_command(args, Some(cwd)).await,
        },
    }
}

/// Hint-bearing text for a failure outside any action report
pub fn explain(error: &BridgeError) -> String {
    describe_failure(error.message())
}

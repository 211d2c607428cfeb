//! Per-container stats samples and host-wide figures

use std::collections::{HashMap, HashSet};

use crate::core::{ContainerInfo, ContainerStats, DockerSystemInfo, SystemStats};

#[derive(Debug, Clone, Default)]
pub struct StatsStore {
    samples: HashMap<String, ContainerStats>,
    pub system: Option<SystemStats>,
    pub docker_info: Option<DockerSystemInfo>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples may arrive for containers the list has not caught up with yet
    pub fn record(&mut self, container_id: &str, stats: ContainerStats) {
        self.samples.insert(container_id.to_string(), stats);
    }

    /// Only containers listed as running have visible stats
    pub fn for_container(&self, container: &ContainerInfo) -> Option<&ContainerStats> {
        if container.state.is_running() {
            self.samples.get(&container.id)
        } else {
            None
        }
    }

    /// Keep samples only for containers the list reports as running
    pub fn prune(&mut self, containers: &[ContainerInfo]) {
        let running: HashSet<&str> = containers
            .iter()
            .filter(|c| c.state.is_running())
            .map(|c| c.id.as_str())
            .collect();
        self.samples.retain(|id, _| running.contains(id.as_str()));
    }

    pub fn set_system(&mut self, stats: SystemStats) {
        self.system = Some(stats);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ContainerState;

    fn container(id: &str, state: ContainerState) -> ContainerInfo {
        ContainerInfo {
            id: id.to_string(),
            name: id.to_string(),
            state,
            ..Default::default()
        }
    }

    #[test]
    fn test_stats_hidden_unless_running() {
        let mut store = StatsStore::new();
        store.record("web", ContainerStats { pids: 4, ..Default::default() });

        let running = container("web", ContainerState::Running);
        let stopped = container("web", ContainerState::Exited);
        assert_eq!(store.for_container(&running).map(|s| s.pids), Some(4));
        assert!(store.for_container(&stopped).is_none());
    }

    #[test]
    fn test_prune_drops_vanished_and_stopped() {
        let mut store = StatsStore::new();
        store.record("web", ContainerStats::default());
        store.record("db", ContainerStats::default());
        store.record("gone", ContainerStats::default());

        store.prune(&[
            container("web", ContainerState::Running),
            container("db", ContainerState::Exited),
        ]);
        assert_eq!(store.len(), 1);
        assert!(store.for_container(&container("web", ContainerState::Running)).is_some());

        store.prune(&[]);
        assert!(store.is_empty());
    }
}

//! Container stats sampling

use bollard::container::StatsOptions;
use futures::StreamExt;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error};

use crate::core::{ContainerStats, DockerError};
use crate::docker::{DockerClient, DockerResult};

const STATS_TIMEOUT: Duration = Duration::from_secs(5);

impl DockerClient {
    /// Fetch a single stats snapshot from a container
    pub async fn fetch_stats(&self, id: &str) -> DockerResult<ContainerStats> {
        debug!("Fetching stats for container {}", id);

        let options = StatsOptions {
            stream: false,
            ..Default::default()
        };

        let mut stream = self.inner().stats(id, Some(options));

        match timeout(STATS_TIMEOUT, stream.next()).await {
            Ok(Some(Ok(stats))) => Ok(parse_stats(&stats)),
            Ok(Some(Err(e))) => {
                error!("Error reading stats for container {}: {}", id, e);
                Err(DockerError::Container(format!("Failed to read stats: {}", e)))
            }
            Ok(None) => Err(DockerError::Container(
                "Stats stream ended unexpectedly".to_string(),
            )),
            Err(_) => {
                error!("Timeout waiting for stats for container {}", id);
                Err(DockerError::Container(
                    "Timeout waiting for stats".to_string(),
                ))
            }
        }
    }
}

fn parse_stats(stats: &bollard::container::Stats) -> ContainerStats {
    let cpu_percentage = calculate_cpu_percent(&stats.cpu_stats, &stats.precpu_stats);

    let memory_usage = stats.memory_stats.usage.unwrap_or(0);
    let memory_limit = stats.memory_stats.limit.unwrap_or(0);
    let memory_percentage = if memory_limit > 0 {
        (memory_usage as f64 / memory_limit as f64) * 100.0
    } else {
        0.0
    };

    // Summed over all interfaces
    let (network_rx, network_tx) = stats
        .networks
        .as_ref()
        .map(|networks| {
            networks.values().fold((0u64, 0u64), |(rx, tx), net| {
                (rx + net.rx_bytes, tx + net.tx_bytes)
            })
        })
        .unwrap_or((0, 0));

    let (block_read, block_write) = stats
        .blkio_stats
        .io_service_bytes_recursive
        .as_ref()
        .map(|entries| {
            entries
                .iter()
                .fold((0u64, 0u64), |(read, write), entry| {
                    match entry.op.to_ascii_lowercase().as_str() {
                        "read" => (read + entry.value, write),
                        "write" => (read, write + entry.value),
                        _ => (read, write),
                    }
                })
        })
        .unwrap_or((0, 0));

    ContainerStats {
        cpu_percentage,
        memory_usage,
        memory_limit,
        memory_percentage,
        network_rx,
        network_tx,
        block_read,
        block_write,
        pids: stats.pids_stats.current.unwrap_or(0),
    }
}

fn calculate_cpu_percent(
    cpu_stats: &bollard::container::CPUStats,
    precpu_stats: &bollard::container::CPUStats,
) -> f64 {
    let cpu_delta = cpu_stats
        .cpu_usage
        .total_usage
        .saturating_sub(precpu_stats.cpu_usage.total_usage);

    let system_delta = match (cpu_stats.system_cpu_usage, precpu_stats.system_cpu_usage) {
        (Some(curr), Some(prev)) => curr.saturating_sub(prev),
        _ => 0,
    };

    if system_delta > 0 && cpu_delta > 0 {
        let online_cpus = cpu_stats.online_cpus.unwrap_or(1).max(1);
        (cpu_delta as f64 / system_delta as f64) * online_cpus as f64 * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bollard::container::{CPUStats, CPUUsage, ThrottlingData};

    fn cpu(total: u64, system: Option<u64>, online: Option<u64>) -> CPUStats {
        CPUStats {
            cpu_usage: CPUUsage {
                percpu_usage: None,
                usage_in_usermode: 0,
                total_usage: total,
                usage_in_kernelmode: 0,
            },
            system_cpu_usage: system,
            online_cpus: online,
            throttling_data: ThrottlingData {
                periods: 0,
                throttled_periods: 0,
                throttled_time: 0,
            },
        }
    }

    #[test]
    fn test_cpu_percent_scales_by_online_cpus() {
        let current = cpu(200, Some(2000), Some(2));
        let previous = cpu(100, Some(1000), Some(2));
        let percent = calculate_cpu_percent(&current, &previous);
        assert!((percent - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cpu_percent_without_previous_sample() {
        let current = cpu(200, Some(2000), Some(4));
        let previous = cpu(0, None, None);
        assert_eq!(calculate_cpu_percent(&current, &previous), 0.0);
    }
}

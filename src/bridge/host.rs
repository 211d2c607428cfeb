//! Host resource sampling

use std::sync::{Mutex, PoisonError};

use sysinfo::{Disks, System};

use crate::core::SystemStats;

/// Keeps sysinfo state between samples so CPU usage is a delta over the
/// polling interval
pub struct HostSampler {
    sys: Mutex<System>,
    disks: Mutex<Disks>,
}

impl HostSampler {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        Self {
            sys: Mutex::new(sys),
            disks: Mutex::new(Disks::new_with_refreshed_list()),
        }
    }

    pub fn sample(&self) -> SystemStats {
        let mut sys = self.sys.lock().unwrap_or_else(PoisonError::into_inner);
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let mut disks = self.disks.lock().unwrap_or_else(PoisonError::into_inner);
        disks.refresh(true);

        // The root filesystem when present, otherwise every disk summed
        let (disk_total, disk_available) = disks
            .iter()
            .find(|d| d.mount_point() == std::path::Path::new("/"))
            .map(|d| (d.total_space(), d.available_space()))
            .unwrap_or_else(|| {
                disks.iter().fold((0, 0), |(total, avail), d| {
                    (total + d.total_space(), avail + d.available_space())
                })
            });

        SystemStats {
            cpu_percentage: f64::from(sys.global_cpu_usage()),
            cpu_count: sys.cpus().len(),
            memory_used: sys.used_memory(),
            memory_total: sys.total_memory(),
            disk_used: disk_total.saturating_sub(disk_available),
            disk_total,
        }
    }
}

impl Default for HostSampler {
    fn default() -> Self {
        Self::new()
    }
}

//! Column tables and per-view column configuration
//!
//! Each resource kind has one static table of [`ColumnDef`]s. A definition
//! carries the cell formatter and, where the column takes part in search, a
//! match predicate. Views keep a [`ColumnSet`] with the user's visibility and
//! width choices layered on top.

use chrono::{DateTime, Utc};

use crate::core::{ContainerInfo, ImageInfo, NetworkInfo, VolumeInfo};
use crate::format::{format_bytes, format_percent, format_relative, format_relative_str, format_size};
use crate::state::stats::StatsStore;

/// Everything a cell formatter may need beyond the row itself
pub struct CellContext<'a> {
    pub now: DateTime<Utc>,
    pub stats: &'a StatsStore,
}

pub type CellFormatter<T> = fn(&T, &CellContext<'_>) -> String;

/// `needle` is already lowercased
pub type MatchFn<T> = fn(&T, &str) -> bool;

pub struct ColumnDef<T> {
    pub id: &'static str,
    pub label: &'static str,
    /// Identity column: always shown, never toggled
    pub essential: bool,
    pub width: u16,
    pub min_width: u16,
    pub max_width: u16,
    pub cell: CellFormatter<T>,
    pub matches: Option<MatchFn<T>>,
}

/// A column's current view configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnConfig {
    pub id: &'static str,
    pub label: &'static str,
    pub visible: bool,
    pub essential: bool,
    pub width: u16,
    pub min_width: u16,
    pub max_width: u16,
}

pub struct ColumnSet<T: 'static> {
    defs: &'static [ColumnDef<T>],
    config: Vec<ColumnConfig>,
    resizable: bool,
}

impl<T: 'static> ColumnSet<T> {
    pub fn new(defs: &'static [ColumnDef<T>], resizable: bool) -> Self {
        let config = defs
            .iter()
            .map(|def| ColumnConfig {
                id: def.id,
                label: def.label,
                visible: true,
                essential: def.essential,
                width: def.width,
                min_width: def.min_width,
                max_width: def.max_width,
            })
            .collect();
        Self {
            defs,
            config,
            resizable,
        }
    }

    /// Start with the given non-essential columns hidden
    pub fn with_hidden(mut self, hidden: &[String]) -> Self {
        for id in hidden {
            self.set_visible(id, false);
        }
        self
    }

    pub fn defs(&self) -> &'static [ColumnDef<T>] {
        self.defs
    }

    pub fn is_resizable(&self) -> bool {
        self.resizable
    }

    pub fn config(&self, id: &str) -> Option<&ColumnConfig> {
        self.config.iter().find(|c| c.id == id)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.config(id).map(|c| c.visible).unwrap_or(false)
    }

    /// Columns offered in the toggle list
    pub fn toggleable(&self) -> impl Iterator<Item = &ColumnConfig> {
        self.config.iter().filter(|c| !c.essential)
    }

    /// Visible columns in table order, paired with their definitions
    pub fn visible(&self) -> Vec<(&ColumnDef<T>, &ColumnConfig)> {
        self.defs
            .iter()
            .zip(&self.config)
            .filter(|(_, config)| config.visible)
            .collect()
    }

    /// Returns false for essential or unknown columns
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.config.iter_mut().find(|c| c.id == id && !c.essential) {
            Some(config) => {
                config.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        let visible = self.is_visible(id);
        self.set_visible(id, !visible)
    }

    pub fn show_all(&mut self) {
        self.config
            .iter_mut()
            .filter(|c| !c.essential)
            .for_each(|c| c.visible = true);
    }

    pub fn hide_all(&mut self) {
        self.config
            .iter_mut()
            .filter(|c| !c.essential)
            .for_each(|c| c.visible = false);
    }

    /// Set one column's width, clamped to its bounds. Returns the applied width.
    pub fn resize(&mut self, id: &str, width: u16) -> Option<u16> {
        if !self.resizable {
            return None;
        }
        let config = self.config.iter_mut().find(|c| c.id == id)?;
        config.width = width.clamp(config.min_width, config.max_width);
        Some(config.width)
    }

    /// Case-insensitive search over every column with a match predicate
    pub fn matches(&self, item: &T, query: &str) -> bool {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.defs
            .iter()
            .filter_map(|def| def.matches)
            .any(|matches| matches(item, &needle))
    }
}

/// Column controls for whichever table is active
pub trait ColumnControl {
    fn column_configs(&self) -> Vec<ColumnConfig>;
    fn resizable(&self) -> bool;
    fn toggle_column(&mut self, id: &str) -> bool;
    fn show_all_columns(&mut self);
    fn hide_all_columns(&mut self);
    fn resize_column(&mut self, id: &str, width: u16) -> Option<u16>;
}

impl<T: 'static> ColumnControl for ColumnSet<T> {
    fn column_configs(&self) -> Vec<ColumnConfig> {
        self.config.clone()
    }

    fn resizable(&self) -> bool {
        self.resizable
    }

    fn toggle_column(&mut self, id: &str) -> bool {
        self.toggle(id)
    }

    fn show_all_columns(&mut self) {
        self.show_all();
    }

    fn hide_all_columns(&mut self) {
        self.hide_all();
    }

    fn resize_column(&mut self, id: &str, width: u16) -> Option<u16> {
        self.resize(id, width)
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

pub static CONTAINER_COLUMNS: &[ColumnDef<ContainerInfo>] = &[
    ColumnDef {
        id: "name",
        label: "NAME",
        essential: true,
        width: 24,
        min_width: 10,
        max_width: 48,
        cell: |c, _| c.name.clone(),
        matches: Some(|c, needle| contains(&c.name, needle)),
    },
    ColumnDef {
        id: "id",
        label: "ID",
        essential: false,
        width: 12,
        min_width: 12,
        max_width: 64,
        cell: |c, _| c.short_id().to_string(),
        matches: Some(|c, needle| contains(&c.id, needle)),
    },
    ColumnDef {
        id: "image",
        label: "IMAGE",
        essential: false,
        width: 24,
        min_width: 10,
        max_width: 60,
        cell: |c, _| c.image.clone(),
        matches: Some(|c, needle| contains(&c.image, needle)),
    },
    ColumnDef {
        id: "status",
        label: "STATUS",
        essential: false,
        width: 20,
        min_width: 8,
        max_width: 40,
        cell: |c, _| {
            if c.status.is_empty() {
                c.state.to_string()
            } else {
                c.status.clone()
            }
        },
        matches: None,
    },
    ColumnDef {
        id: "ports",
        label: "PORTS",
        essential: false,
        width: 18,
        min_width: 6,
        max_width: 60,
        cell: |c, _| c.port_summary(),
        matches: None,
    },
    ColumnDef {
        id: "cpu",
        label: "CPU",
        essential: false,
        width: 7,
        min_width: 6,
        max_width: 12,
        cell: |c, ctx| {
            ctx.stats
                .for_container(c)
                .map(|s| format_percent(s.cpu_percentage))
                .unwrap_or_else(|| "-".to_string())
        },
        matches: None,
    },
    ColumnDef {
        id: "memory",
        label: "MEMORY",
        essential: false,
        width: 10,
        min_width: 8,
        max_width: 24,
        cell: |c, ctx| {
            ctx.stats
                .for_container(c)
                .map(|s| format_bytes(s.memory_usage))
                .unwrap_or_else(|| "-".to_string())
        },
        matches: None,
    },
    ColumnDef {
        id: "created",
        label: "CREATED",
        essential: false,
        width: 14,
        min_width: 8,
        max_width: 24,
        cell: |c, ctx| format_relative(c.created, ctx.now),
        matches: None,
    },
];

pub static IMAGE_COLUMNS: &[ColumnDef<ImageInfo>] = &[
    ColumnDef {
        id: "tag",
        label: "REPOSITORY:TAG",
        essential: true,
        width: 36,
        min_width: 36,
        max_width: 36,
        cell: |i, _| i.display_tag(),
        matches: Some(|i, needle| {
            i.repo_tags.iter().any(|t| contains(t, needle)) || contains(&i.id, needle)
        }),
    },
    ColumnDef {
        id: "id",
        label: "IMAGE ID",
        essential: false,
        width: 12,
        min_width: 12,
        max_width: 12,
        cell: |i, _| i.short_id().to_string(),
        matches: None,
    },
    ColumnDef {
        id: "size",
        label: "SIZE",
        essential: false,
        width: 10,
        min_width: 10,
        max_width: 10,
        cell: |i, _| format_size(i.size),
        matches: None,
    },
    ColumnDef {
        id: "containers",
        label: "USED BY",
        essential: false,
        width: 8,
        min_width: 8,
        max_width: 8,
        cell: |i, _| {
            if i.containers < 0 {
                "-".to_string()
            } else {
                i.containers.to_string()
            }
        },
        matches: None,
    },
    ColumnDef {
        id: "created",
        label: "CREATED",
        essential: false,
        width: 14,
        min_width: 14,
        max_width: 14,
        cell: |i, ctx| format_relative(i.created, ctx.now),
        matches: None,
    },
];

pub static VOLUME_COLUMNS: &[ColumnDef<VolumeInfo>] = &[
    ColumnDef {
        id: "name",
        label: "NAME",
        essential: true,
        width: 28,
        min_width: 12,
        max_width: 64,
        cell: |v, _| v.name.clone(),
        matches: Some(|v, needle| contains(&v.name, needle)),
    },
    ColumnDef {
        id: "driver",
        label: "DRIVER",
        essential: false,
        width: 10,
        min_width: 6,
        max_width: 20,
        cell: |v, _| v.driver.clone(),
        matches: None,
    },
    ColumnDef {
        id: "scope",
        label: "SCOPE",
        essential: false,
        width: 8,
        min_width: 5,
        max_width: 12,
        cell: |v, _| v.scope.clone(),
        matches: None,
    },
    ColumnDef {
        id: "mountpoint",
        label: "MOUNTPOINT",
        essential: false,
        width: 40,
        min_width: 12,
        max_width: 100,
        cell: |v, _| v.mountpoint.clone(),
        matches: None,
    },
    ColumnDef {
        id: "created",
        label: "CREATED",
        essential: false,
        width: 14,
        min_width: 8,
        max_width: 24,
        cell: |v, ctx| format_relative_str(v.created_at.as_deref(), ctx.now),
        matches: None,
    },
];

pub static NETWORK_COLUMNS: &[ColumnDef<NetworkInfo>] = &[
    ColumnDef {
        id: "name",
        label: "NAME",
        essential: true,
        width: 24,
        min_width: 24,
        max_width: 24,
        cell: |n, _| {
            if n.is_system() {
                format!("{} (system)", n.name)
            } else {
                n.name.clone()
            }
        },
        matches: Some(|n, needle| contains(&n.name, needle)),
    },
    ColumnDef {
        id: "id",
        label: "NETWORK ID",
        essential: false,
        width: 12,
        min_width: 12,
        max_width: 12,
        cell: |n, _| crate::core::short_id(&n.id).to_string(),
        matches: Some(|n, needle| contains(&n.id, needle)),
    },
    ColumnDef {
        id: "driver",
        label: "DRIVER",
        essential: false,
        width: 10,
        min_width: 10,
        max_width: 10,
        cell: |n, _| n.driver.clone(),
        matches: None,
    },
    ColumnDef {
        id: "scope",
        label: "SCOPE",
        essential: false,
        width: 8,
        min_width: 8,
        max_width: 8,
        cell: |n, _| n.scope.clone(),
        matches: None,
    },
    ColumnDef {
        id: "subnet",
        label: "SUBNET",
        essential: false,
        width: 18,
        min_width: 18,
        max_width: 18,
        cell: |n, _| n.subnet().unwrap_or("-").to_string(),
        matches: None,
    },
    ColumnDef {
        id: "gateway",
        label: "GATEWAY",
        essential: false,
        width: 16,
        min_width: 16,
        max_width: 16,
        cell: |n, _| n.gateway().unwrap_or("-").to_string(),
        matches: None,
    },
    ColumnDef {
        id: "containers",
        label: "CONTAINERS",
        essential: false,
        width: 10,
        min_width: 10,
        max_width: 10,
        cell: |n, _| n.containers.len().to_string(),
        matches: None,
    },
];

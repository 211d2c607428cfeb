//! Owned snapshot of one resource collection plus its load bookkeeping

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::core::{
    BridgeResult, ContainerInfo, ImageInfo, NetworkInfo, Rejection, ResourceKind, VolumeInfo,
};

/// Something that can be listed, selected and removed
pub trait Resource: Clone + Send + 'static {
    const KIND: ResourceKind;

    /// Identity used for selection sets and busy tracking
    fn key(&self) -> &str;

    /// Name shown in confirmations and notifications
    fn display_name(&self) -> String;

    /// Why this entity may never be selected or removed, if it is protected
    fn protection(&self) -> Option<Rejection> {
        None
    }

    fn is_protected(&self) -> bool {
        self.protection().is_some()
    }

    /// Whether removal has to force past a running state
    fn needs_force_removal(&self) -> bool {
        false
    }
}

impl Resource for ContainerInfo {
    const KIND: ResourceKind = ResourceKind::Container;

    fn key(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn needs_force_removal(&self) -> bool {
        self.state.is_running()
    }
}

impl Resource for ImageInfo {
    const KIND: ResourceKind = ResourceKind::Image;

    fn key(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        if self.is_dangling() {
            self.short_id().to_string()
        } else {
            self.display_tag()
        }
    }
}

impl Resource for VolumeInfo {
    const KIND: ResourceKind = ResourceKind::Volume;

    fn key(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

impl Resource for NetworkInfo {
    const KIND: ResourceKind = ResourceKind::Network;

    fn key(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn protection(&self) -> Option<Rejection> {
        self.is_system().then(|| Rejection::SystemNetwork {
            name: self.name.clone(),
        })
    }
}

/// Handed out by [`ListStore::begin_load`]; only the newest ticket may apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// What happened to a finished load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed,
    /// Superseded by a newer load or a reset
    Stale,
}

#[derive(Debug, Clone)]
pub struct ListStore<T> {
    items: Vec<T>,
    loading: bool,
    error: Option<String>,
    last_refresh: Option<DateTime<Utc>>,
    generation: u64,
}

impl<T> Default for ListStore<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            last_refresh: None,
            generation: 0,
        }
    }
}

impl<T: Resource> ListStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    pub fn has_loaded(&self) -> bool {
        self.last_refresh.is_some()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        LoadTicket {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply a finished load. A failure keeps the previous collection.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: BridgeResult<Vec<T>>) -> LoadOutcome {
        if !self.is_current(ticket) {
            debug!("Dropping stale {} list response", T::KIND);
            return LoadOutcome::Stale;
        }
        self.loading = false;

        match result {
            Ok(items) => {
                debug!("Loaded {} {}s", items.len(), T::KIND);
                self.items = items;
                self.error = None;
                self.last_refresh = Some(Utc::now());
                LoadOutcome::Applied
            }
            Err(e) => {
                warn!("Failed to load {}s: {}", T::KIND, e);
                self.error = Some(e.to_string());
                LoadOutcome::Failed
            }
        }
    }

    /// Forget everything; in-flight loads become stale
    pub fn reset(&mut self) {
        self.generation += 1;
        self.items.clear();
        self.loading = false;
        self.error = None;
        self.last_refresh = None;
    }
}

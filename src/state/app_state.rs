//! Application state management

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::bridge::EventHub;
use crate::config::Config;
use crate::controller::{explain, ActionReport, ActionTarget, AppEvent, ContainerAction, Request};
use crate::core::{
    classify_failure, BridgeResult, ContainerInfo, FailureKind, ImageInfo, InputDialog, InputPurpose, Modal,
    NetworkInfo, NotificationLevel, Rejection, ResourceKind, Tab, VolumeInfo,
};
use crate::state::columns::{
    ColumnSet, CONTAINER_COLUMNS, IMAGE_COLUMNS, NETWORK_COLUMNS, VOLUME_COLUMNS,
};
use crate::state::confirm::{offer_force_remove, request_removal, validate_volume_name, PendingAction};
use crate::state::grouping::{flatten, group_containers, ContainerRow, GroupExpansion};
use crate::state::list::{LoadOutcome, LoadTicket, Resource};
use crate::state::stats::StatsStore;
use crate::state::stream::StreamView;
use crate::state::terminal::TerminalTabs;
use crate::state::view::{ListView, ResourceView};

/// Placeholder cwd until the bridge reports the real one
const UNRESOLVED_CWD: &str = ".";

/// Notification message
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: uuid::Uuid,
    pub message: String,
    pub level: NotificationLevel,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Row under the container cursor, by identity rather than position
#[derive(Debug, Clone, PartialEq)]
enum RowAnchor {
    Group(String),
    Container(String),
}

/// Main application state
pub struct AppState {
    pub current_tab: Tab,

    pub containers: ResourceView<ContainerInfo>,
    pub images: ResourceView<ImageInfo>,
    pub volumes: ResourceView<VolumeInfo>,
    pub networks: ResourceView<NetworkInfo>,
    pub expansion: GroupExpansion,
    pub stats: StatsStore,

    pub terminals: TerminalTabs,
    /// Log or exec overlay for one container
    pub stream: Option<StreamView>,

    pub modal: Option<Modal>,
    /// Runs when the open confirm modal is accepted
    pub pending: Option<PendingAction>,
    /// Highlighted entry while the column picker is open
    pub column_picker: Option<usize>,
    /// Keystrokes go to the search box
    pub filter_active: bool,
    pub document_scroll: u16,

    pub docker_connected: bool,
    pub show_help: bool,
    pub notifications: Vec<Notification>,

    log_tail: usize,
    start_dir: String,
    hub: EventHub,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(EventHub::new(), &Config::default())
    }
}

impl AppState {
    /// Create new app state
    pub fn new(hub: EventHub, config: &Config) -> Self {
        let ui = &config.ui;
        Self {
            current_tab: Tab::Containers,
            containers: ResourceView::new(
                ColumnSet::new(CONTAINER_COLUMNS, true)
                    .with_hidden(ui.hidden_for(ResourceKind::Container)),
            ),
            images: ResourceView::new(
                ColumnSet::new(IMAGE_COLUMNS, false).with_hidden(ui.hidden_for(ResourceKind::Image)),
            ),
            volumes: ResourceView::new(
                ColumnSet::new(VOLUME_COLUMNS, true).with_hidden(ui.hidden_for(ResourceKind::Volume)),
            ),
            networks: ResourceView::new(
                ColumnSet::new(NETWORK_COLUMNS, false)
                    .with_hidden(ui.hidden_for(ResourceKind::Network)),
            ),
            expansion: GroupExpansion::new(),
            stats: StatsStore::new(),
            terminals: TerminalTabs::new(UNRESOLVED_CWD),
            stream: None,
            modal: None,
            pending: None,
            column_picker: None,
            filter_active: false,
            document_scroll: 0,
            docker_connected: false,
            show_help: false,
            notifications: vec![],
            log_tail: config.general.log_tail,
            start_dir: UNRESOLVED_CWD.to_string(),
            hub,
        }
    }

    /// Add a notification
    pub fn add_notification(&mut self, message: impl Into<String>, level: NotificationLevel) {
        let notification = Notification {
            id: uuid::Uuid::new_v4(),
            message: message.into(),
            level,
            timestamp: Utc::now(),
        };
        self.notifications.push(notification);

        // Keep only last 10 notifications
        if self.notifications.len() > 10 {
            self.notifications.remove(0);
        }
    }

    /// Clear old notifications (older than threshold)
    pub fn clear_old_notifications(&mut self, max_age_seconds: i64) {
        let cutoff = Utc::now() - chrono::Duration::seconds(max_age_seconds);
        self.notifications.retain(|n| n.timestamp > cutoff);
    }

    fn reject(&mut self, rejection: Rejection) {
        debug!("Rejected locally: {}", rejection);
        self.add_notification(rejection.to_string(), NotificationLevel::Warning);
    }

    // ---- loading -------------------------------------------------------

    /// Everything fetched when the UI mounts
    pub fn initial_requests(&mut self) -> Vec<Request> {
        let mut requests: Vec<Request> = [
            ResourceKind::Container,
            ResourceKind::Image,
            ResourceKind::Volume,
            ResourceKind::Network,
        ]
        .into_iter()
        .map(|kind| self.refresh(kind))
        .collect();
        requests.extend([Request::SystemStats, Request::SystemInfo, Request::WorkingDirectory]);
        requests
    }

    pub fn refresh(&mut self, kind: ResourceKind) -> Request {
        match kind {
            ResourceKind::Container => Request::LoadContainers(self.containers.begin_load()),
            ResourceKind::Image => Request::LoadImages(self.images.begin_load()),
            ResourceKind::Volume => Request::LoadVolumes(self.volumes.begin_load()),
            ResourceKind::Network => Request::LoadNetworks(self.networks.begin_load()),
        }
    }

    /// Explicit refresh of the visible list
    pub fn refresh_current(&mut self) -> Vec<Request> {
        match self.current_tab.resource_kind() {
            Some(kind) => {
                info!("Refreshing {}s", kind);
                vec![self.refresh(kind)]
            }
            None => vec![],
        }
    }

    /// Container list plus stats of every running container
    pub fn stats_tick(&mut self) -> Vec<Request> {
        let mut requests = vec![self.refresh(ResourceKind::Container)];
        requests.extend(
            self.containers
                .store
                .items()
                .iter()
                .filter(|c| c.state.is_running())
                .map(|c| Request::ContainerStats(c.id.clone())),
        );
        requests
    }

    pub fn system_tick(&mut self) -> Vec<Request> {
        vec![Request::SystemStats]
    }

    /// Drop all list data; responses still in flight become stale
    pub fn teardown(&mut self) {
        self.containers.reset();
        self.images.reset();
        self.volumes.reset();
        self.networks.reset();
        self.expansion = GroupExpansion::new();
    }

    fn note_load(&mut self, kind: ResourceKind, outcome: LoadOutcome, error: Option<String>) {
        match outcome {
            LoadOutcome::Applied => self.docker_connected = true,
            LoadOutcome::Failed => {
                let error = error.unwrap_or_default();
                warn!("Failed to load {}s: {}", kind, error);
                if classify_failure(&error) == FailureKind::Connectivity {
                    self.docker_connected = false;
                }
            }
            LoadOutcome::Stale => debug!("Dropped stale {} list response", kind),
        }
    }

    /// Apply a flat list response, keeping the cursor on the same item
    fn finish<T: Resource>(
        view: &mut ResourceView<T>,
        ticket: LoadTicket,
        result: BridgeResult<Vec<T>>,
    ) -> (LoadOutcome, Option<String>) {
        let anchor = view.current().map(|item| item.key().to_string());
        let outcome = view.finish_load(ticket, result);
        if outcome == LoadOutcome::Applied {
            let rows = view.filtered();
            let index = anchor
                .and_then(|key| rows.iter().position(|item| item.key() == key))
                .unwrap_or(view.cursor());
            let len = rows.len();
            view.place_cursor(index, len);
        }
        (outcome, view.store.error().map(str::to_string))
    }

    // ---- navigation ----------------------------------------------------

    /// The list behind the current tab
    pub fn list_view(&self) -> Option<&dyn ListView> {
        match self.current_tab {
            Tab::Containers => Some(&self.containers),
            Tab::Images => Some(&self.images),
            Tab::Volumes => Some(&self.volumes),
            Tab::Networks => Some(&self.networks),
            Tab::Terminal => None,
        }
    }

    pub fn list_view_mut(&mut self) -> Option<&mut dyn ListView> {
        match self.current_tab {
            Tab::Containers => Some(&mut self.containers),
            Tab::Images => Some(&mut self.images),
            Tab::Volumes => Some(&mut self.volumes),
            Tab::Networks => Some(&mut self.networks),
            Tab::Terminal => None,
        }
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        if self.current_tab != tab {
            info!("Switching to tab: {:?}", tab);
            self.current_tab = tab;
            self.column_picker = None;
            self.filter_active = false;
        }
    }

    /// Grouped and filtered container rows in display order
    pub fn container_rows(&self) -> Vec<ContainerRow<'_>> {
        flatten(group_containers(self.containers.filtered()), &self.expansion)
    }

    pub fn row_count(&self) -> usize {
        match self.current_tab {
            Tab::Containers => self.container_rows().len(),
            Tab::Images => self.images.filtered().len(),
            Tab::Volumes => self.volumes.filtered().len(),
            Tab::Networks => self.networks.filtered().len(),
            Tab::Terminal => 0,
        }
    }

    pub fn cursor(&self) -> usize {
        match self.current_tab {
            Tab::Containers => self.containers.cursor(),
            Tab::Images => self.images.cursor(),
            Tab::Volumes => self.volumes.cursor(),
            Tab::Networks => self.networks.cursor(),
            Tab::Terminal => 0,
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.row_count();
        match self.current_tab {
            Tab::Containers => self.containers.move_cursor(delta, len),
            Tab::Images => self.images.move_cursor(delta, len),
            Tab::Volumes => self.volumes.move_cursor(delta, len),
            Tab::Networks => self.networks.move_cursor(delta, len),
            Tab::Terminal => {}
        }
    }

    fn clamp_container_cursor(&mut self) {
        let len = self.container_rows().len();
        self.containers.clamp_cursor(len);
    }

    /// Container under the cursor; `None` on a group header
    pub fn current_container(&self) -> Option<&ContainerInfo> {
        self.container_rows()
            .get(self.containers.cursor())
            .and_then(ContainerRow::container)
    }

    /// Project name when the cursor is on a group header
    pub fn current_group(&self) -> Option<String> {
        match self.container_rows().get(self.containers.cursor()) {
            Some(ContainerRow::Group { group, .. }) => Some(group.name.to_string()),
            _ => None,
        }
    }

    fn current_group_members(&self) -> Option<Vec<String>> {
        match self.container_rows().get(self.containers.cursor()) {
            Some(ContainerRow::Group { group, .. }) => Some(group.member_ids()),
            _ => None,
        }
    }

    /// Enter: expand or collapse the group under the cursor. Returns false
    /// when the cursor is not on a group header.
    pub fn toggle_expansion(&mut self) -> bool {
        match self.current_group() {
            Some(group) => {
                self.expansion.toggle(&group);
                self.clamp_container_cursor();
                true
            }
            None => false,
        }
    }

    /// Identity of the container row under the cursor
    fn container_anchor(&self) -> Option<RowAnchor> {
        self.container_rows()
            .get(self.containers.cursor())
            .map(|row| match row {
                ContainerRow::Group { group, .. } => RowAnchor::Group(group.name.to_string()),
                ContainerRow::Member(c) | ContainerRow::Standalone(c) => {
                    RowAnchor::Container(c.id.clone())
                }
            })
    }

    /// Put the cursor back on the anchored row, or clamp when it is gone
    fn restore_container_cursor(&mut self, anchor: Option<RowAnchor>) {
        let rows = self.container_rows();
        let found = anchor.and_then(|anchor| {
            rows.iter().position(|row| match (row, &anchor) {
                (ContainerRow::Group { group, .. }, RowAnchor::Group(name)) => group.name == name,
                (row, RowAnchor::Container(id)) => row.container().is_some_and(|c| &c.id == id),
                _ => false,
            })
        });
        let len = rows.len();
        let index = found.unwrap_or(self.containers.cursor());
        self.containers.place_cursor(index, len);
    }

    /// Selected containers, or the row under the cursor (a whole group on a
    /// header row)
    fn container_targets(&self) -> Vec<&ContainerInfo> {
        if !self.containers.selection.is_empty() {
            return self.containers.action_targets();
        }
        match self.container_rows().get(self.containers.cursor()) {
            Some(ContainerRow::Group { group, .. }) => group.members.clone(),
            Some(row) => row.container().into_iter().collect(),
            None => vec![],
        }
    }

    /// Space: select the row, or every member of a group header
    pub fn toggle_current(&mut self) {
        let result = match self.current_tab {
            Tab::Containers => {
                if let Some(members) = self.current_group_members() {
                    let members: Vec<&str> = members.iter().map(String::as_str).collect();
                    self.containers.selection.toggle_group(&members);
                    return;
                }
                match self.current_container().map(|c| c.id.clone()) {
                    Some(id) => self.containers.toggle_selected(&id),
                    None => return,
                }
            }
            Tab::Images => match self.images.current().map(|i| i.id.clone()) {
                Some(id) => self.images.toggle_selected(&id),
                None => return,
            },
            Tab::Volumes => match self.volumes.current().map(|v| v.name.clone()) {
                Some(name) => self.volumes.toggle_selected(&name),
                None => return,
            },
            Tab::Networks => match self.networks.current().map(|n| n.id.clone()) {
                Some(id) => self.networks.toggle_selected(&id),
                None => return,
            },
            Tab::Terminal => return,
        };
        if let Err(rejection) = result {
            self.reject(rejection);
        }
    }

    /// Header checkbox: select every selectable visible row, or clear
    pub fn toggle_all(&mut self) {
        if let Some(view) = self.list_view_mut() {
            view.toggle_all_selected();
        }
    }

    // ---- filter --------------------------------------------------------

    pub fn push_filter(&mut self, c: char) {
        if let Some(view) = self.list_view_mut() {
            view.push_filter(c);
        }
        self.after_filter_change();
    }

    pub fn pop_filter(&mut self) {
        if let Some(view) = self.list_view_mut() {
            view.pop_filter();
        }
        self.after_filter_change();
    }

    pub fn clear_filter(&mut self) {
        if let Some(view) = self.list_view_mut() {
            view.clear_filter();
        }
        self.filter_active = false;
        self.after_filter_change();
    }

    fn after_filter_change(&mut self) {
        if self.current_tab == Tab::Containers {
            self.clamp_container_cursor();
        }
    }

    // ---- columns -------------------------------------------------------

    pub fn open_column_picker(&mut self) {
        if self.list_view().is_some() {
            self.column_picker = Some(0);
        }
    }

    pub fn move_picker(&mut self, delta: isize) {
        let count = self
            .list_view()
            .map(|v| v.column_configs().iter().filter(|c| !c.essential).count())
            .unwrap_or(0);
        if let Some(index) = self.column_picker.as_mut() {
            if count > 0 {
                *index = (*index as isize + delta).clamp(0, count as isize - 1) as usize;
            }
        }
    }

    fn picked_column(&self) -> Option<&'static str> {
        let index = self.column_picker?;
        self.list_view()?
            .column_configs()
            .into_iter()
            .filter(|c| !c.essential)
            .nth(index)
            .map(|c| c.id)
    }

    pub fn toggle_picked_column(&mut self) {
        if let (Some(id), Some(view)) = (self.picked_column(), self.list_view_mut()) {
            view.column_control().toggle_column(id);
        }
    }

    pub fn show_all_columns(&mut self) {
        if let Some(view) = self.list_view_mut() {
            view.column_control().show_all_columns();
        }
    }

    pub fn hide_all_columns(&mut self) {
        if let Some(view) = self.list_view_mut() {
            view.column_control().hide_all_columns();
        }
    }

    /// Widen (positive) or narrow the picked column
    pub fn resize_picked_column(&mut self, delta: i32) {
        let Some(id) = self.picked_column() else {
            return;
        };
        let Some(view) = self.list_view_mut() else {
            return;
        };
        let Some(current) = view
            .column_configs()
            .into_iter()
            .find(|c| c.id == id)
            .map(|c| c.width)
        else {
            return;
        };
        let width = (current as i32 + delta).clamp(0, u16::MAX as i32) as u16;
        if view.column_control().resize_column(id, width).is_none() {
            debug!("Columns of this table are not resizable");
        }
    }

    // ---- actions -------------------------------------------------------

    fn view_busy(&mut self, kind: ResourceKind, keys: &[String]) -> bool {
        let keys = keys.iter().map(String::as_str);
        match kind {
            ResourceKind::Container => self.containers.mark_busy(keys),
            ResourceKind::Image => self.images.mark_busy(keys),
            ResourceKind::Volume => self.volumes.mark_busy(keys),
            ResourceKind::Network => self.networks.mark_busy(keys),
        }
    }

    fn clear_busy(&mut self, kind: ResourceKind, keys: &[&str]) {
        let keys = keys.iter().copied();
        match kind {
            ResourceKind::Container => self.containers.clear_busy(keys),
            ResourceKind::Image => self.images.clear_busy(keys),
            ResourceKind::Volume => self.volumes.clear_busy(keys),
            ResourceKind::Network => self.networks.clear_busy(keys),
        }
    }

    /// Start/stop/restart/pause/unpause the targeted containers
    pub fn container_action(&mut self, action: ContainerAction) -> Vec<Request> {
        if self.current_tab != Tab::Containers {
            return vec![];
        }
        let targets: Vec<ActionTarget> = self
            .container_targets()
            .into_iter()
            .map(ActionTarget::from)
            .collect();
        if targets.is_empty() {
            self.reject(Rejection::EmptySelection);
            return vec![];
        }

        let keys: Vec<String> = targets.iter().map(|t| t.key.clone()).collect();
        if !self.view_busy(ResourceKind::Container, &keys) {
            self.reject(Rejection::Busy("A container action".to_string()));
            return vec![];
        }
        vec![Request::Lifecycle { action, targets }]
    }

    /// Ask for confirmation before removing the targeted rows
    pub fn request_remove(&mut self) {
        let pending = match self.current_tab {
            Tab::Containers => request_removal(&self.container_targets()),
            Tab::Images => request_removal(&self.images.action_targets()),
            Tab::Volumes => request_removal(&self.volumes.action_targets()),
            Tab::Networks => request_removal(&self.networks.action_targets()),
            Tab::Terminal => return,
        };
        match pending {
            Ok(pending) => {
                self.modal = Some(Modal::Confirm(pending.dialog));
                self.pending = Some(pending.action);
            }
            Err(rejection) => self.reject(rejection),
        }
    }

    /// Accept the open confirm modal
    pub fn confirm(&mut self) -> Vec<Request> {
        self.modal = None;
        let Some(action) = self.pending.take() else {
            return vec![];
        };
        match action {
            PendingAction::Remove { kind, targets } => {
                let keys: Vec<String> = targets.iter().map(|t| t.key.clone()).collect();
                if !self.view_busy(kind, &keys) {
                    self.reject(Rejection::Busy(format!("Removing this {}", kind)));
                    return vec![];
                }
                vec![Request::Remove { kind, targets }]
            }
            PendingAction::ForceRemoveImage(target) => {
                if !self.view_busy(ResourceKind::Image, &[target.key.clone()]) {
                    self.reject(Rejection::Busy("Removing this image".to_string()));
                    return vec![];
                }
                vec![Request::ForceRemoveImage(target)]
            }
        }
    }

    /// Dismiss any modal; a pending action is dropped unrun
    pub fn cancel_modal(&mut self) {
        self.modal = None;
        self.pending = None;
        self.document_scroll = 0;
    }

    pub fn open_create_volume(&mut self) {
        self.modal = Some(Modal::Input(InputDialog::create_volume()));
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(Modal::Input(dialog)) = self.modal.as_mut() {
            dialog.value.push(c);
        }
    }

    pub fn input_backspace(&mut self) {
        if let Some(Modal::Input(dialog)) = self.modal.as_mut() {
            dialog.value.pop();
        }
    }

    pub fn submit_input(&mut self) -> Vec<Request> {
        let Some(Modal::Input(dialog)) = self.modal.as_ref() else {
            return vec![];
        };
        match dialog.purpose {
            InputPurpose::CreateVolume => match validate_volume_name(&dialog.value) {
                Ok(name) => {
                    self.modal = None;
                    vec![Request::CreateVolume(name)]
                }
                Err(rejection) => {
                    self.reject(rejection);
                    vec![]
                }
            },
        }
    }

    pub fn inspect_current(&mut self) -> Vec<Request> {
        match self.current_container() {
            Some(container) => vec![Request::Inspect {
                id: container.id.clone(),
                name: container.name.clone(),
            }],
            None => vec![],
        }
    }

    // ---- streams -------------------------------------------------------

    pub fn open_logs(&mut self) -> Vec<Request> {
        let Some(container) = self.current_container() else {
            return vec![];
        };
        let (id, name) = (container.id.clone(), container.name.clone());
        let mut requests = self.close_stream();
        self.stream = Some(StreamView::logs(&self.hub, &id, &name));
        requests.push(Request::LoadLogs {
            id,
            tail: self.log_tail,
        });
        requests
    }

    pub fn open_exec(&mut self) -> Vec<Request> {
        let Some(container) = self.current_container() else {
            return vec![];
        };
        let (id, name) = (container.id.clone(), container.name.clone());
        let mut requests = self.close_stream();
        self.stream = Some(StreamView::exec(&self.hub, &id, &name));
        requests.push(Request::StartShell(id));
        requests
    }

    /// Drop the overlay's subscriptions and stop a backend log follower
    pub fn close_stream(&mut self) -> Vec<Request> {
        match self.stream.take() {
            Some(view) if view.is_logs() => vec![Request::StopLogs(view.close())],
            Some(view) => {
                view.close();
                vec![]
            }
            None => vec![],
        }
    }

    /// Send the exec input line to the container
    pub fn submit_exec(&mut self) -> Vec<Request> {
        let Some(view) = self.stream.as_mut() else {
            return vec![];
        };
        if view.running || view.input.trim().is_empty() {
            return vec![];
        }
        let line = std::mem::take(&mut view.input);
        let Some(command) = view.exec_command(&line) else {
            view.input = line;
            return vec![];
        };
        view.push_line(format!("$ {}", line), false);
        view.running = true;
        view.scroll_offset = 0;
        vec![Request::Exec {
            id: view.container_id.clone(),
            command,
        }]
    }

    pub fn poll_stream(&mut self) -> usize {
        self.stream.as_mut().map(StreamView::poll).unwrap_or(0)
    }

    fn stream_for(&mut self, id: &str) -> Option<&mut StreamView> {
        self.stream.as_mut().filter(|view| view.container_id == id)
    }

    // ---- terminal ------------------------------------------------------

    pub fn submit_terminal(&mut self) -> Vec<Request> {
        self.terminals
            .active_mut()
            .submit()
            .map(Request::Terminal)
            .into_iter()
            .collect()
    }

    pub fn open_terminal(&mut self) {
        let cwd = self.start_dir.clone();
        self.terminals.open(cwd);
    }

    pub fn close_terminal(&mut self) {
        if !self.terminals.close_active() {
            self.add_notification("The last terminal cannot be closed", NotificationLevel::Info);
        }
    }

    // ---- results -------------------------------------------------------

    /// Apply a finished request; returns follow-up work
    pub fn apply(&mut self, event: AppEvent) -> Vec<Request> {
        match event {
            AppEvent::ContainersLoaded(ticket, result) => {
                // Cursor indexes grouped rows, not containers
                let anchor = self.container_anchor();
                let outcome = self.containers.finish_load(ticket, result);
                let error = self.containers.store.error().map(str::to_string);
                if outcome == LoadOutcome::Applied {
                    self.stats.prune(self.containers.store.items());
                    self.restore_container_cursor(anchor);
                }
                self.note_load(ResourceKind::Container, outcome, error);
            }
            AppEvent::ImagesLoaded(ticket, result) => {
                let (outcome, error) = Self::finish(&mut self.images, ticket, result);
                self.note_load(ResourceKind::Image, outcome, error);
            }
            AppEvent::VolumesLoaded(ticket, result) => {
                let (outcome, error) = Self::finish(&mut self.volumes, ticket, result);
                self.note_load(ResourceKind::Volume, outcome, error);
            }
            AppEvent::NetworksLoaded(ticket, result) => {
                let (outcome, error) = Self::finish(&mut self.networks, ticket, result);
                self.note_load(ResourceKind::Network, outcome, error);
            }
            AppEvent::StatsLoaded { id, result } => match result {
                Ok(stats) => self.stats.record(&id, stats),
                Err(e) => debug!("Stats for {} unavailable: {}", id, e),
            },
            AppEvent::SystemStatsLoaded(result) => match result {
                Ok(stats) => self.stats.set_system(stats),
                Err(e) => debug!("System stats unavailable: {}", e),
            },
            AppEvent::SystemInfoLoaded(result) => match result {
                Ok(info) => {
                    self.docker_connected = true;
                    self.stats.docker_info = Some(info);
                }
                Err(e) => debug!("Docker system info unavailable: {}", e),
            },
            AppEvent::ActionFinished(report) => return self.finish_action(report),
            AppEvent::Inspected { name, result } => {
                self.document_scroll = 0;
                self.modal = Some(match result {
                    Ok(document) => Modal::Document {
                        title: format!("Inspect {}", name),
                        body: serde_json::to_string_pretty(&document)
                            .unwrap_or_else(|_| document.to_string()),
                    },
                    Err(e) => Modal::Error(format!("Failed to inspect '{}': {}", name, explain(&e))),
                });
            }
            AppEvent::LogsLoaded { id, result } => {
                if let Some(view) = self.stream_for(&id) {
                    match result {
                        Ok(backlog) => {
                            view.push_text(&backlog, false);
                            return vec![Request::FollowLogs(id)];
                        }
                        Err(e) => view.push_text(&explain(&e), true),
                    }
                }
            }
            AppEvent::FollowStarted { id, result } => match (self.stream_for(&id), result) {
                (Some(view), Err(e)) => {
                    view.push_text(&format!("Live logs unavailable: {}", e), true)
                }
                (Some(_), Ok(())) => {}
                (None, Ok(())) => {
                    // Overlay closed while the follower was starting; the
                    // earlier stop may have found nothing to end
                    debug!("Stopping late log follower for {}", id);
                    return vec![Request::StopLogs(id)];
                }
                (None, Err(_)) => {}
            },
            AppEvent::ShellStarted { id, result } => {
                if let Some(view) = self.stream_for(&id) {
                    match result {
                        Ok(shell) => {
                            view.push_line(format!("Connected using {}", shell), false);
                            view.set_shell(shell);
                        }
                        Err(e) => {
                            view.push_text(&explain(&e), true);
                            view.ended = true;
                        }
                    }
                }
            }
            AppEvent::ExecSent { id, result } => {
                if let (Some(view), Err(e)) = (self.stream_for(&id), result) {
                    view.push_text(&explain(&e), true);
                    view.running = false;
                }
            }
            AppEvent::DirectoryChanged {
                session,
                entry,
                result,
            } => match self.terminals.get_mut(session) {
                Some(session) => session.finish_cd(entry, result),
                None => debug!("Result for closed terminal session {}", session),
            },
            AppEvent::CommandFinished {
                session,
                entry,
                result,
            } => match self.terminals.get_mut(session) {
                Some(session) => session.finish_command(entry, result),
                None => debug!("Result for closed terminal session {}", session),
            },
            AppEvent::WorkingDirectoryResolved(result) => match result {
                Ok(dir) => {
                    let waiting: Vec<uuid::Uuid> = self
                        .terminals
                        .sessions()
                        .iter()
                        .filter(|s| s.cwd == UNRESOLVED_CWD)
                        .map(|s| s.id)
                        .collect();
                    for id in waiting {
                        if let Some(session) = self.terminals.get_mut(id) {
                            session.cwd = dir.clone();
                        }
                    }
                    self.start_dir = dir;
                }
                Err(e) => warn!("Could not resolve a working directory: {}", e),
            },
        }
        vec![]
    }

    fn finish_action(&mut self, report: ActionReport) -> Vec<Request> {
        let keys: Vec<&str> = report.keys().collect();
        self.clear_busy(report.kind, &keys);

        if let Some(summary) = report.summary() {
            info!("{}", summary);
            self.add_notification(summary, NotificationLevel::Success);
        }

        let force_offer = match report.sole_failure() {
            Some(failure)
                if report.kind == ResourceKind::Image
                    && report.verb == "remove"
                    && !report.forced
                    && failure.error.kind() == FailureKind::InUse =>
            {
                Some(offer_force_remove(
                    &failure.target.key,
                    &failure.target.name,
                    failure.error.message(),
                ))
            }
            _ => None,
        };

        if let Some(offer) = force_offer {
            self.modal = Some(Modal::Confirm(offer.dialog));
            self.pending = Some(offer.action);
        } else if let Some(message) = report.failure_message() {
            self.modal = Some(Modal::Error(message));
        }

        if report.any_succeeded() {
            vec![self.refresh(report.kind)]
        } else {
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ActionFailure;
    use crate::core::{BridgeError, ContainerState, TerminalOutput};
    use crate::state::selection::HeaderCheck;
    use pretty_assertions::assert_eq;

    fn container(id: &str, name: &str, project: Option<&str>, state: ContainerState) -> ContainerInfo {
        ContainerInfo {
            id: id.to_string(),
            name: name.to_string(),
            project: project.map(str::to_string),
            state,
            ..Default::default()
        }
    }

    fn load_containers(state: &mut AppState, containers: Vec<ContainerInfo>) {
        let Request::LoadContainers(ticket) = state.refresh(ResourceKind::Container) else {
            unreachable!()
        };
        state.apply(AppEvent::ContainersLoaded(ticket, Ok(containers)));
    }

    fn load_volumes(state: &mut AppState, names: &[&str]) {
        let Request::LoadVolumes(ticket) = state.refresh(ResourceKind::Volume) else {
            unreachable!()
        };
        let volumes = names
            .iter()
            .map(|name| VolumeInfo {
                name: name.to_string(),
                ..Default::default()
            })
            .collect();
        state.apply(AppEvent::VolumesLoaded(ticket, Ok(volumes)));
    }

    #[test]
    fn test_initial_requests_cover_every_list() {
        let mut state = AppState::default();
        let requests = state.initial_requests();
        assert_eq!(requests.len(), 7);
        assert!(state.containers.store.is_loading());
        assert!(state.networks.store.is_loading());
        assert!(requests.contains(&Request::WorkingDirectory));
    }

    #[test]
    fn test_stale_list_response_is_ignored() {
        let mut state = AppState::default();
        let Request::LoadContainers(old) = state.refresh(ResourceKind::Container) else {
            unreachable!()
        };
        let Request::LoadContainers(new) = state.refresh(ResourceKind::Container) else {
            unreachable!()
        };

        state.apply(AppEvent::ContainersLoaded(
            new,
            Ok(vec![container("c1", "web", None, ContainerState::Running)]),
        ));
        state.apply(AppEvent::ContainersLoaded(old, Ok(vec![])));

        assert_eq!(state.containers.store.items().len(), 1);
        assert!(state.docker_connected);
    }

    #[test]
    fn test_connectivity_failure_marks_disconnected() {
        let mut state = AppState::default();
        state.docker_connected = true;
        let Request::LoadImages(ticket) = state.refresh(ResourceKind::Image) else {
            unreachable!()
        };
        state.apply(AppEvent::ImagesLoaded(
            ticket,
            Err(BridgeError::new("Cannot connect to the Docker daemon")),
        ));

        assert!(!state.docker_connected);
        assert!(state.images.store.error().is_some());
    }

    #[test]
    fn test_group_header_targets_every_member() {
        let mut state = AppState::default();
        load_containers(
            &mut state,
            vec![
                container("a", "myapp-web", Some("myapp"), ContainerState::Running),
                container("b", "myapp-db", Some("myapp"), ContainerState::Exited),
                container("c", "solo", None, ContainerState::Running),
            ],
        );

        assert_eq!(state.current_group().as_deref(), Some("myapp"));
        let requests = state.container_action(ContainerAction::Stop);
        match requests.as_slice() {
            [Request::Lifecycle { action, targets }] => {
                assert_eq!(*action, ContainerAction::Stop);
                let keys: Vec<&str> = targets.iter().map(|t| t.key.as_str()).collect();
                assert_eq!(keys, vec!["b", "a"]);
            }
            other => panic!("unexpected requests: {:?}", other),
        }

        // Same targets again while in flight
        assert!(state.container_action(ContainerAction::Stop).is_empty());
        assert_eq!(state.notifications.last().unwrap().level, NotificationLevel::Warning);
    }

    #[test]
    fn test_enter_on_group_collapses_it() {
        let mut state = AppState::default();
        load_containers(
            &mut state,
            vec![
                container("a", "web", Some("myapp"), ContainerState::Running),
                container("b", "db", Some("myapp"), ContainerState::Running),
            ],
        );
        assert_eq!(state.row_count(), 3);

        assert!(state.toggle_expansion());
        assert_eq!(state.row_count(), 1);
        assert!(state.containers.selection.is_empty());

        state.move_cursor(1);
        assert!(state.toggle_expansion());
        assert_eq!(state.row_count(), 3);
        state.move_cursor(1);
        assert!(!state.toggle_expansion());
    }

    #[test]
    fn test_space_on_group_selects_every_member() {
        let mut state = AppState::default();
        load_containers(
            &mut state,
            vec![
                container("a", "web", Some("myapp"), ContainerState::Running),
                container("b", "db", Some("myapp"), ContainerState::Running),
                container("c", "solo", None, ContainerState::Running),
            ],
        );
        state.move_cursor(3);
        state.toggle_current();
        assert!(state.containers.selection.contains("c"));

        state.move_cursor(-3);
        state.toggle_current();
        assert_eq!(state.row_count(), 4);
        assert_eq!(state.containers.selection.len(), 3);
        let group = state.containers.selection.group_check(&["a", "b"]);
        assert_eq!(group, HeaderCheck::Checked);

        state.toggle_current();
        assert_eq!(state.containers.selection.keys().collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn test_refresh_keeps_cursor_on_last_grouped_row() {
        let mut state = AppState::default();
        let containers = vec![
            container("w", "web", Some("myapp"), ContainerState::Running),
            container("d", "db", Some("myapp"), ContainerState::Running),
        ];
        load_containers(&mut state, containers.clone());
        state.move_cursor(2);
        assert_eq!(state.current_container().map(|c| c.id.as_str()), Some("w"));

        let Some(Request::LoadContainers(ticket)) = state.stats_tick().into_iter().next() else {
            panic!("stats tick should reload containers");
        };
        state.apply(AppEvent::ContainersLoaded(ticket, Ok(containers)));

        assert_eq!(state.cursor(), 2);
        assert_eq!(state.current_container().map(|c| c.id.as_str()), Some("w"));
    }

    #[test]
    fn test_refresh_follows_container_when_rows_above_vanish() {
        let mut state = AppState::default();
        load_containers(
            &mut state,
            vec![
                container("d", "db", Some("myapp"), ContainerState::Running),
                container("s", "solo", None, ContainerState::Running),
            ],
        );
        state.move_cursor(2);
        assert_eq!(state.current_container().map(|c| c.id.as_str()), Some("s"));

        load_containers(&mut state, vec![container("s", "solo", None, ContainerState::Running)]);
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.current_container().map(|c| c.id.as_str()), Some("s"));

        load_containers(&mut state, vec![]);
        assert_eq!(state.cursor(), 0);
        assert!(state.current_container().is_none());
    }

    #[test]
    fn test_refresh_keeps_flat_cursor_on_same_volume() {
        let mut state = AppState::default();
        state.switch_tab(Tab::Volumes);
        load_volumes(&mut state, &["a", "b", "c"]);
        state.move_cursor(2);

        load_volumes(&mut state, &["b", "c"]);
        assert_eq!(state.volumes.current().map(|v| v.name.as_str()), Some("c"));

        load_volumes(&mut state, &["a"]);
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_remove_confirm_then_cancel_runs_nothing() {
        let mut state = AppState::default();
        state.switch_tab(Tab::Volumes);
        load_volumes(&mut state, &["data"]);

        state.request_remove();
        assert!(matches!(state.modal, Some(Modal::Confirm(_))));
        state.cancel_modal();
        assert!(state.pending.is_none());
        assert!(state.confirm().is_empty());
    }

    #[test]
    fn test_volume_in_use_failure_keeps_volume_listed() {
        let mut state = AppState::default();
        state.switch_tab(Tab::Volumes);
        load_volumes(&mut state, &["data"]);

        state.request_remove();
        let requests = state.confirm();
        assert!(matches!(requests.as_slice(), [Request::Remove { .. }]));
        assert!(state.volumes.is_busy("data"));

        let report = ActionReport {
            kind: ResourceKind::Volume,
            verb: "remove",
            past_tense: "removed",
            succeeded: vec![],
            failed: vec![ActionFailure {
                target: ActionTarget::new("data", "data"),
                error: BridgeError::new("remove data: volume is in use - [abc123]"),
            }],
            forced: false,
        };
        let follow_up = state.apply(AppEvent::ActionFinished(report));

        assert!(follow_up.is_empty());
        assert!(!state.volumes.is_busy("data"));
        assert_eq!(state.volumes.store.items().len(), 1);
        match &state.modal {
            Some(Modal::Error(message)) => {
                assert!(message.contains("volume is in use"));
                assert!(message.contains(FailureKind::InUse.hint().unwrap()));
            }
            other => panic!("expected error modal, got {:?}", other),
        }
    }

    #[test]
    fn test_image_in_use_offers_force_remove() {
        let mut state = AppState::default();
        let report = ActionReport {
            kind: ResourceKind::Image,
            verb: "remove",
            past_tense: "removed",
            succeeded: vec![],
            failed: vec![ActionFailure {
                target: ActionTarget::new("sha256:1", "nginx:latest"),
                error: BridgeError::new("conflict: unable to delete sha256:1 - image is being used by running container"),
            }],
            forced: false,
        };
        state.apply(AppEvent::ActionFinished(report));

        assert!(matches!(state.modal, Some(Modal::Confirm(_))));
        let requests = state.confirm();
        assert!(matches!(requests.as_slice(), [Request::ForceRemoveImage(t)] if t.key == "sha256:1"));
    }

    #[test]
    fn test_success_refreshes_the_list() {
        let mut state = AppState::default();
        let report = ActionReport {
            kind: ResourceKind::Container,
            verb: "start",
            past_tense: "started",
            succeeded: vec![ActionTarget::new("c1", "web")],
            failed: vec![],
            forced: false,
        };
        let requests = state.apply(AppEvent::ActionFinished(report));

        assert!(matches!(requests.as_slice(), [Request::LoadContainers(_)]));
        assert_eq!(state.notifications.last().unwrap().message, "Started container 'web'");
        assert!(state.modal.is_none());
    }

    #[test]
    fn test_system_network_cannot_be_selected_or_removed() {
        let mut state = AppState::default();
        state.switch_tab(Tab::Networks);
        let Request::LoadNetworks(ticket) = state.refresh(ResourceKind::Network) else {
            unreachable!()
        };
        state.apply(AppEvent::NetworksLoaded(
            ticket,
            Ok(vec![NetworkInfo {
                id: "n1".into(),
                name: "bridge".into(),
                ..Default::default()
            }]),
        ));

        state.toggle_current();
        assert!(state.networks.selection.is_empty());
        assert_eq!(state.networks.header(), HeaderCheck::Unchecked);

        state.request_remove();
        assert!(state.modal.is_none());
        assert!(state.notifications.last().unwrap().message.contains("system network"));
    }

    #[test]
    fn test_empty_volume_name_is_rejected() {
        let mut state = AppState::default();
        state.open_create_volume();
        state.input_char(' ');
        assert!(state.submit_input().is_empty());
        assert!(matches!(state.modal, Some(Modal::Input(_))));

        state.input_backspace();
        for c in "pgdata".chars() {
            state.input_char(c);
        }
        assert_eq!(state.submit_input(), vec![Request::CreateVolume("pgdata".into())]);
        assert!(state.modal.is_none());
    }

    #[test]
    fn test_log_backlog_then_follow() {
        let mut state = AppState::default();
        load_containers(&mut state, vec![container("c1", "web", None, ContainerState::Running)]);

        let requests = state.open_logs();
        assert_eq!(
            requests,
            vec![Request::LoadLogs {
                id: "c1".into(),
                tail: 200
            }]
        );

        let follow = state.apply(AppEvent::LogsLoaded {
            id: "c1".into(),
            result: Ok("10:00:00 booting\n10:00:01 ready".into()),
        });
        assert_eq!(follow, vec![Request::FollowLogs("c1".into())]);
        assert_eq!(state.stream.as_ref().unwrap().lines.len(), 2);

        assert_eq!(state.close_stream(), vec![Request::StopLogs("c1".into())]);
        assert!(state.stream.is_none());
    }

    #[test]
    fn test_follower_started_after_close_is_stopped() {
        let mut state = AppState::default();
        load_containers(&mut state, vec![container("c1", "web", None, ContainerState::Running)]);
        state.open_logs();
        let follow = state.apply(AppEvent::LogsLoaded {
            id: "c1".into(),
            result: Ok("ready".into()),
        });
        assert_eq!(follow, vec![Request::FollowLogs("c1".into())]);

        // Overlay closed before the follower registered
        assert_eq!(state.close_stream(), vec![Request::StopLogs("c1".into())]);
        let late = state.apply(AppEvent::FollowStarted {
            id: "c1".into(),
            result: Ok(()),
        });
        assert_eq!(late, vec![Request::StopLogs("c1".into())]);

        // Still open: nothing to stop
        state.open_logs();
        let started = state.apply(AppEvent::FollowStarted {
            id: "c1".into(),
            result: Ok(()),
        });
        assert!(started.is_empty());
    }

    #[test]
    fn test_exec_lines_wait_for_shell() {
        let mut state = AppState::default();
        load_containers(&mut state, vec![container("c1", "web", None, ContainerState::Running)]);
        assert_eq!(state.open_exec(), vec![Request::StartShell("c1".into())]);

        state.stream.as_mut().unwrap().input = "ls /".into();
        assert!(state.submit_exec().is_empty());

        state.apply(AppEvent::ShellStarted {
            id: "c1".into(),
            result: Ok("/bin/bash".into()),
        });
        let requests = state.submit_exec();
        assert_eq!(
            requests,
            vec![Request::Exec {
                id: "c1".into(),
                command: vec!["/bin/bash".into(), "-c".into(), "ls /".into()],
            }]
        );
        assert!(state.stream.as_ref().unwrap().running);
    }

    #[test]
    fn test_terminal_results_route_to_their_session() {
        let mut state = AppState::default();
        state.apply(AppEvent::WorkingDirectoryResolved(Ok("/home/dev".into())));
        assert_eq!(state.terminals.active().cwd, "/home/dev");

        state.terminals.active_mut().draft = "ls".into();
        let requests = state.submit_terminal();
        let Some(Request::Terminal(crate::state::terminal::TerminalRequest::Execute {
            session,
            entry,
            cwd,
            ..
        })) = requests.into_iter().next()
        else {
            panic!("expected an execute request");
        };
        assert_eq!(cwd, "/home/dev");

        state.apply(AppEvent::CommandFinished {
            session,
            entry,
            result: Ok(TerminalOutput::local("a.txt\n")),
        });
        assert!(!state.terminals.active().is_executing());

        state.open_terminal();
        assert_eq!(state.terminals.active().cwd, "/home/dev");
    }

    #[test]
    fn test_notification_limit() {
        let mut state = AppState::default();
        for i in 0..15 {
            state.add_notification(format!("n{}", i), NotificationLevel::Info);
        }
        assert_eq!(state.notifications.len(), 10);
        assert_eq!(state.notifications[0].message, "n5");
    }
}

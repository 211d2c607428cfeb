//! Per-tab view over one resource collection

use std::collections::HashSet;

use crate::core::{BridgeResult, Rejection, ResourceKind};
use crate::state::columns::{ColumnConfig, ColumnControl, ColumnSet};
use crate::state::list::{ListStore, LoadOutcome, LoadTicket, Resource};
use crate::state::selection::{HeaderCheck, Selection};

pub struct ResourceView<T: Resource> {
    pub store: ListStore<T>,
    pub columns: ColumnSet<T>,
    pub selection: Selection,
    filter: String,
    /// Keys with an action in flight
    busy: HashSet<String>,
    cursor: usize,
}

impl<T: Resource> ResourceView<T> {
    pub fn new(columns: ColumnSet<T>) -> Self {
        Self {
            store: ListStore::new(),
            columns,
            selection: Selection::new(),
            filter: String::new(),
            busy: HashSet::new(),
            cursor: 0,
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.cursor = 0;
        self.prune_selection();
    }

    pub fn push_filter_char(&mut self, c: char) {
        let mut filter = std::mem::take(&mut self.filter);
        filter.push(c);
        self.set_filter(filter);
    }

    pub fn pop_filter_char(&mut self) {
        let mut filter = std::mem::take(&mut self.filter);
        filter.pop();
        self.set_filter(filter);
    }

    /// The loaded collection projected through the search filter
    pub fn filtered(&self) -> Vec<&T> {
        self.store
            .items()
            .iter()
            .filter(|item| self.columns.matches(item, &self.filter))
            .collect()
    }

    /// Keys eligible for "select all": visible and not protected
    pub fn selectable_keys(&self) -> Vec<&str> {
        self.filtered()
            .into_iter()
            .filter(|item| !item.is_protected())
            .map(Resource::key)
            .collect()
    }

    pub fn header(&self) -> HeaderCheck {
        self.selection.header(&self.selectable_keys())
    }

    pub fn toggle_selected(&mut self, key: &str) -> Result<bool, Rejection> {
        if let Some(reason) = self.store.get(key).and_then(Resource::protection) {
            return Err(reason);
        }
        Ok(self.selection.toggle(key))
    }

    pub fn toggle_all(&mut self) {
        let keys: Vec<String> = self.selectable_keys().into_iter().map(str::to_string).collect();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.selection.toggle_all(&keys);
    }

    fn prune_selection(&mut self) {
        let keys: Vec<String> = self.selectable_keys().into_iter().map(str::to_string).collect();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.selection.prune(&keys);
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.store.begin_load()
    }

    /// Apply a list response. The cursor is left alone; the caller knows how
    /// rows map to items and repositions it.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: BridgeResult<Vec<T>>) -> LoadOutcome {
        let outcome = self.store.finish_load(ticket, result);
        if outcome == LoadOutcome::Applied {
            self.prune_selection();
        }
        outcome
    }

    /// Teardown: drop data and make in-flight responses stale
    pub fn reset(&mut self) {
        self.store.reset();
        self.selection.clear();
        self.busy.clear();
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    pub fn clamp_cursor(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn place_cursor(&mut self, index: usize, len: usize) {
        self.cursor = index;
        self.clamp_cursor(len);
    }

    /// Row under the cursor in an ungrouped table
    pub fn current(&self) -> Option<&T> {
        self.filtered().get(self.cursor).copied()
    }

    /// The selection if there is one, otherwise the row under the cursor
    pub fn action_targets(&self) -> Vec<&T> {
        if self.selection.is_empty() {
            self.current().into_iter().collect()
        } else {
            self.filtered()
                .into_iter()
                .filter(|item| self.selection.contains(item.key()))
                .collect()
        }
    }

    /// Mark keys busy; returns false when any of them already was
    pub fn mark_busy<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) -> bool {
        let keys: Vec<&str> = keys.into_iter().collect();
        if keys.iter().any(|key| self.busy.contains(*key)) {
            return false;
        }
        self.busy.extend(keys.into_iter().map(str::to_string));
        true
    }

    pub fn clear_busy<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) {
        for key in keys {
            self.busy.remove(key);
        }
    }

    pub fn is_busy(&self, key: &str) -> bool {
        self.busy.contains(key)
    }
}

/// Kind-independent handle on the active tab's view
pub trait ListView {
    fn kind(&self) -> ResourceKind;
    fn filter_text(&self) -> &str;
    fn push_filter(&mut self, c: char);
    fn pop_filter(&mut self);
    fn clear_filter(&mut self);
    fn toggle_all_selected(&mut self);
    fn header_check(&self) -> HeaderCheck;
    fn selected_count(&self) -> usize;
    fn clear_selection(&mut self);
    fn column_control(&mut self) -> &mut dyn ColumnControl;
    fn column_configs(&self) -> Vec<ColumnConfig>;
    fn is_loading(&self) -> bool;
    fn load_error(&self) -> Option<&str>;
    fn has_loaded(&self) -> bool;
    fn total(&self) -> usize;
    fn visible_count(&self) -> usize;
}

impl<T: Resource> ListView for ResourceView<T> {
    fn kind(&self) -> ResourceKind {
        T::KIND
    }

    fn filter_text(&self) -> &str {
        &self.filter
    }

    fn push_filter(&mut self, c: char) {
        self.push_filter_char(c);
    }

    fn pop_filter(&mut self) {
        self.pop_filter_char();
    }

    fn clear_filter(&mut self) {
        self.set_filter("");
    }

    fn toggle_all_selected(&mut self) {
        self.toggle_all();
    }

    fn header_check(&self) -> HeaderCheck {
        self.header()
    }

    fn selected_count(&self) -> usize {
        self.selection.len()
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn column_control(&mut self) -> &mut dyn ColumnControl {
        &mut self.columns
    }

    fn column_configs(&self) -> Vec<ColumnConfig> {
        self.columns.column_configs()
    }

    fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    fn load_error(&self) -> Option<&str> {
        self.store.error()
    }

    fn has_loaded(&self) -> bool {
        self.store.has_loaded()
    }

    fn total(&self) -> usize {
        self.store.items().len()
    }

    fn visible_count(&self) -> usize {
        self.filtered().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NetworkInfo;
    use crate::state::columns::NETWORK_COLUMNS;

    fn network(id: &str, name: &str) -> NetworkInfo {
        NetworkInfo {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn loaded_view() -> ResourceView<NetworkInfo> {
        let mut view = ResourceView::new(ColumnSet::new(NETWORK_COLUMNS, false));
        let ticket = view.begin_load();
        view.finish_load(
            ticket,
            Ok(vec![
                network("n1", "bridge"),
                network("n2", "app_default"),
                network("n3", "app_backend"),
                network("n4", "other"),
            ]),
        );
        view
    }

    #[test]
    fn test_filter_is_a_projection() {
        let mut view = loaded_view();
        view.set_filter("APP");
        let names: Vec<_> = view.filtered().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["app_default", "app_backend"]);
        assert_eq!(view.store.items().len(), 4);
    }

    #[test]
    fn test_select_all_skips_system_networks() {
        let mut view = loaded_view();
        view.toggle_all();
        assert_eq!(view.selection.len(), 3);
        assert!(!view.selection.contains("n1"));
        assert_eq!(view.header(), HeaderCheck::Checked);
    }

    #[test]
    fn test_system_network_cannot_be_selected() {
        let mut view = loaded_view();
        let err = view.toggle_selected("n1").unwrap_err();
        assert_eq!(
            err,
            Rejection::SystemNetwork {
                name: "bridge".to_string()
            }
        );
        assert!(view.selection.is_empty());
    }

    #[test]
    fn test_header_follows_filter_changes() {
        let mut view = loaded_view();
        view.toggle_selected("n2").unwrap();
        view.toggle_selected("n4").unwrap();
        assert_eq!(view.header(), HeaderCheck::Indeterminate);

        view.set_filter("app");
        assert_eq!(view.selection.keys().collect::<Vec<_>>(), vec!["n2"]);
        assert_eq!(view.header(), HeaderCheck::Indeterminate);

        view.toggle_selected("n3").unwrap();
        assert_eq!(view.header(), HeaderCheck::Checked);
    }

    #[test]
    fn test_refresh_prunes_vanished_selection() {
        let mut view = loaded_view();
        view.toggle_selected("n4").unwrap();
        let ticket = view.begin_load();
        view.finish_load(ticket, Ok(vec![network("n2", "app_default")]));
        assert!(view.selection.is_empty());
        assert_eq!(view.header(), HeaderCheck::Unchecked);
    }

    #[test]
    fn test_busy_blocks_duplicate_action() {
        let mut view = loaded_view();
        assert!(view.mark_busy(["n2"]));
        assert!(!view.mark_busy(["n2", "n3"]));
        assert!(!view.is_busy("n3"));
        view.clear_busy(["n2"]);
        assert!(view.mark_busy(["n2"]));
    }

    #[test]
    fn test_action_targets_prefer_selection() {
        let mut view = loaded_view();
        view.move_cursor(1, 4);
        assert_eq!(view.action_targets()[0].name, "app_default");

        view.toggle_selected("n4").unwrap();
        let names: Vec<_> = view.action_targets().iter().map(|n| n.name.clone()).collect();
        assert_eq!(names, vec!["other"]);
    }
}

//! Selection sets scoped to the filtered view

use std::collections::BTreeSet;

/// State of the "select all" checkbox in a table header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderCheck {
    Checked,
    Indeterminate,
    Unchecked,
}

impl HeaderCheck {
    pub fn symbol(&self) -> &'static str {
        match self {
            HeaderCheck::Checked => "[x]",
            HeaderCheck::Indeterminate => "[-]",
            HeaderCheck::Unchecked => "[ ]",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    keys: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership; returns whether the key is now selected
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.keys.remove(key) {
            false
        } else {
            self.keys.insert(key.to_string());
            true
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn select_all<'a>(&mut self, selectable: impl IntoIterator<Item = &'a str>) {
        self.keys = selectable.into_iter().map(str::to_string).collect();
    }

    /// Header click: select everything visible unless it already is
    pub fn toggle_all(&mut self, selectable: &[&str]) {
        if self.header(selectable) == HeaderCheck::Checked {
            self.clear();
        } else {
            self.select_all(selectable.iter().copied());
        }
    }

    /// Drop keys that are no longer visible and selectable
    pub fn prune(&mut self, selectable: &[&str]) {
        self.keys.retain(|key| selectable.contains(&key.as_str()));
    }

    pub fn header(&self, selectable: &[&str]) -> HeaderCheck {
        let selected = selectable.iter().filter(|key| self.contains(key)).count();
        if selected == 0 {
            HeaderCheck::Unchecked
        } else if selected == selectable.len() && self.keys.len() == selected {
            HeaderCheck::Checked
        } else {
            HeaderCheck::Indeterminate
        }
    }

    /// Checkbox of a group header, independent of keys outside the group
    pub fn group_check(&self, members: &[&str]) -> HeaderCheck {
        let selected = members.iter().filter(|key| self.contains(key)).count();
        if selected == 0 {
            HeaderCheck::Unchecked
        } else if selected == members.len() {
            HeaderCheck::Checked
        } else {
            HeaderCheck::Indeterminate
        }
    }

    /// Select every member unless all already are, then deselect them.
    /// Keys outside the group are untouched. Returns whether the group is now selected.
    pub fn toggle_group(&mut self, members: &[&str]) -> bool {
        if self.group_check(members) == HeaderCheck::Checked {
            for key in members {
                self.keys.remove(*key);
            }
            false
        } else {
            self.keys.extend(members.iter().map(|key| key.to_string()));
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_tri_state() {
        let visible = ["a", "b", "c"];
        let mut selection = Selection::new();
        assert_eq!(selection.header(&visible), HeaderCheck::Unchecked);

        selection.toggle("a");
        assert_eq!(selection.header(&visible), HeaderCheck::Indeterminate);

        selection.toggle("b");
        selection.toggle("c");
        assert_eq!(selection.header(&visible), HeaderCheck::Checked);

        selection.toggle("b");
        assert_eq!(selection.header(&visible), HeaderCheck::Indeterminate);
    }

    #[test]
    fn test_empty_view_is_unchecked() {
        let selection = Selection::new();
        assert_eq!(selection.header(&[]), HeaderCheck::Unchecked);
    }

    #[test]
    fn test_toggle_all_round_trip() {
        let visible = ["a", "b"];
        let mut selection = Selection::new();
        selection.toggle("a");

        selection.toggle_all(&visible);
        assert_eq!(selection.header(&visible), HeaderCheck::Checked);

        selection.toggle_all(&visible);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_prune_after_filter() {
        let mut selection = Selection::new();
        selection.select_all(["a", "b", "c"]);
        selection.prune(&["a", "c"]);
        assert_eq!(selection.keys().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(selection.header(&["a", "c"]), HeaderCheck::Checked);
    }

    #[test]
    fn test_group_toggle_leaves_other_keys() {
        let members = ["web", "db"];
        let mut selection = Selection::new();
        selection.toggle("cache");
        selection.toggle("web");
        assert_eq!(selection.group_check(&members), HeaderCheck::Indeterminate);

        assert!(selection.toggle_group(&members));
        assert_eq!(selection.group_check(&members), HeaderCheck::Checked);
        assert_eq!(selection.len(), 3);

        assert!(!selection.toggle_group(&members));
        assert_eq!(selection.group_check(&members), HeaderCheck::Unchecked);
        assert_eq!(selection.keys().collect::<Vec<_>>(), vec!["cache"]);
    }
}

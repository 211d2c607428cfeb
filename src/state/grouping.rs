//! Compose project grouping for the container table

use std::collections::{BTreeMap, HashMap};

use crate::core::ContainerInfo;

/// Containers sharing one compose project
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectGroup<'a> {
    pub name: &'a str,
    pub members: Vec<&'a ContainerInfo>,
}

impl<'a> ProjectGroup<'a> {
    pub fn total(&self) -> usize {
        self.members.len()
    }

    pub fn running(&self) -> usize {
        self.members.iter().filter(|c| c.state.is_running()).count()
    }

    /// e.g. "1 of 2 running"
    pub fn summary(&self) -> String {
        format!("{} of {} running", self.running(), self.total())
    }

    pub fn member_ids(&self) -> Vec<String> {
        self.members.iter().map(|c| c.id.clone()).collect()
    }

    pub fn member_keys(&self) -> Vec<&'a str> {
        self.members.iter().map(|c| c.id.as_str()).collect()
    }
}

/// Result of grouping a flat container list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouped<'a> {
    pub groups: Vec<ProjectGroup<'a>>,
    pub standalone: Vec<&'a ContainerInfo>,
}

fn by_name(a: &&ContainerInfo, b: &&ContainerInfo) -> std::cmp::Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}

/// Split containers into project groups and standalone rows, all sorted by name
pub fn group_containers<'a>(containers: impl IntoIterator<Item = &'a ContainerInfo>) -> Grouped<'a> {
    let mut projects: BTreeMap<&'a str, Vec<&'a ContainerInfo>> = BTreeMap::new();
    let mut standalone = Vec::new();

    for container in containers {
        match container.project.as_deref() {
            Some(project) if !project.is_empty() => {
                projects.entry(project).or_default().push(container)
            }
            _ => standalone.push(container),
        }
    }

    let groups = projects
        .into_iter()
        .map(|(name, mut members)| {
            members.sort_by(by_name);
            ProjectGroup { name, members }
        })
        .collect();
    standalone.sort_by(by_name);

    Grouped { groups, standalone }
}

/// Expand/collapse state per group name; survives regrouping
#[derive(Debug, Clone, Default)]
pub struct GroupExpansion {
    expanded: HashMap<String, bool>,
}

impl GroupExpansion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, group: &str) -> bool {
        self.expanded.get(group).copied().unwrap_or(true)
    }

    /// Returns the new state
    pub fn toggle(&mut self, group: &str) -> bool {
        let expanded = !self.is_expanded(group);
        self.expanded.insert(group.to_string(), expanded);
        expanded
    }

    pub fn set(&mut self, group: &str, expanded: bool) {
        self.expanded.insert(group.to_string(), expanded);
    }
}

/// One line of the grouped container table
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerRow<'a> {
    Group {
        group: ProjectGroup<'a>,
        expanded: bool,
    },
    Member(&'a ContainerInfo),
    Standalone(&'a ContainerInfo),
}

impl<'a> ContainerRow<'a> {
    pub fn container(&self) -> Option<&'a ContainerInfo> {
        match self {
            ContainerRow::Member(c) | ContainerRow::Standalone(c) => Some(c),
            ContainerRow::Group { .. } => None,
        }
    }
}

/// Flatten groups into display rows: each group header followed by its members
/// when expanded, then the standalone containers
pub fn flatten<'a>(grouped: Grouped<'a>, expansion: &GroupExpansion) -> Vec<ContainerRow<'a>> {
    let mut rows = Vec::new();
    for group in grouped.groups {
        let expanded = expansion.is_expanded(group.name);
        let members = if expanded { group.members.clone() } else { Vec::new() };
        rows.push(ContainerRow::Group { group, expanded });
        rows.extend(members.into_iter().map(ContainerRow::Member));
    }
    rows.extend(grouped.standalone.into_iter().map(ContainerRow::Standalone));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ContainerState;
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

    fn fixture() -> Vec<ContainerInfo> {
        vec![
            container("4", "worker", Some("shop"), ContainerState::Running),
            container("2", "db", Some("myapp"), ContainerState::Exited),
            container("5", "solo", None, ContainerState::Running),
            container("1", "web", Some("myapp"), ContainerState::Running),
            container("3", "adhoc", Some(""), ContainerState::Exited),
        ]
    }

    fn shape(grouped: &Grouped<'_>) -> (Vec<(String, Vec<String>)>, Vec<String>) {
        (
            grouped
                .groups
                .iter()
                .map(|g| (g.name.to_string(), g.member_ids()))
                .collect(),
            grouped.standalone.iter().map(|c| c.id.clone()).collect(),
        )
    }

    #[test]
    fn test_groups_sorted_with_standalone_rows() {
        let containers = fixture();
        let grouped = group_containers(&containers);
        let (groups, standalone) = shape(&grouped);

        assert_eq!(
            groups,
            vec![
                ("myapp".to_string(), vec!["2".to_string(), "1".to_string()]),
                ("shop".to_string(), vec!["4".to_string()]),
            ]
        );
        assert_eq!(standalone, vec!["3".to_string(), "5".to_string()]);
        assert_eq!(grouped.groups[0].summary(), "1 of 2 running");
    }

    #[test]
    fn test_grouping_is_order_independent_and_idempotent() {
        let containers = fixture();
        let mut reversed = containers.clone();
        reversed.reverse();

        let first = group_containers(&containers);
        let again = group_containers(&containers);
        let shuffled = group_containers(&reversed);

        assert_eq!(shape(&first), shape(&again));
        assert_eq!(shape(&first), shape(&shuffled));
    }

    #[test]
    fn test_expansion_survives_regrouping() {
        let mut expansion = GroupExpansion::new();
        assert!(expansion.is_expanded("myapp"));
        assert!(!expansion.toggle("myapp"));

        let mut containers = fixture();
        containers.retain(|c| c.id != "2");
        let rows = flatten(group_containers(&containers), &expansion);

        match &rows[0] {
            ContainerRow::Group { group, expanded } => {
                assert_eq!(group.name, "myapp");
                assert!(!expanded);
            }
            other => panic!("expected group header, got {:?}", other),
        }
        // Collapsed group hides its member; shop stays expanded
        assert!(matches!(rows[1], ContainerRow::Group { .. }));
        assert_eq!(rows[2].container().map(|c| c.name.as_str()), Some("worker"));
    }

    #[test]
    fn test_membership_is_recomputed() {
        let mut containers = fixture();
        let before = group_containers(&containers).groups[0].total();
        containers[1].project = None;
        let after = group_containers(&containers);
        assert_eq!(before, 2);
        assert_eq!(after.groups[0].total(), 1);
        assert!(after.standalone.iter().any(|c| c.id == "2"));
    }
}

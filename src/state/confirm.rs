//! Confirmation gating for destructive actions

use crate::core::{ConfirmDialog, Rejection, ResourceKind};
use crate::state::list::Resource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalTarget {
    pub key: String,
    pub name: String,
    pub force: bool,
}

/// What runs once the user confirms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Remove {
        kind: ResourceKind,
        targets: Vec<RemovalTarget>,
    },
    ForceRemoveImage(RemovalTarget),
}

#[derive(Debug, Clone)]
pub struct PendingConfirm {
    pub dialog: ConfirmDialog,
    pub action: PendingAction,
}

/// Build the confirmation for removing `items`, or refuse locally
pub fn request_removal<T: Resource>(items: &[&T]) -> Result<PendingConfirm, Rejection> {
    if items.is_empty() {
        return Err(Rejection::EmptySelection);
    }
    if let Some(reason) = items.iter().find_map(|item| item.protection()) {
        return Err(reason);
    }

    let noun = T::KIND.noun();
    let targets: Vec<RemovalTarget> = items
        .iter()
        .map(|item| RemovalTarget {
            key: item.key().to_string(),
            name: item.display_name(),
            force: item.needs_force_removal(),
        })
        .collect();

    let (title, mut message) = match targets.as_slice() {
        [single] => (
            format!("Remove {}", noun),
            format!("Remove {} '{}'? This cannot be undone.", noun, single.name),
        ),
        many => (
            format!("Remove {} {}s", many.len(), noun),
            format!(
                "Remove {} {}s: {}? This cannot be undone.",
                many.len(),
                noun,
                many.iter()
                    .map(|t| t.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ),
    };
    if targets.iter().any(|t| t.force) {
        message.push_str(" Running containers will be stopped first.");
    }

    Ok(PendingConfirm {
        dialog: ConfirmDialog::new(title, message).with_labels("Remove", "Cancel"),
        action: PendingAction::Remove {
            kind: T::KIND,
            targets,
        },
    })
}

/// Second-chance prompt after an image removal failed because it is in use
pub fn offer_force_remove(key: &str, name: &str, error: &str) -> PendingConfirm {
    let message = format!(
        "{}\n\nForce remove image '{}'? Containers using it will keep running but lose their image reference.",
        error, name
    );
    PendingConfirm {
        dialog: ConfirmDialog::new("Image in use", message).with_labels("Force remove", "Cancel"),
        action: PendingAction::ForceRemoveImage(RemovalTarget {
            key: key.to_string(),
            name: name.to_string(),
            force: true,
        }),
    }
}

/// Trimmed volume name, or a local rejection when empty
pub fn validate_volume_name(input: &str) -> Result<String, Rejection> {
    let name = input.trim();
    if name.is_empty() {
        Err(Rejection::EmptyVolumeName)
    } else {
        Ok(name.to_string())
    }
}

//! Core type definitions and shared types

/// Notification level for status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationLevel::Info => write!(f, "INFO"),
            NotificationLevel::Success => write!(f, "SUCCESS"),
            NotificationLevel::Warning => write!(f, "WARNING"),
            NotificationLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// The four listable resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Container,
    Image,
    Volume,
    Network,
}

impl ResourceKind {
    pub fn noun(&self) -> &'static str {
        match self {
            ResourceKind::Container => "container",
            ResourceKind::Image => "image",
            ResourceKind::Volume => "volume",
            ResourceKind::Network => "network",
        }
    }

    /// Key used for this kind's table in config files
    pub fn table_key(&self) -> &'static str {
        match self {
            ResourceKind::Container => "containers",
            ResourceKind::Image => "images",
            ResourceKind::Volume => "volumes",
            ResourceKind::Network => "networks",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.noun())
    }
}

/// Application tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Containers,
    Images,
    Volumes,
    Networks,
    Terminal,
}

impl Tab {
    /// Get all available tabs
    pub fn all() -> &'static [Tab] {
        &[
            Tab::Containers,
            Tab::Images,
            Tab::Volumes,
            Tab::Networks,
            Tab::Terminal,
        ]
    }

    /// Get the display name for this tab
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Containers => "Containers",
            Tab::Images => "Images",
            Tab::Volumes => "Volumes",
            Tab::Networks => "Networks",
            Tab::Terminal => "Terminal",
        }
    }

    /// Get the shortcut key for this tab (1-5)
    pub fn shortcut(&self) -> char {
        match self {
            Tab::Containers => '1',
            Tab::Images => '2',
            Tab::Volumes => '3',
            Tab::Networks => '4',
            Tab::Terminal => '5',
        }
    }

    /// Resource kind listed on this tab, if any
    pub fn resource_kind(&self) -> Option<ResourceKind> {
        match self {
            Tab::Containers => Some(ResourceKind::Container),
            Tab::Images => Some(ResourceKind::Image),
            Tab::Volumes => Some(ResourceKind::Volume),
            Tab::Networks => Some(ResourceKind::Network),
            Tab::Terminal => None,
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Modal dialog types
#[derive(Debug, Clone)]
pub enum Modal {
    Confirm(ConfirmDialog),
    Input(InputDialog),
    /// Blocking acknowledgement of a failed action
    Error(String),
    /// Scrollable read-only document (inspect output)
    Document { title: String, body: String },
}

/// Confirmation dialog content
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl ConfirmDialog {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            confirm_label: "Confirm".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }

    pub fn with_labels(
        mut self,
        confirm: impl Into<String>,
        cancel: impl Into<String>,
    ) -> Self {
        self.confirm_label = confirm.into();
        self.cancel_label = cancel.into();
        self
    }
}

/// What an input dialog's value is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
    CreateVolume,
}

/// Input dialog content
#[derive(Debug, Clone)]
pub struct InputDialog {
    pub title: String,
    pub prompt: String,
    pub value: String,
    pub purpose: InputPurpose,
}

impl InputDialog {
    pub fn create_volume() -> Self {
        Self {
            title: "Create Volume".to_string(),
            prompt: "Volume name:".to_string(),
            value: String::new(),
            purpose: InputPurpose::CreateVolume,
        }
    }
}

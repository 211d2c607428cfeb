//! Docker Engine adapter used by the production bridge

pub mod client;
pub mod containers;
pub mod exec;
pub mod images;
pub mod logs;
pub mod networks;
pub mod stats;
pub mod system;
pub mod volumes;

pub use client::DockerClient;
pub use exec::{preferred_shell, ExecDefaults, ExecRun};
pub use logs::LogLine;

/// Result of an engine adapter call
pub type DockerResult<T> = std::result::Result<T, crate::core::DockerError>;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::{debug, info};

use crate::core::ConfigError;

pub mod model;

pub use model::*;

/// File name looked up in the working directory
pub const LOCAL_CONFIG: &str = "dockdeck.toml";

impl Config {
    /// Load configuration from a specific file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!("Configuration loaded and validated successfully");

        Ok(config)
    }

    /// Explicit path first, then the user config dir, then `./dockdeck.toml`
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            return Self::load(&path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            return Self::load(&local_config);
        }

        info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "dockdeck", "dockdeck")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.general.stats_interval_ms < 500 {
            return Err(ConfigError::Validation(
                "stats_interval_ms must be at least 500".into(),
            ));
        }

        if self.general.system_stats_interval_ms < 500 {
            return Err(ConfigError::Validation(
                "system_stats_interval_ms must be at least 500".into(),
            ));
        }

        if self.general.log_tail == 0 {
            return Err(ConfigError::Validation("log_tail must be at least 1".into()));
        }

        let known = ["containers", "images", "volumes", "networks"];
        if let Some(table) = self
            .ui
            .hidden_columns
            .keys()
            .find(|table| !known.contains(&table.as_str()))
        {
            return Err(ConfigError::Validation(format!(
                "unknown table in ui.hidden_columns: {}",
                table
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let invalid_config = Config {
            general: GeneralConfig {
                stats_interval_ms: 50,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(invalid_config.validate().is_err());

        let mut unknown_table = Config::default();
        unknown_table
            .ui
            .hidden_columns
            .insert("pods".into(), vec!["name".into()]);
        assert!(unknown_table.validate().is_err());
    }

    #[test]
    fn test_serialized_config_loads_back() {
        let mut config = Config::default();
        config.general.log_tail = 50;
        config.docker.host = Some("tcp://10.0.0.2:2375".into());
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load(temp_file.path()).unwrap();
        assert_eq!(loaded.general.log_tail, 50);
        assert_eq!(loaded.docker.host.as_deref(), Some("tcp://10.0.0.2:2375"));
    }

    #[test]
    fn test_explicit_path_wins() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[general]\nstats_interval_ms = 10000").unwrap();

        let config = Config::discover(Some(file.path())).unwrap();
        assert_eq!(config.general.stats_interval_ms, 10000);
        assert_eq!(config.general.system_stats_interval_ms, 5000);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[general]\nlog_tail = 0").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("log_tail"));
    }
}

//! Configuration loading and root folder resolution

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default meter-analyzer endpoint (local syllable/stress service)
pub const DEFAULT_ANALYZER_URL: &str = "http://127.0.0.1:5000";

/// Remote project-store credentials; sync is silently skipped when absent
#[derive(Debug, Clone, Deserialize)]
pub struct CloudConfig {
    /// Base URL of the remote project store
    pub base_url: String,
    /// Authenticated user the project documents belong to
    pub user_id: String,
    /// Bearer token sent with every sync request
    pub session_token: String,
}

/// Service configuration loaded from the TOML config file
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServiceConfig {
    pub root_folder: Option<String>,
    pub analyzer_url: Option<String>,
    pub cloud: Option<CloudConfig>,
}

impl ServiceConfig {
    /// Load from a TOML file; missing file yields the empty config
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(
    cli_arg: Option<&str>,
    env_var_name: &str,
    config: &ServiceConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return PathBuf::from(path);
    }

    default_root_folder()
}

/// Get default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("letra").join("config.toml"))
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("letra"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/letra"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("letra"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/letra"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("letra"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\letra"))
    } else {
        PathBuf::from("./letra_data")
    }
}

/// Ensure the root folder exists and return the database path inside it
pub fn database_path(root_folder: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(root_folder)?;
    Ok(root_folder.join("letra.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_wins_over_everything() {
        let config = ServiceConfig {
            root_folder: Some("/from/toml".to_string()),
            ..Default::default()
        };
        let resolved = resolve_root_folder(Some("/from/cli"), "LETRA_TEST_UNSET", &config);
        assert_eq!(resolved, PathBuf::from("/from/cli"));
    }

    #[test]
    fn toml_value_used_when_cli_and_env_absent() {
        let config = ServiceConfig {
            root_folder: Some("/from/toml".to_string()),
            ..Default::default()
        };
        let resolved = resolve_root_folder(None, "LETRA_TEST_UNSET", &config);
        assert_eq!(resolved, PathBuf::from("/from/toml"));
    }

    #[test]
    fn missing_config_file_yields_empty_config() {
        let config = ServiceConfig::load(Path::new("/nonexistent/letra/config.toml")).unwrap();
        assert!(config.root_folder.is_none());
        assert!(config.cloud.is_none());
    }

    #[test]
    fn config_file_parses_cloud_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
analyzer_url = "http://127.0.0.1:6000"

[cloud]
base_url = "https://store.example"
user_id = "u1"
session_token = "tok"
"#,
        )
        .unwrap();

        let config = ServiceConfig::load(&path).unwrap();
        assert_eq!(config.analyzer_url.as_deref(), Some("http://127.0.0.1:6000"));
        assert_eq!(config.cloud.as_ref().unwrap().user_id, "u1");
    }
}

//! Session setup and initialization

use crate::api::{ApiClient, Backend};
use crate::config::{Config, get_config_path};
use crate::environment::Environment;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable selecting the backend when no URL is given.
pub const ENVIRONMENT_VAR: &str = "MARI_ENVIRONMENT";

/// Session data for both TUI and headless modes
pub struct SessionData {
    /// Backend every request goes through.
    pub backend: Arc<dyn Backend>,
    /// Where the configuration lives; cleared on logout.
    pub config_path: PathBuf,
    /// Default directory for spreadsheet exports.
    pub export_dir: PathBuf,
}

/// Reads the config file, treating a missing or unreadable file as empty.
fn load_config(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match Config::load_from_file(path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring unreadable config at {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Picks the backend URL: `--api-url` first, then the remembered one.
fn resolve_environment(api_url: Option<&str>, config: &Config) -> Environment {
    let remembered = Some(config.api_url.as_str()).filter(|url| !url.is_empty());
    let env_value = std::env::var(ENVIRONMENT_VAR).ok();
    Environment::resolve(api_url.or(remembered), env_value.as_deref())
}

/// Sets up a backend session
///
/// This function handles all the common setup required for both TUI and headless modes:
/// 1. Loads the configuration file
/// 2. Resolves the environment, remembering an explicit `--api-url`
/// 3. Builds the HTTP client
pub fn setup_session(api_url: Option<&str>) -> Result<SessionData, Box<dyn Error>> {
    let config_path = get_config_path()?;
    let mut config = load_config(&config_path);

    let environment = resolve_environment(api_url, &config);
    if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
        if config.api_url != url.trim() {
            config.api_url = url.trim().to_string();
            config
                .save(&config_path)
                .map_err(|e| format!("Failed to save config: {}", e))?;
        }
    }
    log::debug!("Using backend {:?}", environment);

    let export_dir = match &config.export_dir {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let client = ApiClient::new(environment)?;

    Ok(SessionData {
        backend: Arc::new(client),
        config_path,
        export_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_is_empty() {
        let dir = tempdir().unwrap();
        assert_eq!(load_config(&dir.path().join("config.json")), Config::default());
    }

    #[test]
    fn corrupt_config_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(load_config(&path), Config::default());
    }

    #[test]
    fn explicit_url_beats_remembered_one() {
        let config = Config::new("http://remembered:5000".to_string());
        let env = resolve_environment(Some("http://explicit:5000"), &config);
        assert_eq!(env.api_url(), "http://explicit:5000");

        let env = resolve_environment(None, &config);
        assert_eq!(env.api_url(), "http://remembered:5000");
    }
}

//! Configuration module for GymSpot
//!
//! Handles locating, loading and overriding settings from YAML files and
//! environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_ENV: &str = "GYMSPOT_SETTINGS_PATH";

/// Default settings file locations, in lookup order
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/gymspot/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("gymspot/settings.yml"));
    }
    paths
}

/// Load settings from `explicit`, then the env-named path, then the default
/// locations, falling back to defaults. Environment overrides apply last.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit.filter(|p| !p.exists()) {
        anyhow::bail!("Settings file not found: {}", path.display());
    }

    let env_path = std::env::var(SETTINGS_PATH_ENV).ok().map(PathBuf::from);

    let candidates = explicit
        .map(Path::to_path_buf)
        .into_iter()
        .chain(env_path)
        .chain(default_paths());

    let mut settings = match candidates.into_iter().find(|p| p.exists()) {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(&path)?
        }
        None => {
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };

    settings.merge_env();
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_explicit_file() {
        let path = std::env::temp_dir().join(format!("gymspot-settings-{}.yml", std::process::id()));
        std::fs::write(&path, "server:\n  port: 9191\n").unwrap();

        let settings = load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(settings.server.port, 9191);
    }

    #[test]
    fn test_missing_explicit_file() {
        assert!(load(Some(Path::new("/nonexistent/gymspot.yml"))).is_err());
    }
}

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::prompt::ExplanationLength;

/// Store knobs persisted to the user's config dir. Term counts bound how
/// many candidates each transition asks the collaborator for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub starter_terms: usize,
    pub further_terms: usize,
    pub suggestion_terms: usize,
    pub explanation_length: ExplanationLength,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            starter_terms: 4,
            further_terms: 3,
            suggestion_terms: 4,
            explanation_length: ExplanationLength::Short,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no config directory available")]
    NoConfigDir,
    #[error("failed to write store config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize store config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "conceptmap")?;
    Some(proj.config_dir().join("store.toml"))
}

pub fn load_or_default() -> StoreConfig {
    let Some(path) = config_file_path() else {
        return StoreConfig::default();
    };
    load_or_default_from_path(&path)
}

fn load_or_default_from_path(path: &Path) -> StoreConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return StoreConfig::default();
    };
    toml::from_str(&contents).unwrap_or_default()
}

pub fn save(cfg: &StoreConfig) -> Result<(), ConfigError> {
    let Some(path) = config_file_path() else {
        return Err(ConfigError::NoConfigDir);
    };
    save_to_path(cfg, &path)
}

fn save_to_path(cfg: &StoreConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = toml::to_string_pretty(cfg)?;
    fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn store_config_roundtrip_save_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("store.toml");
        let cfg = StoreConfig {
            starter_terms: 6,
            further_terms: 2,
            suggestion_terms: 5,
            explanation_length: ExplanationLength::Long,
        };

        save_to_path(&cfg, &path).expect("save config");
        let loaded = load_or_default_from_path(&path);

        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_broken_file_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("nope.toml");
        assert_eq!(load_or_default_from_path(&missing), StoreConfig::default());

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "starter_terms = \"many\"").expect("write");
        assert_eq!(load_or_default_from_path(&broken), StoreConfig::default());
    }
}

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::DEFAULT_SERVER_URL;

/// Player preferences remembered between games
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub player_name: String,
    pub server_url: String,
    pub shuffle: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            shuffle: false,
        }
    }
}

impl Config {
    /// Command-line choices win over what was saved; `None` keeps the saved value
    pub fn apply_flags(&mut self, server_url: Option<String>, shuffle: Option<bool>) {
        if let Some(server_url) = server_url {
            self.server_url = server_url;
        }
        if let Some(shuffle) = shuffle {
            self.shuffle = shuffle;
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "typeshot") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("typeshot_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|e| {
                tracing::warn!("ignoring unreadable config {}: {e}", self.path.display());
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            player_name: "alice".into(),
            server_url: "https://scores.example.com".into(),
            shuffle: true,
        };
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"player_name":"bob"}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.player_name, "bob");
        assert_eq!(cfg.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn flags_override_saved_values_both_ways() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));

        let mut cfg = store.load();
        cfg.apply_flags(None, Some(true));
        store.save(&cfg).unwrap();
        assert!(store.load().shuffle);

        let mut cfg = store.load();
        cfg.apply_flags(Some("http://scores.local".into()), Some(false));
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert!(!loaded.shuffle);
        assert_eq!(loaded.server_url, "http://scores.local");

        let mut cfg = store.load();
        cfg.apply_flags(None, None);
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn garbage_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Per-subject display settings and their JSON persistence

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Display preferences for one subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubjectConfig {
    /// Gauge enabled for this subject
    pub enabled: bool,
    /// Show the "below/above sea level" line
    #[serde(rename = "seaLevelDisplayEnabled")]
    pub show_reference_level: bool,
    /// Gauge opacity in percent; out-of-range stored values are clamped on read
    opacity: i32,
    /// Show one decimal instead of whole units
    #[serde(rename = "decimalEnabled")]
    pub decimal_precision: bool,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_reference_level: true,
            opacity: 100,
            decimal_precision: true,
        }
    }
}

impl SubjectConfig {
    /// Enabled and not fully transparent
    pub fn effective_enabled(&self) -> bool {
        self.enabled && self.opacity() > 0
    }

    pub fn opacity(&self) -> u8 {
        self.opacity.clamp(0, 100) as u8
    }

    /// Set opacity, clamped to 0-100
    pub fn set_opacity(&mut self, opacity: i32) {
        self.opacity = opacity.clamp(0, 100);
    }
}

/// Thread-safe map of subject settings
///
/// Entries are created lazily on first lookup. Safe for concurrent
/// `get_or_default`/`remove` from the world thread and command handlers.
#[derive(Debug, Default)]
pub struct ConfigStore {
    configs: RwLock<HashMap<Uuid, SubjectConfig>>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing settings, or store and return the defaults
    pub fn get_or_default(&self, id: Uuid) -> SubjectConfig {
        if let Some(config) = self.get(id) {
            return config;
        }
        let mut configs = self.configs.write().unwrap_or_else(PoisonError::into_inner);
        *configs.entry(id).or_default()
    }

    /// Settings without creating an entry
    pub fn get(&self, id: Uuid) -> Option<SubjectConfig> {
        self.configs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
    }

    /// Modify the settings of a subject in place, creating defaults first
    pub fn update<F>(&self, id: Uuid, f: F) -> SubjectConfig
    where
        F: FnOnce(&mut SubjectConfig),
    {
        let mut configs = self.configs.write().unwrap_or_else(PoisonError::into_inner);
        let config = configs.entry(id).or_default();
        f(config);
        *config
    }

    /// Delete a subject's settings; unknown ids are ignored
    pub fn remove(&self, id: Uuid) {
        self.configs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    pub fn len(&self) -> usize {
        self.configs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All settings keyed by the canonical id string
    pub fn snapshot(&self) -> HashMap<String, SubjectConfig> {
        self.configs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, config)| (id.to_string(), *config))
            .collect()
    }

    /// Replace the contents with a string-keyed map
    ///
    /// Keys that are not valid UUIDs are dropped. Returns the number of
    /// entries kept.
    pub fn load_map(&self, map: HashMap<String, SubjectConfig>) -> usize {
        let parsed: HashMap<Uuid, SubjectConfig> = map
            .into_iter()
            .filter_map(|(key, config)| match Uuid::parse_str(&key) {
                Ok(id) => Some((id, config)),
                Err(_) => {
                    debug!(key = %key, "Skipping settings entry with invalid subject id");
                    None
                }
            })
            .collect();
        let kept = parsed.len();
        *self.configs.write().unwrap_or_else(PoisonError::into_inner) = parsed;
        kept
    }

    /// Load settings from a JSON file
    ///
    /// A missing file leaves the store empty. A corrupt file is logged and
    /// also leaves the store empty; neither case is fatal.
    pub fn load_from_path(&self, path: &Path) -> usize {
        match read_settings_file(path) {
            Ok(Some(map)) => {
                let kept = self.load_map(map);
                info!(path = %path.display(), subjects = kept, "Loaded player settings");
                kept
            }
            Ok(None) => {
                info!(path = %path.display(), "No existing player settings found - using defaults");
                self.load_map(HashMap::new())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load player settings");
                self.load_map(HashMap::new())
            }
        }
    }

    /// Write all settings to a JSON file, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<usize, ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let snapshot = self.snapshot();
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), subjects = snapshot.len(), "Saved player settings");
        Ok(snapshot.len())
    }
}

fn read_settings_file(path: &Path) -> Result<Option<HashMap<String, SubjectConfig>>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)?;
    // An explicit JSON null is treated like an absent file
    let map: Option<HashMap<String, SubjectConfig>> = serde_json::from_str(&json)?;
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SubjectConfig::default();
        assert!(config.enabled);
        assert!(config.show_reference_level);
        assert!(config.decimal_precision);
        assert_eq!(config.opacity(), 100);
        assert!(config.effective_enabled());
    }

    #[test]
    fn test_zero_opacity_disables() {
        let mut config = SubjectConfig::default();
        config.set_opacity(0);
        assert!(!config.effective_enabled());

        config.set_opacity(250);
        assert_eq!(config.opacity(), 100);
        config.set_opacity(-4);
        assert_eq!(config.opacity(), 0);
    }

    #[test]
    fn test_get_or_default_creates_entry() {
        let store = ConfigStore::new();
        let id = Uuid::new_v4();
        assert!(store.get(id).is_none());
        assert_eq!(store.get_or_default(id), SubjectConfig::default());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let store = ConfigStore::new();
        store.remove(Uuid::new_v4());
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_persists() {
        let store = ConfigStore::new();
        let id = Uuid::new_v4();
        store.update(id, |c| c.decimal_precision = false);
        assert!(!store.get_or_default(id).decimal_precision);
    }

    #[test]
    fn test_load_map_skips_invalid_keys() {
        let store = ConfigStore::new();
        let id = Uuid::new_v4();
        let mut map = HashMap::new();
        map.insert(id.to_string(), SubjectConfig::default());
        map.insert("not-a-uuid".to_string(), SubjectConfig::default());

        assert_eq!(store.load_map(map), 1);
        assert!(store.get(id).is_some());
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(SubjectConfig::default()).unwrap();
        assert_eq!(json["enabled"], true);
        assert_eq!(json["seaLevelDisplayEnabled"], true);
        assert_eq!(json["opacity"], 100);
        assert_eq!(json["decimalEnabled"], true);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: SubjectConfig = serde_json::from_str(r#"{"decimalEnabled": false}"#).unwrap();
        assert!(config.enabled);
        assert!(!config.decimal_precision);
        assert_eq!(config.opacity(), 100);
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for settings persistence and the wdepth command

use depth_gauge::commands::run_wdepth;
use depth_gauge::{ConfigStore, SubjectConfig};
use std::collections::HashMap;
use uuid::Uuid;

#[test]
fn test_config_default() {
    let config = SubjectConfig::default();
    assert!(config.enabled, "Gauge should be enabled by default");
    assert!(config.show_reference_level);
    assert!(config.decimal_precision);
    assert_eq!(config.opacity(), 100);
    assert!(config.effective_enabled());
}

#[test]
fn test_get_or_default_creates_entry() {
    let store = ConfigStore::new();
    let id = Uuid::new_v4();
    assert!(store.get(id).is_none());

    let config = store.get_or_default(id);
    assert_eq!(config, SubjectConfig::default());
    assert_eq!(store.len(), 1);

    // Second lookup returns the stored entry, not a new one
    store.update(id, |config| config.enabled = false);
    assert!(!store.get_or_default(id).enabled);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("player_settings.json");

    let store = ConfigStore::new();
    let quiet = Uuid::new_v4();
    let precise = Uuid::new_v4();
    store.update(quiet, |config| {
        config.enabled = false;
        config.set_opacity(40);
    });
    store.update(precise, |config| config.decimal_precision = false);

    assert_eq!(store.save_to_path(&path).unwrap(), 2);

    let reloaded = ConfigStore::new();
    assert_eq!(reloaded.load_from_path(&path), 2);
    assert_eq!(reloaded.get(quiet), store.get(quiet));
    assert_eq!(reloaded.get(precise), store.get(precise));
    assert_eq!(reloaded.get(quiet).unwrap().opacity(), 40);
}

#[test]
fn test_file_uses_wire_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("player_settings.json");

    let store = ConfigStore::new();
    let id = Uuid::new_v4();
    store.get_or_default(id);
    store.save_to_path(&path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let entry = &json[id.to_string()];
    assert_eq!(entry["enabled"], true);
    assert_eq!(entry["seaLevelDisplayEnabled"], true);
    assert_eq!(entry["opacity"], 100);
    assert_eq!(entry["decimalEnabled"], true);
}

#[test]
fn test_invalid_keys_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("player_settings.json");
    let id = Uuid::new_v4();
    std::fs::write(
        &path,
        format!(
            r#"{{
                "not-a-uuid": {{ "enabled": false }},
                "{}": {{ "enabled": false, "opacity": 250 }}
            }}"#,
            id
        ),
    )
    .unwrap();

    let store = ConfigStore::new();
    assert_eq!(store.load_from_path(&path), 1);

    let config = store.get(id).unwrap();
    assert!(!config.enabled);
    // Missing fields take defaults, out-of-range opacity is clamped
    assert!(config.show_reference_level);
    assert_eq!(config.opacity(), 100);
}

#[test]
fn test_missing_and_corrupt_files_are_not_fatal() {
    let dir = tempfile::tempdir().unwrap();

    let store = ConfigStore::new();
    store.get_or_default(Uuid::new_v4());
    assert_eq!(store.load_from_path(&dir.path().join("absent.json")), 0);
    assert!(store.is_empty());

    let corrupt = dir.path().join("corrupt.json");
    std::fs::write(&corrupt, "{ this is not json").unwrap();
    assert_eq!(store.load_from_path(&corrupt), 0);
    assert!(store.is_empty());
}

#[test]
fn test_load_map_replaces_contents() {
    let store = ConfigStore::new();
    let old = Uuid::new_v4();
    store.get_or_default(old);

    let fresh = Uuid::new_v4();
    let mut map = HashMap::new();
    map.insert(fresh.to_string(), SubjectConfig::default());
    assert_eq!(store.load_map(map), 1);

    assert!(store.get(old).is_none());
    assert!(store.get(fresh).is_some());
}

#[test]
fn test_zero_opacity_disables_gauge() {
    let mut config = SubjectConfig::default();
    config.set_opacity(-20);
    assert_eq!(config.opacity(), 0);
    assert!(!config.effective_enabled());
}

#[test]
fn test_wdepth_persists_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("player_settings.json");
    let id = Uuid::new_v4();

    let store = ConfigStore::new();
    let reply = run_wdepth(&store, id, "/wdepth sea off");
    assert!(!reply.rejected);
    assert_eq!(reply.to_string(), "Sea level display disabled");
    store.save_to_path(&path).unwrap();

    let reloaded = ConfigStore::new();
    reloaded.load_from_path(&path);
    assert!(!reloaded.get(id).unwrap().show_reference_level);

    let summary = run_wdepth(&reloaded, id, "WDEPTH").to_string();
    assert!(summary.contains("Sea Level Display: OFF"));
    assert!(summary.contains("HUD Enabled: ON"));
}

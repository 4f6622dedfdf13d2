use acat_domain::config::{CatalogConfig, SettingsConfig};
use acat_domain::loadable::Loadable;
use serde_json::json;
use std::time::Duration;

#[test]
fn config_defaults_are_sane() {
    let cfg = CatalogConfig::default();
    assert_eq!(cfg.debounce_ms, 100);
    assert_eq!(cfg.debounce(), Duration::from_millis(100));
    assert_eq!(Loadable::from(cfg.loadable), Loadable::empty());

    let settings = SettingsConfig::default();
    assert_eq!(settings.user, std::path::PathBuf::from("catalog.toml"));
    assert!(settings.admin.is_none());
}

#[test]
fn catalog_config_deserializes() {
    let raw = json!({
        "debounce_ms": 250,
        "loadable": { "include_disabled": true },
        "settings": { "user": "/tmp/user.toml", "admin": "/etc/acat/admin.toml" }
    });

    let cfg: CatalogConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.debounce_ms, 250);
    assert_eq!(Loadable::from(cfg.loadable), Loadable::DISABLED);
    assert_eq!(cfg.settings.admin.as_deref(), Some(std::path::Path::new("/etc/acat/admin.toml")));
}

#[test]
fn deref_mut_clones_on_write() {
    let original = CatalogConfig::default();
    let mut tuned = original.clone();
    tuned.debounce_ms = 5;

    assert_eq!(original.debounce_ms, 100);
    assert_eq!(tuned.debounce_ms, 5);
}

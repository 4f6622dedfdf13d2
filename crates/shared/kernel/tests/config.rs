use acat_kernel::config::load_config;
use acat_kernel::domain::config::CatalogConfig;
use std::fs;
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() {
    let cfg: CatalogConfig = load_config(Some("definitely/not/here.toml")).expect("optional file");
    assert_eq!(cfg.debounce_ms, 100);
}

#[test]
fn file_values_are_loaded() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("catalog.toml");
    fs::write(&path, "debounce_ms = 40\n[loadable]\ninclude_invalid = true\n")?;

    let cfg: CatalogConfig = load_config(Some(&path))?;
    assert_eq!(cfg.debounce_ms, 40);
    assert!(cfg.loadable.include_invalid);
    assert!(!cfg.loadable.include_disabled);
    Ok(())
}

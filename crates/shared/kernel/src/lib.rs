//! Kernel utilities shared across the catalog slices.
//! Keep this crate lightweight: it owns the settings store seam and configuration loading.
//!
//! ## Settings
//! ```rust
//! use acat_kernel::settings::{keys, MemorySettings, SettingsStore};
//!
//! let settings = MemorySettings::new();
//! settings.set_string_list(keys::LEVEL_ZERO_ORDER, None, &["menu-a".to_owned()]).unwrap();
//! let order = settings.get_string_list(keys::LEVEL_ZERO_ORDER, None).unwrap();
//! assert_eq!(order.value, vec!["menu-a".to_owned()]);
//! assert!(!order.mandatory);
//! ```
//!
//! ## Config loading
//! ```rust,ignore
//! use acat_kernel::config::load_config;
//! use acat_kernel::domain::config::CatalogConfig;
//!
//! let cfg: CatalogConfig = load_config(Some("catalog")).unwrap_or_default();
//! ```

pub mod config;
pub mod settings;

pub use acat_domain as domain;

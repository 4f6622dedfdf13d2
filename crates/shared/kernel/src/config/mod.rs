use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Custom error type for config loading.
#[acat_derive::acat_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads application configuration from a TOML file overlaid with environment variables.
///
/// 1. **Base File**: `path`, or `catalog` (any supported extension) in the working directory.
///    The file is optional; every field of the target type is expected to carry a default.
/// 2. **Environment Overrides**: variables prefixed with `ACAT__`, nested with double
///    underscores (`ACAT__LOADABLE__INCLUDE_INVALID=true` maps to `loadable.include_invalid`).
///
/// # Errors
/// Returns [`ConfigError::Config`] when a source is malformed or the merged values do not
/// match the structure of `T`.
///
/// # Example
/// ```rust
/// use acat_kernel::config::load_config;
/// use acat_kernel::domain::config::CatalogConfig;
///
/// let cfg: CatalogConfig = load_config(Some("does/not/exist")).unwrap_or_default();
/// assert_eq!(cfg.debounce_ms, 100);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from("catalog"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(
            Environment::with_prefix("ACAT")
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), "Loading catalog configuration");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

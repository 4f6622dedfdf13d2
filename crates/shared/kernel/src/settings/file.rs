use super::layers::{self, Layers};
use super::{Setting, SettingsError, SettingsErrorExt, SettingsStore};
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::{debug, info};

/// Settings backed by two TOML files.
///
/// The admin file (optional, typically system-wide and read-only) provides mandatory values.
/// The user file receives every write; it is rewritten atomically (temp file + rename).
/// Missing files read as empty layers.
#[derive(Debug)]
pub struct FileSettings {
    user_path: PathBuf,
    admin_path: Option<PathBuf>,
    layers: RwLock<Layers>,
}

impl FileSettings {
    /// Opens both files.
    ///
    /// # Errors
    /// Returns [`SettingsError::Io`] when a present file cannot be read and
    /// [`SettingsError::Parse`] when it is not valid TOML.
    pub fn open(
        user_path: impl Into<PathBuf>,
        admin_path: Option<impl Into<PathBuf>>,
    ) -> Result<Self, SettingsError> {
        let user_path = user_path.into();
        let admin_path = admin_path.map(Into::into);
        let layers = read_layers(&user_path, admin_path.as_deref())?;

        info!(user = %user_path.display(), "Settings store opened");

        Ok(Self { user_path, admin_path, layers: RwLock::new(layers) })
    }

    /// Re-reads both files, discarding in-memory state.
    ///
    /// # Errors
    /// Same as [`FileSettings::open`].
    pub fn reload(&self) -> Result<(), SettingsError> {
        let fresh = read_layers(&self.user_path, self.admin_path.as_deref())?;
        *self.layers.write() = fresh;
        Ok(())
    }

    #[must_use]
    pub fn user_path(&self) -> &Path {
        &self.user_path
    }

    /// Persists first; the in-memory layer only changes once the file is written.
    fn store(&self, key: &str, group: Option<&str>, value: Value) -> Result<(), SettingsError> {
        let mut guard = self.layers.write();
        let user = guard.with_stored(key, group, value)?;
        persist(&self.user_path, &user)?;
        guard.user = user;
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn get_bool(&self, key: &str, group: Option<&str>) -> Option<Setting<bool>> {
        self.layers.read().typed(key, group, layers::as_bool)
    }

    fn get_string(&self, key: &str, group: Option<&str>) -> Option<Setting<String>> {
        self.layers.read().typed(key, group, layers::as_string)
    }

    fn get_string_list(&self, key: &str, group: Option<&str>) -> Option<Setting<Vec<String>>> {
        self.layers.read().typed(key, group, layers::as_string_list)
    }

    fn set_bool(&self, key: &str, group: Option<&str>, value: bool) -> Result<(), SettingsError> {
        self.store(key, group, Value::Boolean(value))
    }

    fn set_string(&self, key: &str, group: Option<&str>, value: &str) -> Result<(), SettingsError> {
        self.store(key, group, Value::String(value.to_owned()))
    }

    fn set_string_list(
        &self,
        key: &str,
        group: Option<&str>,
        value: &[String],
    ) -> Result<(), SettingsError> {
        self.store(key, group, layers::string_list(value))
    }

    fn groups(&self) -> Vec<String> {
        self.layers.read().groups()
    }
}

fn read_layers(user: &Path, admin: Option<&Path>) -> Result<Layers, SettingsError> {
    Ok(Layers {
        user: read_table(user)?,
        admin: admin.map(read_table).transpose()?.unwrap_or_default(),
    })
}

fn read_table(path: &Path) -> Result<Table, SettingsError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Settings file absent; starting empty");
            return Ok(Table::new());
        },
        Err(source) => {
            return Err(SettingsError::Io {
                source,
                context: Some(format!("Reading settings file {}", path.display()).into()),
            });
        },
    };
    toml::from_str::<Table>(&raw).context(format!("Parsing settings file {}", path.display()))
}

fn persist(path: &Path, table: &Table) -> Result<(), SettingsError> {
    let rendered = toml::to_string(table).context("Rendering user settings")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .context(format!("Creating settings directory {}", parent.display()))?;
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, rendered).context(format!("Writing {}", tmp.display()))?;
    fs::rename(&tmp, path).context(format!("Replacing {}", path.display()))?;

    debug!(path = %path.display(), "User settings persisted");
    Ok(())
}

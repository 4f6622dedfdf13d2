use super::keys::GLOBAL_GROUP;
use super::{Setting, SettingsError};
use std::collections::BTreeSet;
use toml::{Table, Value};
use tracing::debug;

/// The two settings layers: admin values are mandatory, user values are writable.
#[derive(Debug, Clone, Default)]
pub(crate) struct Layers {
    pub(crate) admin: Table,
    pub(crate) user: Table,
}

impl Layers {
    pub(crate) fn lookup(&self, key: &str, group: Option<&str>) -> Option<Setting<&Value>> {
        let group = group.unwrap_or(GLOBAL_GROUP);
        find(&self.admin, group, key)
            .map(Setting::mandatory)
            .or_else(|| find(&self.user, group, key).map(Setting::user))
    }

    pub(crate) fn typed<T>(
        &self,
        key: &str,
        group: Option<&str>,
        convert: impl FnOnce(&Value) -> Option<T>,
    ) -> Option<Setting<T>> {
        let found = self.lookup(key, group)?;
        let value = convert(found.value);
        if value.is_none() {
            debug!(key, group, "Settings value has an unexpected type; ignoring it");
        }
        value.map(|value| Setting { value, mandatory: found.mandatory })
    }

    pub(crate) fn store(
        &mut self,
        key: &str,
        group: Option<&str>,
        value: Value,
    ) -> Result<(), SettingsError> {
        self.user = self.with_stored(key, group, value)?;
        Ok(())
    }

    /// A copy of the user layer with `value` stored, leaving `self` untouched.
    pub(crate) fn with_stored(
        &self,
        key: &str,
        group: Option<&str>,
        value: Value,
    ) -> Result<Table, SettingsError> {
        let group = group.unwrap_or(GLOBAL_GROUP);
        if find(&self.admin, group, key).is_some() {
            return Err(SettingsError::Mandatory {
                message: format!("{group}/{key}").into(),
                context: None,
            });
        }
        let mut user = self.user.clone();
        section(&mut user, group)
            .ok_or_else(|| SettingsError::from(format!("group {group} is not a table")))?
            .insert(key.to_owned(), value);
        Ok(user)
    }

    /// Imposes a value in the admin layer.
    pub(crate) fn mandate(&mut self, key: &str, group: Option<&str>, value: Value) {
        if let Some(table) = section(&mut self.admin, group.unwrap_or(GLOBAL_GROUP)) {
            table.insert(key.to_owned(), value);
        }
    }

    pub(crate) fn groups(&self) -> Vec<String> {
        self.admin
            .iter()
            .chain(self.user.iter())
            .filter(|(_, value)| value.is_table())
            .map(|(name, _)| name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn find<'a>(layer: &'a Table, group: &str, key: &str) -> Option<&'a Value> {
    layer.get(group)?.as_table()?.get(key)
}

/// The table for `group`, replacing a non-table value of the same name.
fn section<'a>(layer: &'a mut Table, group: &str) -> Option<&'a mut Table> {
    let entry = layer.entry(group.to_owned()).or_insert(Value::Table(Table::new()));
    if !entry.is_table() {
        *entry = Value::Table(Table::new());
    }
    entry.as_table_mut()
}

pub(crate) fn as_bool(value: &Value) -> Option<bool> {
    value.as_bool()
}

pub(crate) fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

pub(crate) fn as_string_list(value: &Value) -> Option<Vec<String>> {
    value.as_array()?.iter().map(|item| item.as_str().map(str::to_owned)).collect()
}

pub(crate) fn string_list(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

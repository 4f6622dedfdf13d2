#![allow(dead_code)]

use acat_catalog::{BackendError, Item, ReadOutcome, Registry, StorageBackend};
use acat_domain::capabilities::Capabilities;
use acat_domain::status::Status;
use acat_events::ChangeNotifier;
use acat_kernel::settings::MemorySettings;
use parking_lot::Mutex;
use std::sync::Arc;

/// In-memory backend recording every call made to it.
#[derive(Debug)]
pub struct FakeBackend {
    id: String,
    name: String,
    capabilities: Capabilities,
    willing: bool,
    able: bool,
    fail_read: bool,
    write_status: Status,
    items: Mutex<Vec<Item>>,
    pub written: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    pub duplicated: Mutex<Vec<(String, String)>>,
    notifier: Mutex<Option<ChangeNotifier>>,
}

impl FakeBackend {
    fn new(id: &str, capabilities: Capabilities, writable: bool) -> Self {
        Self {
            id: id.to_owned(),
            name: format!("{id} backend"),
            capabilities,
            willing: writable,
            able: writable,
            fail_read: false,
            write_status: Status::Ok,
            items: Mutex::new(Vec::new()),
            written: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            duplicated: Mutex::new(Vec::new()),
            notifier: Mutex::new(None),
        }
    }

    /// Reads only.
    pub fn read_only(id: &str) -> Self {
        Self::new(id, Capabilities::READ, false)
    }

    /// Full read/write backend that is willing and able.
    pub fn writable(id: &str) -> Self {
        Self::new(id, Capabilities::READ | Capabilities::WRITE_API | Capabilities::DUPLICATE, true)
    }

    pub fn with_items(self, items: Vec<Item>) -> Self {
        *self.items.lock() = items;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    pub const fn unwilling(mut self) -> Self {
        self.willing = false;
        self
    }

    pub const fn unable(mut self) -> Self {
        self.able = false;
        self
    }

    pub const fn failing(mut self) -> Self {
        self.fail_read = true;
        self
    }

    pub const fn with_write_status(mut self, status: Status) -> Self {
        self.write_status = status;
        self
    }

    /// Simulates an external change of the backend's storage.
    pub fn emit_change(&self) {
        if let Some(notifier) = self.notifier.lock().as_ref() {
            notifier.notify();
        }
    }

    pub fn is_watched(&self) -> bool {
        self.notifier.lock().is_some()
    }
}

impl StorageBackend for FakeBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn read_items(&self) -> Result<ReadOutcome, BackendError> {
        if self.fail_read {
            return Err(BackendError::Data {
                message: "corrupted store".into(),
                context: Some(self.id.clone().into()),
            });
        }
        Ok(ReadOutcome::new(self.items.lock().clone()))
    }

    fn is_willing_to_write(&self) -> bool {
        self.willing
    }

    fn is_able_to_write(&self) -> bool {
        self.able
    }

    fn write_item(&self, item: &Item, messages: &mut Vec<String>) -> Status {
        if self.write_status.is_ok() {
            self.written.lock().push(item.id().to_owned());
        } else {
            messages.push(format!("{}: cannot write {}", self.id, item.id()));
        }
        self.write_status
    }

    fn delete_item(&self, item: &Item, _messages: &mut Vec<String>) -> Status {
        self.deleted.lock().push(item.id().to_owned());
        Status::Ok
    }

    fn duplicate_data(&self, dest: &Item, source: &Item, _messages: &mut Vec<String>) -> Status {
        self.duplicated.lock().push((dest.id().to_owned(), source.id().to_owned()));
        Status::Ok
    }

    fn watch(&self, notifier: ChangeNotifier) {
        *self.notifier.lock() = Some(notifier);
    }
}

/// A valid action: labelled, with one valid profile.
pub fn action(id: &str) -> Item {
    Item::action(id, format!("Action {id}")).with_child(Item::profile("profile-zero", "Default"))
}

pub fn settings() -> Arc<MemorySettings> {
    Arc::new(MemorySettings::new())
}

pub fn registry(settings: &Arc<MemorySettings>, backends: &[Arc<FakeBackend>]) -> Registry {
    let mut builder = Registry::builder().settings(settings.clone());
    for backend in backends {
        builder = builder.backend(backend.clone());
    }
    builder.build().expect("settings were provided")
}

pub fn ids(items: &[Item]) -> Vec<&str> {
    items.iter().map(Item::id).collect()
}

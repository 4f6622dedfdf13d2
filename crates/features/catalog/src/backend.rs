use crate::item::Item;
use acat_domain::capabilities::Capabilities;
use acat_domain::status::Status;
use acat_events::ChangeNotifier;
use std::borrow::Cow;
use std::fmt::Debug;

/// Failure of a single backend read. Never fatal to a load.
#[acat_derive::acat_error]
pub enum BackendError {
    /// The backend does not implement reading.
    #[error("Read not supported{}: {message}", format_context(.context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Backend I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// The backend's own data could not be understood.
    #[error("Backend data error{}: {message}", format_context(.context))]
    Data { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal backend error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// What a backend returns from [`StorageBackend::read_items`].
#[derive(Debug, Default)]
pub struct ReadOutcome {
    /// Flat list of menus and actions; actions carry their profiles.
    pub items: Vec<Item>,
    /// Non-fatal diagnostics for the user.
    pub messages: Vec<String>,
}

impl ReadOutcome {
    #[must_use]
    pub const fn new(items: Vec<Item>) -> Self {
        Self { items, messages: Vec::new() }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }
}

/// A pluggable storage backend.
///
/// Only [`StorageBackend::id`] and [`StorageBackend::capabilities`] are required. Every other
/// operation has a real default, and [`StorageBackend::capabilities`] states which ones the
/// backend actually overrides. A backend that does not declare the whole write interface is
/// never written to.
pub trait StorageBackend: Debug + Send + Sync {
    /// Stable, non-empty, unique identifier.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str {
        self.id()
    }

    fn capabilities(&self) -> Capabilities;

    /// Reads every item this backend holds.
    ///
    /// # Errors
    /// Any [`BackendError`]; the loader turns it into a message and carries on.
    fn read_items(&self) -> Result<ReadOutcome, BackendError> {
        Err(BackendError::Unsupported { message: self.id().to_owned().into(), context: None })
    }

    /// Intrinsic willingness, e.g. a read-only format answers `false`.
    fn is_willing_to_write(&self) -> bool {
        false
    }

    /// Runtime ability, e.g. the target directory is writable.
    fn is_able_to_write(&self) -> bool {
        false
    }

    fn write_item(&self, _item: &Item, _messages: &mut Vec<String>) -> Status {
        Status::NotWillingToRun
    }

    fn delete_item(&self, _item: &Item, _messages: &mut Vec<String>) -> Status {
        Status::NotWillingToRun
    }

    /// Copies backend-private data attached to `source` over to `dest`.
    fn duplicate_data(&self, _dest: &Item, _source: &Item, _messages: &mut Vec<String>) -> Status {
        Status::Ok
    }

    /// Hands the backend a channel for change notifications. Backends that never change
    /// behind the application's back ignore it.
    fn watch(&self, _notifier: ChangeNotifier) {}
}

use acat_events::EventBusError;
use acat_kernel::settings::SettingsError;
use std::borrow::Cow;

/// Construction and wiring failures of the catalog. Load and write problems are reported as
/// messages and [`acat_domain::status::Status`] values instead.
#[acat_derive::acat_error]
pub enum CatalogError {
    /// A builder is missing a required part.
    #[error("Catalog validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Catalog settings error{}: {source}", format_context(.context))]
    Settings { source: SettingsError, context: Option<Cow<'static, str>> },

    #[error("Catalog event error{}: {source}", format_context(.context))]
    Events { source: EventBusError, context: Option<Cow<'static, str>> },

    #[error("Internal catalog error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

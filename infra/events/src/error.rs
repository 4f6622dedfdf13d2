use std::borrow::Cow;

/// Errors that can occur during event bus operations.
#[acat_derive::acat_error]
pub enum EventBusError {
    /// An internal downcast failed; the type registry is inconsistent.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Capacity must be greater than zero.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The aggregator needs a running tokio runtime to be spawned.
    #[error("No async runtime{}: {message}", format_context(.context))]
    NoRuntime { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

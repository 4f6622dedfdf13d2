#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the catalog crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! acat-derive = { path = "../infra/derive" }
//! thiserror = "2"
//! ```

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for crate-level error enums.
///
/// Turns a plain enum with named-field variants into a `thiserror` error wired into the
/// workspace conventions.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<ErrorName>Ext` trait with `.context(..)` and `.with_context(|| ..)` for
///   `Result<T, ErrorName>`, and for `Result<T, Source>` of every variant carrying a source.
/// * `From<Source>` for every variant carrying a source (a field named `source`, or marked
///   `#[source]`/`#[from]`).
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }` variant exists.
/// * A private `format_context` helper for use inside `#[error(..)]` strings.
///
/// # Requirements
///
/// 1. Only enums are accepted.
/// 2. Tuple and unit variants are rejected.
/// 3. A variant carrying a source must also carry `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use acat_derive::acat_error;
/// use std::borrow::Cow;
///
/// #[acat_error]
/// pub enum SettingsError {
///     #[error("Settings I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal settings error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &std::path::Path) -> Result<String, SettingsError> {
///     std::fs::read_to_string(path).context("Reading user settings")
/// }
/// ```
#[proc_macro_attribute]
pub fn acat_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}

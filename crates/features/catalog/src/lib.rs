//! # Action catalog
//!
//! Assembles the catalog of menus, actions and profiles from pluggable storage backends.
//!
//! - [`Registry`] discovers backends (from settings and from the installed modules) and
//!   computes how writable each one is.
//! - [`Loader`] merges what the backends return, restores the persisted order, sorts,
//!   checks and filters the tree.
//! - [`WritabilityEngine`] tells whether a given item may be written, and why not.
//! - [`Updater`] performs writes and deletes.
//! - [`Pivot`] owns all of the above for an application, together with change watching.
//!
//! ```rust
//! use std::sync::Arc;
//! use acat_catalog::{Loader, Registry};
//! use acat_domain::loadable::Loadable;
//! use acat_kernel::settings::MemorySettings;
//!
//! let registry = Registry::builder().settings(Arc::new(MemorySettings::new())).build().unwrap();
//! let outcome = Loader::new(&registry).load(Loadable::empty());
//! assert!(outcome.catalog.is_empty());
//! ```

mod backend;
mod catalog;
mod error;
mod item;
pub mod loader;
mod pivot;
mod registry;
mod updater;
mod writability;

pub use backend::{BackendError, BackendErrorExt, ReadOutcome, StorageBackend};
pub use catalog::{Catalog, Counts, Iter};
pub use error::{CatalogError, CatalogErrorExt};
pub use item::{Item, find_item_by_id, find_item_by_id_mut};
pub use loader::{LoadOutcome, Loader};
pub use pivot::{Pivot, PivotBuilder};
pub use registry::{BackendHandle, Handles, Registry, RegistryBuilder};
pub use updater::{StatusReport, Updater};
pub use writability::WritabilityEngine;

//! # Domain Models
//!
//! This crate contains pure catalog types with minimal dependencies (`serde`, `bitflags`).
//! Keep it lean: no I/O or tree logic, just data, flags and their lookup tables.

pub mod capabilities;
pub mod config;
pub mod item;
pub mod loadable;
pub mod status;
pub mod writability;

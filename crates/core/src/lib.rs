//! aoa-core
//!
//! Core library for reshaping age-of-acquisition survey exports into an
//! item-level dataset.
//!
//! This crate defines the input tables, the column families of the survey
//! instrument, item lookups, participant recoding, presentation-order
//! reconstruction and the item-level writer. Frontends (the CLI) only parse
//! arguments and report results.

pub mod columns;
pub mod config;
pub mod error;
pub mod layout;
pub mod lookup;
pub mod manifest;
pub mod model;
pub mod order;
pub mod output;
pub mod pages;
pub mod participant;
pub mod pipeline;
pub mod recode;
pub mod records;
pub mod reference;
pub mod table;

pub use error::{WrangleError, WrangleResult};

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

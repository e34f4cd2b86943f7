//! homefinder-core
//!
//! Shared domain types, error taxonomy, configuration and catalog sources for
//! the homefinder workspace.

pub mod catalog;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, LookupError, RecordError, Result};
pub use types::{Coordinates, Property, PropertyId, RawPropertyRecord};

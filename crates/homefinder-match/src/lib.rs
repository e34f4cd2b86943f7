//! homefinder-match
//!
//! Catalog index and rule-based local matching. See `index` for how catalog
//! records become searchable entries and `matcher` for the tier cascade.

pub mod index;
pub mod matcher;
pub mod tokenize;

pub use index::{CatalogIndex, SearchIndexEntry};
pub use matcher::{LocalMatcher, LocalSearch, PriceIntent, QuerySignals, ScoredResult};

//! homefinder-resolve
//!
//! Resolution coordinator: merges local matches with the generative
//! fallback and narrates the outcome.

pub mod coordinator;
pub mod narration;

pub use coordinator::{Coordinator, Resolution, ResultSource};

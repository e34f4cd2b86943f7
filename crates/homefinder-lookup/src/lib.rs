//! homefinder-lookup
//!
//! Fallback listing generation through a remote chat-completions model, and
//! the validating parse that turns its free-form answer into properties.

pub mod client;
pub mod parse;

pub use client::{DisabledLookup, OpenRouterLookup};
pub use parse::{first_json_array, generated_id, parse_generated, ParseReport};

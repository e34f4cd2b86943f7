use std::collections::HashSet;

use tracing::{debug, info, warn};

use homefinder_core::config::ResolverSettings;
use homefinder_core::traits::{GenerativeLookup, PropertySearch};
use homefinder_core::types::Property;

use crate::narration::narrate;

/// Which path produced a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Local,
    Generative,
    None,
}

/// Ranked results plus the narration describing them.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub results: Vec<Property>,
    pub narration: String,
    pub source: ResultSource,
}

impl Resolution {
    /// The top result, shown as the current property.
    pub fn featured(&self) -> Option<&Property> { self.results.first() }

    pub fn is_empty(&self) -> bool { self.results.is_empty() }
}

/// Local search first, generative lookup only when local search is empty.
/// `resolve` is total: lookup failures become an empty result set.
pub struct Coordinator<S, L> where S: PropertySearch, L: GenerativeLookup {
    search: S,
    lookup: L,
    settings: ResolverSettings,
}

impl<S, L> Coordinator<S, L> where S: PropertySearch, L: GenerativeLookup {
    pub fn new(search: S, lookup: L, settings: ResolverSettings) -> Self { Self { search, lookup, settings } }

    pub fn search(&self) -> &S { &self.search }

    pub fn settings(&self) -> &ResolverSettings { &self.settings }

    pub async fn resolve(&self, query: &str) -> Resolution {
        let local = self.search.find(query);
        if !local.is_empty() {
            return self.finish(local, Vec::new());
        }
        debug!(query, "no local matches, asking generative lookup");
        let generated = match self.lookup.lookup(query).await {
            Ok(properties) => properties,
            Err(e) => {
                warn!(query, error = %e, "generative lookup failed");
                Vec::new()
            }
        };
        self.finish(Vec::new(), generated)
    }

    /// Local matcher only; never calls the lookup.
    pub fn resolve_local(&self, query: &str) -> Resolution {
        self.finish(self.search.find(query), Vec::new())
    }

    fn finish(&self, local: Vec<Property>, generated: Vec<Property>) -> Resolution {
        let source = if !local.is_empty() {
            ResultSource::Local
        } else if !generated.is_empty() {
            ResultSource::Generative
        } else {
            ResultSource::None
        };
        // merge unique ids, keep first occurrence
        let mut seen = HashSet::new();
        let mut results: Vec<Property> = local
            .into_iter()
            .chain(generated)
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        results.truncate(self.settings.max_results);
        let narration = narrate(&results, self.settings.narrated_results);
        info!(results = results.len(), ?source, "query resolved");
        Resolution { results, narration, source }
    }
}

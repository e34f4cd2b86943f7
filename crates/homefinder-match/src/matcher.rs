//! Rule-based query matching over a [`CatalogIndex`].
//!
//! Tiers run in order: location, price, type, then keyword overlap. The first
//! three combine according to [`TierMode`]; keyword overlap only runs when
//! they select nothing.

use std::collections::HashSet;

use tracing::debug;

use homefinder_core::config::{MatcherSettings, TierMode};
use homefinder_core::traits::PropertySearch;
use homefinder_core::types::Property;

use crate::index::CatalogIndex;
use crate::tokenize::extract_keywords;

pub const LOCATIONS: &[&str] = &[
	"mayfair", "kensington", "chelsea", "belgravia", "shoreditch", "canary wharf", "notting hill",
	"hampstead", "greenwich", "islington", "battersea", "clapham", "wimbledon", "richmond", "camden",
];

pub const PRICE_KEYWORDS: &[&str] = &[
	"expensive", "cheap", "luxury", "budget", "premium", "affordable", "high-end", "million", "price", "cost",
];

pub const HIGH_PRICE_WORDS: &[&str] = &["expensive", "luxury", "premium"];

pub const LOW_PRICE_WORDS: &[&str] = &["cheap", "affordable", "budget"];

pub const PROPERTY_TYPES: &[&str] = &[
	"penthouse", "apartment", "house", "townhouse", "mansion", "loft", "studio", "duplex", "mews", "villa",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceIntent {
	High,
	Low,
	/// A price word without a direction ("price", "cost", "million").
	Unspecified,
}

/// What a query asks for, as far as the rule tiers can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySignals {
	pub location: Option<&'static str>,
	pub price_intent: Option<PriceIntent>,
	pub property_type: Option<&'static str>,
	pub keywords: Vec<String>,
}

impl QuerySignals {
	pub fn detect(query: &str) -> Self {
		let query = query.to_lowercase();
		let location = LOCATIONS.iter().copied().find(|l| query.contains(l));
		let price_intent = if !PRICE_KEYWORDS.iter().any(|k| query.contains(k)) {
			None
		} else if HIGH_PRICE_WORDS.iter().any(|k| query.contains(k)) {
			Some(PriceIntent::High)
		} else if LOW_PRICE_WORDS.iter().any(|k| query.contains(k)) {
			Some(PriceIntent::Low)
		} else {
			Some(PriceIntent::Unspecified)
		};
		// longest name wins so "townhouse" is not read as "house"
		let property_type = PROPERTY_TYPES
			.iter()
			.copied()
			.filter(|t| query.contains(t))
			.max_by_key(|t| t.len());
		Self { location, price_intent, property_type, keywords: extract_keywords(&query) }
	}

	/// True when any of the location, price or type tiers is triggered.
	pub fn has_tier_signal(&self) -> bool {
		self.location.is_some() || self.price_intent.is_some() || self.property_type.is_some()
	}
}

/// A catalog property with its keyword-overlap score.
#[derive(Debug, Clone, Copy)]
pub struct ScoredResult<'a> {
	pub property: &'a Property,
	pub score: u32,
}

#[derive(Debug, Clone, Default)]
pub struct LocalMatcher {
	settings: MatcherSettings,
}

impl LocalMatcher {
	pub fn new(settings: MatcherSettings) -> Self { Self { settings } }

	pub fn settings(&self) -> &MatcherSettings { &self.settings }

	pub fn explain(&self, query: &str) -> QuerySignals { QuerySignals::detect(query) }

	/// Ranked matches for `query`; empty when nothing matches.
	pub fn find(&self, query: &str, index: &CatalogIndex) -> Vec<Property> {
		let signals = QuerySignals::detect(query);
		let tiered = match self.settings.tier_mode {
			TierMode::Union => self.union_tiers(&signals, index),
			TierMode::Narrow => self.narrow_tiers(&signals, index),
		};
		if !tiered.is_empty() {
			debug!(query, hits = tiered.len(), "rule tiers matched");
			return tiered.into_iter().cloned().collect();
		}
		let scored = self.score_keywords(&signals.keywords, index);
		debug!(query, hits = scored.len(), "keyword tier matched");
		scored.into_iter().map(|s| s.property.clone()).collect()
	}

	pub fn by_location<'a>(&self, location: &str, index: &'a CatalogIndex) -> Vec<&'a Property> {
		let location = location.to_lowercase();
		index.all().iter().filter(|p| p.location.to_lowercase().contains(&location)).collect()
	}

	pub fn by_price<'a>(&self, intent: PriceIntent, index: &'a CatalogIndex) -> Vec<&'a Property> {
		let MatcherSettings { high_tier_threshold, low_tier_threshold, .. } = self.settings;
		match intent {
			PriceIntent::High => index.all().iter().filter(|p| p.price_value() > high_tier_threshold).collect(),
			PriceIntent::Low => index.all().iter().filter(|p| p.price_value() < low_tier_threshold).collect(),
			PriceIntent::Unspecified => Vec::new(),
		}
	}

	pub fn by_type<'a>(&self, property_type: &str, index: &'a CatalogIndex) -> Vec<&'a Property> {
		index.all().iter().filter(|p| p.property_type.eq_ignore_ascii_case(property_type)).collect()
	}

	/// Keyword-overlap scoring: one point per query keyword present in the
	/// entry. Zero scores are dropped; ties keep catalog order.
	pub fn score_keywords<'a>(&self, keywords: &[String], index: &'a CatalogIndex) -> Vec<ScoredResult<'a>> {
		let mut scored: Vec<ScoredResult<'a>> = index
			.entries()
			.filter_map(|(property, entry)| {
				let score = keywords.iter().filter(|k| entry.contains_keyword(k)).count();
				let score = u32::try_from(score).unwrap_or(u32::MAX);
				(score > 0).then_some(ScoredResult { property, score })
			})
			.collect();
		scored.sort_by(|a, b| b.score.cmp(&a.score));
		scored.truncate(self.settings.keyword_limit);
		scored
	}

	fn tier_hits<'a>(&self, signals: &QuerySignals, index: &'a CatalogIndex) -> Vec<Vec<&'a Property>> {
		let mut tiers = Vec::with_capacity(3);
		if let Some(location) = signals.location { tiers.push(self.by_location(location, index)); }
		if let Some(intent) = signals.price_intent {
			if intent != PriceIntent::Unspecified || self.settings.tier_mode == TierMode::Union {
				tiers.push(self.by_price(intent, index));
			}
		}
		if let Some(property_type) = signals.property_type { tiers.push(self.by_type(property_type, index)); }
		tiers
	}

	fn union_tiers<'a>(&self, signals: &QuerySignals, index: &'a CatalogIndex) -> Vec<&'a Property> {
		let mut seen = HashSet::new();
		self.tier_hits(signals, index)
			.into_iter()
			.flatten()
			.filter(|&p| seen.insert(p.id.as_str()))
			.collect()
	}

	fn narrow_tiers<'a>(&self, signals: &QuerySignals, index: &'a CatalogIndex) -> Vec<&'a Property> {
		let tiers = self.tier_hits(signals, index);
		let Some((first, rest)) = tiers.split_first() else { return Vec::new() };
		let rest: Vec<HashSet<&str>> = rest.iter().map(|t| t.iter().map(|p| p.id.as_str()).collect()).collect();
		first.iter().copied().filter(|p| rest.iter().all(|ids| ids.contains(p.id.as_str()))).collect()
	}
}

/// A catalog index paired with the matcher that searches it.
#[derive(Debug, Clone)]
pub struct LocalSearch {
	index: CatalogIndex,
	matcher: LocalMatcher,
}

impl LocalSearch {
	pub fn new(index: CatalogIndex, matcher: LocalMatcher) -> Self { Self { index, matcher } }

	pub fn index(&self) -> &CatalogIndex { &self.index }

	pub fn matcher(&self) -> &LocalMatcher { &self.matcher }
}

impl PropertySearch for LocalSearch {
	fn find(&self, query: &str) -> Vec<Property> { self.matcher.find(query, &self.index) }
}

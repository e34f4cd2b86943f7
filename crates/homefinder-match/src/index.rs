use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use tracing::{debug, warn};

use homefinder_core::types::{Property, RawPropertyRecord};

use crate::tokenize::KeywordExtractor;

/// Searchable form of one catalog property, built once with the index.
#[derive(Debug, Clone)]
pub struct SearchIndexEntry {
	position: usize,
	search_text: String,
	keywords: Vec<String>,
	keyword_set: HashSet<String>,
}

impl SearchIndexEntry {
	fn new(position: usize, property: &Property, extractor: &mut KeywordExtractor) -> Self {
		let search_text = [&property.name, &property.location, &property.property_type, &property.description]
			.into_iter()
			.chain(property.features.iter())
			.map(String::as_str)
			.collect::<Vec<_>>()
			.join(" ")
			.to_lowercase();
		let keywords = extractor.extract(&search_text);
		let keyword_set = keywords.iter().cloned().collect();
		Self { position, search_text, keywords, keyword_set }
	}

	pub fn search_text(&self) -> &str { &self.search_text }

	pub fn keywords(&self) -> &[String] { &self.keywords }

	pub fn keyword_set(&self) -> &HashSet<String> { &self.keyword_set }

	pub fn contains_keyword(&self, keyword: &str) -> bool { self.keyword_set.contains(keyword) }
}

/// In-memory index over a fixed property catalog. Properties keep their
/// insertion order; ids are unique (later duplicates are dropped).
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
	properties: Vec<Property>,
	entries: Vec<SearchIndexEntry>,
	by_id: HashMap<String, usize>,
	skipped: usize,
}

impl CatalogIndex {
	/// Builds from untrusted records. Records missing required fields are
	/// skipped and counted, never fatal.
	pub fn build<I>(records: I) -> Self
	where
		I: IntoIterator<Item = RawPropertyRecord>,
	{
		let mut properties = Vec::new();
		let mut skipped = 0;
		for (position, record) in records.into_iter().enumerate() {
			match record.into_catalog_property() {
				Ok(property) => properties.push(property),
				Err(e) => {
					warn!(position, error = %e, "skipping malformed catalog record");
					skipped += 1;
				}
			}
		}
		let mut index = Self::from_properties(properties);
		index.skipped += skipped;
		index
	}

	pub fn from_properties(properties: Vec<Property>) -> Self {
		let mut extractor = KeywordExtractor::new();
		let mut index = Self::default();
		for property in properties {
			if index.by_id.contains_key(&property.id) {
				warn!(id = %property.id, "skipping duplicate catalog id");
				index.skipped += 1;
				continue;
			}
			let position = index.properties.len();
			index.entries.push(SearchIndexEntry::new(position, &property, &mut extractor));
			index.by_id.insert(property.id.clone(), position);
			index.properties.push(property);
		}
		debug!(properties = index.properties.len(), skipped = index.skipped, "catalog index built");
		index
	}

	/// Every property, in catalog order.
	pub fn all(&self) -> &[Property] { &self.properties }

	/// Entries paired with their property, in catalog order.
	pub fn entries(&self) -> impl Iterator<Item = (&Property, &SearchIndexEntry)> {
		self.entries.iter().map(move |e| (&self.properties[e.position], e))
	}

	pub fn entry(&self, id: &str) -> Option<&SearchIndexEntry> {
		self.by_id.get(id).map(|&i| &self.entries[i])
	}

	pub fn get(&self, id: &str) -> Option<&Property> {
		self.by_id.get(id).map(|&i| &self.properties[i])
	}

	pub fn random(&self) -> Option<&Property> {
		self.properties.choose(&mut rand::thread_rng())
	}

	pub fn len(&self) -> usize { self.properties.len() }

	pub fn is_empty(&self) -> bool { self.properties.is_empty() }

	/// Records dropped while building (malformed or duplicate ids).
	pub fn skipped(&self) -> usize { self.skipped }
}

use homefinder_core::catalog;
use homefinder_core::config::{MatcherSettings, TierMode};
use homefinder_core::types::{Property, RawPropertyRecord};
use homefinder_match::matcher::LOCATIONS;
use homefinder_match::tokenize::extract_keywords;
use homefinder_match::{CatalogIndex, LocalMatcher, PriceIntent, QuerySignals};

fn record(value: serde_json::Value) -> RawPropertyRecord {
    RawPropertyRecord::from_value(value).expect("record object")
}

fn builtin_index() -> CatalogIndex {
    CatalogIndex::build(catalog::builtin().expect("builtin catalog"))
}

fn ids(results: &[Property]) -> Vec<&str> {
    results.iter().map(|p| p.id.as_str()).collect()
}

fn narrow() -> LocalMatcher {
    LocalMatcher::new(MatcherSettings { tier_mode: TierMode::Narrow, ..MatcherSettings::default() })
}

#[test]
fn tokenizer_splits_on_non_alphanumerics_and_drops_short_tokens() {
    assert_eq!(
        extract_keywords("Luxury 3-bed flat, near Hyde_Park!"),
        vec!["luxury", "bed", "flat", "near", "hyde", "park"]
    );
    assert!(extract_keywords("a an of 42").is_empty());
}

#[test]
fn index_entries_cover_searchable_fields() {
    let index = CatalogIndex::build([record(serde_json::json!({
        "id": "t1", "name": "Test Loft", "location": "Camden, London", "price": "£900,000",
        "type": "Loft", "description": "A loft on the canal", "features": ["Roof terrace"]
    }))]);
    let entry = index.entry("t1").expect("entry by id");
    assert_eq!(entry.search_text(), "test loft camden, london loft a loft on the canal roof terrace");
    assert!(entry.contains_keyword("terrace"));
    assert!(entry.contains_keyword("camden"));
    assert!(!entry.contains_keyword("on"), "two-letter tokens are not keywords");
    assert_eq!(index.get("t1").map(|p| p.name.as_str()), Some("Test Loft"));
}

#[test]
fn build_is_idempotent() {
    let first = builtin_index();
    let second = builtin_index();
    assert_eq!(first.len(), second.len());
    for ((a, ea), (b, eb)) in first.entries().zip(second.entries()) {
        assert_eq!(a.id, b.id);
        assert_eq!(ea.keyword_set(), eb.keyword_set());
    }
}

#[test]
fn build_skips_malformed_and_duplicate_records() {
    let index = CatalogIndex::build([
        record(serde_json::json!({ "id": "a", "name": "A", "location": "Clapham", "price": "£1", "type": "House" })),
        record(serde_json::json!({ "id": "b", "name": "No location", "price": "£1", "type": "House" })),
        record(serde_json::json!({ "id": "a", "name": "Dup", "location": "Camden", "price": "£1", "type": "Loft" })),
    ]);
    assert_eq!(index.len(), 1);
    assert_eq!(index.skipped(), 2);
    assert_eq!(index.all()[0].name, "A", "first record with an id wins");
}

#[test]
fn luxury_penthouse_in_mayfair_selects_only_the_mayfair_penthouse() {
    let index = CatalogIndex::build([
        record(serde_json::json!({ "id": "p1", "name": "Park Lane Penthouse", "location": "Mayfair, London",
            "price": "£6,500,000", "type": "Penthouse", "bedrooms": 3 })),
        record(serde_json::json!({ "id": "a1", "name": "Sloane Apartment", "location": "Chelsea, London",
            "price": "£1,200,000", "type": "Apartment", "bedrooms": 2 })),
    ]);
    for matcher in [LocalMatcher::default(), narrow()] {
        let results = matcher.find("luxury penthouse in Mayfair", &index);
        assert_eq!(ids(&results), vec!["p1"]);
    }
}

#[test]
fn location_queries_only_return_that_location() {
    let index = builtin_index();
    let matcher = LocalMatcher::default();
    let present = LOCATIONS.iter().filter(|l| index.all().iter().any(|p| p.location.to_lowercase().contains(*l)));
    for location in present {
        let results = matcher.find(&format!("show me homes in {location}"), &index);
        assert!(!results.is_empty(), "{location} has listings");
        for p in &results {
            assert!(p.location.to_lowercase().contains(location), "{} is not in {location}", p.location);
        }
    }
}

#[test]
fn price_words_respect_thresholds() {
    let index = builtin_index();
    let matcher = LocalMatcher::default();
    for query in ["something expensive", "a luxury home", "premium living"] {
        let results = matcher.find(query, &index);
        assert!(!results.is_empty(), "{query}");
        assert!(results.iter().all(|p| p.price_value() >= 5_000_000), "{query}");
    }
    for query in ["a cheap place", "affordable flat", "on a budget"] {
        let results = matcher.find(query, &index);
        assert!(!results.is_empty(), "{query}");
        assert!(results.iter().all(|p| p.price_value() < 2_000_000), "{query}");
    }
}

#[test]
fn type_tier_prefers_the_longest_type_name() {
    let index = builtin_index();
    let results = LocalMatcher::default().find("any townhouse?", &index);
    assert_eq!(ids(&results), vec!["kn-002", "rm-001"]);
    assert_eq!(QuerySignals::detect("penthouse views").property_type, Some("penthouse"));
}

#[test]
fn union_mode_merges_tiers_in_first_seen_order() {
    let index = builtin_index();
    let results = LocalMatcher::default().find("cheap apartment in chelsea", &index);
    assert_eq!(
        ids(&results),
        vec!["ch-001", "ch-002", "sd-001", "nh-001", "gw-001", "is-001", "mf-002", "bt-001"]
    );
}

#[test]
fn narrow_mode_intersects_triggered_tiers() {
    let index = builtin_index();
    assert_eq!(ids(&narrow().find("cheap apartment in chelsea", &index)), vec!["ch-001"]);
    // empty intersection falls through to keyword overlap ("mansion block" counts too)
    assert_eq!(ids(&narrow().find("cheap mansion", &index)), vec!["mf-002", "kn-001"]);
}

#[test]
fn undirected_price_words_select_nothing_on_their_own() {
    let index = builtin_index();
    let signals = QuerySignals::detect("what is the price of lofts");
    assert_eq!(signals.price_intent, Some(PriceIntent::Unspecified));
    assert_eq!(ids(&LocalMatcher::default().find("what is the price of lofts", &index)), vec!["sd-001"]);
}

#[test]
fn keyword_tier_ranks_by_overlap_and_caps() {
    let index = builtin_index();
    let matcher = LocalMatcher::default();
    assert!(!matcher.explain("river views garden").has_tier_signal());
    let results = matcher.find("river views garden", &index);
    assert_eq!(ids(&results), vec!["ch-002", "bt-001", "rm-001", "hp-001", "gw-001"]);

    let capped = LocalMatcher::new(MatcherSettings { keyword_limit: 2, ..MatcherSettings::default() });
    assert_eq!(ids(&capped.find("river views garden", &index)), vec!["ch-002", "bt-001"]);
}

#[test]
fn unmatched_query_is_empty_not_an_error() {
    let index = builtin_index();
    assert!(LocalMatcher::default().find("hello", &index).is_empty());
    assert!(LocalMatcher::default().find("", &index).is_empty());
}

#[test]
fn random_pick_comes_from_the_catalog() {
    let index = builtin_index();
    let pick = index.random().expect("non-empty catalog");
    assert!(index.get(&pick.id).is_some());
    assert!(CatalogIndex::default().random().is_none());
}

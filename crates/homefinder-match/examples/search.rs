use std::env;
use std::path::PathBuf;

use homefinder_core::catalog::CatalogLoader;
use homefinder_core::config::MatcherSettings;
use homefinder_match::{CatalogIndex, LocalMatcher};

// Run the local matcher against the built-in catalog (or a directory of JSON files).
// Usage:
//   cargo run -p homefinder-match --example search -- "your query" [--catalog DIR] [--narrow]

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: cargo run -p homefinder-match --example search -- <query> [--catalog DIR] [--narrow]");
        std::process::exit(1);
    }
    let mut query = String::new();
    let mut catalog_dir: Option<PathBuf> = None;
    let mut settings = MatcherSettings::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--catalog" => {
                if i + 1 >= args.len() { eprintln!("--catalog requires a path"); std::process::exit(2); }
                catalog_dir = Some(PathBuf::from(&args[i + 1]));
                i += 2; continue;
            }
            "--narrow" => { settings.tier_mode = homefinder_core::config::TierMode::Narrow; i += 1; continue; }
            s if s.starts_with('-') => { eprintln!("Unknown flag: {}", s); std::process::exit(2); }
            s => {
                if !query.is_empty() { query.push(' '); }
                query.push_str(s);
                i += 1;
            }
        }
    }

    let records = CatalogLoader::new().load(catalog_dir.as_deref())?;
    let index = CatalogIndex::build(records);
    let matcher = LocalMatcher::new(settings);

    println!("Local match\n===========");
    println!("Catalog : {} properties ({} skipped)", index.len(), index.skipped());
    println!("Signals : {:?}", matcher.explain(&query));
    let results = matcher.find(&query, &index);
    println!("Found {} results for: \"{}\"", results.len(), query);
    for (i, p) in results.iter().enumerate() {
        println!("  {}. {}  [{}]  {}  {}", i + 1, p.name, p.property_type, p.location, p.price);
    }
    Ok(())
}

use std::env;

use homefinder_cli::{build_search, init_tracing};
use homefinder_core::config::Config;

fn main() -> anyhow::Result<()> {
    init_tracing("warn");
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <query>", args[0]);
        eprintln!("Example: {} 'luxury penthouse in Mayfair'", args[0]);
        std::process::exit(1);
    }
    let query = args[1..].join(" ");
    let config = Config::load()?;
    let settings = config.settings()?;
    let search = build_search(&settings, &env::current_dir()?)?;
    let matcher = search.matcher();

    println!("🔍 homefinder-search-only\n========================");
    println!("Query: {}", query);
    println!("Mode: {:?}", matcher.settings().tier_mode);
    println!("Signals: {:?}", matcher.explain(&query));
    let results = matcher.find(&query, search.index());
    println!("\n🔍 Found {} results for: \"{}\"", results.len(), query);
    for (i, p) in results.iter().enumerate() {
        println!("\n  {}. {}  id={}  type={}  {}", i + 1, p.name, p.id, p.property_type, p.price);
        println!("     📍 {} - {} bedrooms, {} bathrooms, {}", p.location, p.bedrooms, p.bathrooms, p.area);
    }
    Ok(())
}

//! User-facing text: result narration, the featured-property summary and the
//! fixed assistant messages.

use homefinder_core::types::Property;

pub const RESULTS_HEADER: &str = "Here are some properties matching your request:";

pub const NO_MATCHES_MESSAGE: &str =
    "Sorry, I couldn't find any properties matching your request. Try different keywords or locations.";

pub const TROUBLE_MESSAGE: &str =
    "I apologize, but I'm having trouble processing your request right now. Please try again.";

pub const WELCOME_MESSAGE: &str = "Hello! I'm your AI real estate assistant. I have access to properties globally. You can ask me about any property type, location, or specific requirements. What would you like to know?";

const FEATURED_MARK: &str = " (featured)";

/// `"<n>. <name> in <location> - <bedrooms> bedrooms, <price>"`, 1-based.
pub fn format_property_line(position: usize, property: &Property) -> String {
    format!(
        "{}. {} in {} - {} bedrooms, {}",
        position + 1,
        property.name,
        property.location,
        property.bedrooms,
        property.price
    )
}

/// Narration for a ranked result set; enumerates at most `limit` entries and
/// marks the first one as featured.
pub fn narrate(results: &[Property], limit: usize) -> String {
    if results.is_empty() || limit == 0 {
        return NO_MATCHES_MESSAGE.to_string();
    }
    let lines: Vec<String> = results
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, p)| {
            let line = format_property_line(i, p);
            if i == 0 { line + FEATURED_MARK } else { line }
        })
        .collect();
    format!("{RESULTS_HEADER}\n\n{}", lines.join("\n\n"))
}

pub fn location_description(location: &str) -> Option<&'static str> {
    let description = match location.to_lowercase().as_str() {
        "mayfair" => "Mayfair is a lively and luxurious part of London, known for its high-end shopping, fine dining, and exclusive residential properties.",
        "kensington" => "Kensington is renowned for its cultural attractions including the Victoria and Albert Museum, Natural History Museum, and Kensington Palace.",
        "chelsea" => "Chelsea is an upscale area known for the King's Road and Chelsea FC, offering sophisticated urban living.",
        "belgravia" => "Belgravia is one of London's most exclusive residential areas, characterized by grand white stucco terraces and garden squares.",
        "shoreditch" => "Shoreditch is East London's creative hub, known for its vibrant street art, eclectic nightlife, and innovative restaurants.",
        "canary wharf" => "Canary Wharf is London's financial district, featuring some of the city's tallest buildings and excellent transport links.",
        "notting hill" => "Notting Hill is a colorful area famous for Portobello Road Market and the annual carnival.",
        "hampstead" => "Hampstead is a leafy North London village with heath and literary connections.",
        "greenwich" => "Greenwich is a historic area with maritime heritage and beautiful parks.",
        "islington" => "Islington is a trendy North London borough with excellent restaurants and cultural venues.",
        _ => return None,
    };
    Some(description)
}

/// Spoken detail for the top result, prefixed with a short description of
/// `location` when one is known.
pub fn featured_summary(location: Option<&str>, results: &[Property]) -> Option<String> {
    let top = results.first()?;
    let mut summary = String::new();
    if let Some(blurb) = location.and_then(location_description) {
        summary.push_str(blurb);
        summary.push(' ');
    }
    summary.push_str(&format!("Here's a featured property: {} in {} for {}. ", top.name, top.location, top.price));
    summary.push_str(&format!(
        "This {} offers {} bedrooms, {} bathrooms, and {} of living space.",
        top.property_type.to_lowercase(),
        top.bedrooms,
        top.bathrooms,
        top.area
    ));
    if results.len() > 1 {
        summary.push_str(&format!(" I found {} matching properties in total.", results.len()));
    }
    Some(summary)
}

/// Help text describing what the catalog can answer.
pub fn catalog_overview(count: usize) -> String {
    format!(
        "I have access to {count} luxury properties across London. You can ask me about specific areas like Mayfair, Kensington, or Belgravia, or search by property type like penthouse, townhouse, or apartment. What would you like to know?"
    )
}

//! Best-effort extraction of property records from model output.
//!
//! The model answers in prose that should embed a JSON array. Nothing about
//! it is trusted: the array is located by trial parsing, and every element is
//! validated on its own.

use std::hash::{Hash, Hasher};

use serde_json::Value;
use twox_hash::XxHash64;

use homefinder_core::error::{LookupError, RecordError};
use homefinder_core::types::{Property, RawPropertyRecord};

/// Outcome of parsing one model answer.
#[derive(Debug, Default)]
pub struct ParseReport {
    pub properties: Vec<Property>,
    /// Position in the array and the reason each element was dropped.
    pub rejected: Vec<(usize, RecordError)>,
    /// Valid elements beyond the limit.
    pub truncated: usize,
}

/// Pulls the assistant text out of a chat-completion style response.
pub fn extract_message_content(value: &Value) -> Option<String> {
    if let Some(content) = value
        .get("choices")
        .and_then(|choices| choices.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
    {
        return Some(content.to_string());
    }
    if let Some(content) = value
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
    {
        return Some(content.to_string());
    }
    value.get("response").and_then(|response| response.as_str()).map(str::to_string)
}

/// The first `[` in `text` that starts a complete JSON array, parsed.
/// Prose before and after the array is ignored.
pub fn first_json_array(text: &str) -> Option<Vec<Value>> {
    text.char_indices().filter(|(_, c)| *c == '[').find_map(|(start, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Array(items))) => Some(items),
            _ => None,
        }
    })
}

/// Stable id for a generated listing without one.
pub fn generated_id(name: &str, location: &str) -> String {
    let mut hasher = XxHash64::with_seed(0);
    name.trim().to_lowercase().hash(&mut hasher);
    location.trim().to_lowercase().hash(&mut hasher);
    format!("gen-{:016x}", hasher.finish())
}

/// Validates every element of the first JSON array in `text`, keeping at
/// most `limit` properties.
pub fn parse_generated(text: &str, limit: usize) -> Result<ParseReport, LookupError> {
    let items = first_json_array(text).ok_or(LookupError::NoArray)?;
    let mut report = ParseReport::default();
    for (position, item) in items.into_iter().enumerate() {
        let parsed = RawPropertyRecord::from_value(item).and_then(|r| r.into_generated_property(generated_id));
        match parsed {
            Ok(_) if report.properties.len() >= limit => report.truncated += 1,
            Ok(property) => report.properties.push(property),
            Err(e) => report.rejected.push((position, e)),
        }
    }
    Ok(report)
}

//! Domain types shared by the matcher, the generative lookup and the assistant.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::RecordError;

pub type PropertyId = String;

/// Currency symbols stripped before a price string is read as a number.
const CURRENCY_SYMBOLS: &[char] = &['£', '$', '€', '¥'];

/// A geographic position attached to a property.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A single listing, either from the local catalog or synthesized by the
/// generative lookup.
///
/// - `id`: unique within the catalog; generated listings get a derived id
/// - `price`: currency-prefixed display string, e.g. `"£6,500,000"`
/// - `property_type`: free text such as "Penthouse" or "Apartment"
/// - `area`: display text with units, e.g. `"3,200 sq ft"`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub location: String,
    pub price: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area: String,
    pub description: String,
    pub features: Vec<String>,
    pub coordinates: Option<Coordinates>,
}

impl Property {
    /// Numeric value of `price`, 0 when it cannot be read.
    pub fn price_value(&self) -> u64 {
        parse_price(&self.price)
    }
}

/// Strips currency symbols, separators and whitespace, then reads the leading
/// run of digits. Anything unreadable is 0.
pub fn parse_price(raw: &str) -> u64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();
    let digits: String = cleaned.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Formats a bare amount the way catalog prices are written.
pub fn format_price(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('£');
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// A JSON scalar that may arrive as a number or as text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_text(&self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) if f.fract() == 0.0 && f.is_finite() => format!("{f:.0}"),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.trim().to_string(),
        }
    }

    /// Reads a non-negative count (bedrooms, bathrooms).
    pub fn as_count(&self) -> Option<u32> {
        match self {
            Scalar::Int(n) => u32::try_from(*n).ok(),
            Scalar::Float(f) if f.is_finite() && *f >= 0.0 => {
                u32::try_from(f.round() as i64).ok()
            }
            Scalar::Float(_) => None,
            Scalar::Text(s) => {
                let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
                digits.parse().ok()
            }
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Scalar::Int(n) => Some(*n as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
        .filter(|f| f.is_finite())
    }

    /// Display price: whole non-negative numbers are formatted like catalog
    /// prices, anything else is kept as written.
    pub fn as_price(&self) -> String {
        match self {
            Scalar::Int(n) if *n >= 0 => format_price(n.unsigned_abs()),
            Scalar::Float(f) if f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64 => {
                format_price(*f as u64)
            }
            other => other.as_text(),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FeaturesRepr {
    /// Non-scalar items are dropped.
    List(Vec<Value>),
    Text(String),
}

impl FeaturesRepr {
    fn into_tags(self) -> Vec<String> {
        let tags: Vec<String> = match self {
            FeaturesRepr::List(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value::<Scalar>(item).ok())
                .map(|tag| tag.as_text())
                .collect(),
            FeaturesRepr::Text(s) => s.split(',').map(|t| t.trim().to_string()).collect(),
        };
        tags.into_iter().filter(|t| !t.is_empty()).collect()
    }
}

/// Coordinates as `{lat, lng}` (numbers or numeric strings), `[lat, lng]`
/// or `"lat,lng"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CoordinatesRepr {
    Object {
        #[serde(alias = "latitude")]
        lat: Scalar,
        #[serde(alias = "lon", alias = "long", alias = "longitude")]
        lng: Scalar,
    },
    Pair(Vec<Scalar>),
    Text(String),
}

impl CoordinatesRepr {
    fn resolve(&self) -> Option<Coordinates> {
        let (lat, lng) = match self {
            CoordinatesRepr::Object { lat, lng } => (lat.as_float()?, lng.as_float()?),
            CoordinatesRepr::Pair(v) if v.len() == 2 => (v[0].as_float()?, v[1].as_float()?),
            CoordinatesRepr::Pair(_) => return None,
            CoordinatesRepr::Text(s) => {
                let (a, b) = s.split_once(',')?;
                (a.trim().parse().ok()?, b.trim().parse().ok()?)
            }
        };
        let valid = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng);
        valid.then_some(Coordinates { lat, lng })
    }
}

/// Reads a field that may hold anything; a value of the wrong shape becomes
/// `None` instead of failing the whole record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Untrusted shape of a property record: every field optional, scalars
/// accepted as numbers or text, unusable values read as absent. Converted
/// into [`Property`] by one of the `into_*` methods, which decide what is
/// required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawPropertyRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<Scalar>,
    #[serde(rename = "type", alias = "property_type", alias = "propertyType", default, deserialize_with = "lenient")]
    pub property_type: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub bedrooms: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub bathrooms: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub area: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub features: Option<FeaturesRepr>,
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<CoordinatesRepr>,
}

impl RawPropertyRecord {
    pub fn from_value(value: serde_json::Value) -> Result<Self, RecordError> {
        if !value.is_object() {
            return Err(RecordError::NotAnObject);
        }
        serde_json::from_value(value).map_err(|e| RecordError::InvalidField {
            field: "record",
            reason: e.to_string(),
        })
    }

    /// Catalog records must carry an id, name, location, price and type.
    pub fn into_catalog_property(self) -> Result<Property, RecordError> {
        let id = required(self.id.as_ref(), "id")?;
        let name = required(self.name.as_ref(), "name")?;
        let location = required(self.location.as_ref(), "location")?;
        let price = required(self.price.as_ref(), "price")?;
        let property_type = required(self.property_type.as_ref(), "type")?;
        Ok(self.finish(id, name, location, price, property_type))
    }

    /// Generated records only need a name; `derive_id` receives the name and
    /// location when the record carries no id of its own.
    pub fn into_generated_property<F>(self, derive_id: F) -> Result<Property, RecordError>
    where
        F: FnOnce(&str, &str) -> String,
    {
        let name = required(self.name.as_ref(), "name")?;
        let location = optional_text(self.location.as_ref());
        let id = match self.id.as_ref().filter(|s| !s.is_blank()) {
            Some(id) => id.as_text(),
            None => derive_id(&name, &location),
        };
        let price = self.price.as_ref().map(Scalar::as_price).unwrap_or_default();
        let property_type = optional_text(self.property_type.as_ref());
        Ok(self.finish(id, name, location, price, property_type))
    }

    fn finish(
        self,
        id: String,
        name: String,
        location: String,
        price: String,
        property_type: String,
    ) -> Property {
        Property {
            id,
            name,
            location,
            price,
            property_type,
            bedrooms: self.bedrooms.as_ref().and_then(Scalar::as_count).unwrap_or(0),
            bathrooms: self.bathrooms.as_ref().and_then(Scalar::as_count).unwrap_or(0),
            area: optional_text(self.area.as_ref()),
            description: optional_text(self.description.as_ref()),
            features: self.features.map(FeaturesRepr::into_tags).unwrap_or_default(),
            coordinates: self.coordinates.as_ref().and_then(CoordinatesRepr::resolve),
        }
    }
}

fn required(value: Option<&Scalar>, field: &'static str) -> Result<String, RecordError> {
    match value {
        Some(v) if !v.is_blank() => Ok(v.as_text()),
        _ => Err(RecordError::MissingField(field)),
    }
}

fn optional_text(value: Option<&Scalar>) -> String {
    value.map(Scalar::as_text).unwrap_or_default()
}

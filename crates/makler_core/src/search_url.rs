use std::fmt;
use std::str::FromStr;

use admin_logging::admin_debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::postal::{InvalidPostalCode, PostalCode};

pub const DEFAULT_BASE_URL: &str = "https://www.kleinanzeigen.de";
pub const DEFAULT_CATEGORY: &str = "immobilien";

const PROVIDER_PREFIX: &str = "anbieter:";
const LISTING_PREFIX: &str = "anzeige:";
const PRICE_PREFIX: &str = "preis:";
const CATEGORY_PREFIX: &str = "s-";

static LOCATION_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^k([0-9]+)c([0-9]+)l([0-9]+)$").expect("location pattern"));

/// Search template for one classifieds query. The postal code is supplied per URL.
///
/// Field names on the wire follow the backend's filter dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpec {
    #[serde(rename = "kategorie")]
    pub category: String,
    #[serde(rename = "anbieter", default, skip_serializing_if = "Option::is_none")]
    pub provider_type: Option<String>,
    #[serde(rename = "anzeige", default, skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<String>,
    #[serde(rename = "preis", default, skip_serializing_if = "Option::is_none")]
    pub price_ceiling: Option<String>,
    #[serde(rename = "suchbegriff", default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

impl Default for SearchSpec {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            provider_type: None,
            listing_type: None,
            price_ceiling: None,
            keyword: None,
        }
    }
}

impl SearchSpec {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn with_provider_type(self, provider_type: impl Into<String>) -> Self {
        Self {
            provider_type: Some(provider_type.into()),
            ..self
        }
    }

    pub fn with_listing_type(self, listing_type: impl Into<String>) -> Self {
        Self {
            listing_type: Some(listing_type.into()),
            ..self
        }
    }

    pub fn with_price_ceiling(self, price_ceiling: impl Into<String>) -> Self {
        Self {
            price_ceiling: Some(price_ceiling.into()),
            ..self
        }
    }

    pub fn with_keyword(self, keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..self
        }
    }

    fn effective_category(&self) -> &str {
        let trimmed = self.category.trim();
        if trimmed.is_empty() {
            DEFAULT_CATEGORY
        } else {
            trimmed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    InvalidPostalCode(#[from] InvalidPostalCode),
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// The site-assigned trailing id segment, e.g. `k0c195l1857`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationSegment {
    pub page: u64,
    pub category: u64,
    pub location: u64,
}

impl FromStr for LocationSegment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = LOCATION_SEGMENT.captures(s).ok_or(())?;
        let number = |i: usize| caps[i].parse::<u64>().map_err(|_| ());
        Ok(Self {
            page: number(1)?,
            category: number(2)?,
            location: number(3)?,
        })
    }
}

impl fmt::Display for LocationSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}c{}l{}", self.page, self.category, self.location)
    }
}

/// Outcome of decoding one field from a search URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldParse<T> {
    Absent,
    Parsed(T),
    /// The field was present but its raw text could not be interpreted.
    Unparseable(String),
}

impl<T> Default for FieldParse<T> {
    fn default() -> Self {
        FieldParse::Absent
    }
}

impl<T> FieldParse<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            FieldParse::Parsed(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldParse::Absent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedSearch {
    pub category: FieldParse<String>,
    pub postal_code: FieldParse<PostalCode>,
    pub provider_type: FieldParse<String>,
    pub listing_type: FieldParse<String>,
    pub price_ceiling: FieldParse<String>,
    pub keyword: FieldParse<String>,
    pub location: Option<LocationSegment>,
    /// Colon segments that are not one of the known filters.
    pub unrecognized: Vec<String>,
}

impl DecodedSearch {
    /// Lossy conversion: unparseable fields are dropped and the category falls back to the default.
    pub fn to_spec(&self) -> SearchSpec {
        SearchSpec {
            category: self
                .category
                .parsed()
                .cloned()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            provider_type: self.provider_type.parsed().cloned(),
            listing_type: self.listing_type.parsed().cloned(),
            price_ceiling: self.price_ceiling.parsed().cloned(),
            keyword: self.keyword.parsed().cloned(),
        }
    }
}

/// Maps a [`SearchSpec`] plus postal code to a search URL and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchUrlCodec {
    base_url: String,
}

impl Default for SearchUrlCodec {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl SearchUrlCodec {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn encode(&self, spec: &SearchSpec, postal_code: &str) -> Result<String, CodecError> {
        let postal_code = PostalCode::parse(postal_code)?;
        Ok(self.encode_postal_code(spec, &postal_code))
    }

    /// Segment order is fixed: category, postal code, provider, listing, price, keyword.
    pub fn encode_postal_code(&self, spec: &SearchSpec, postal_code: &PostalCode) -> String {
        let mut segments = vec![
            format!("{CATEGORY_PREFIX}{}", spec.effective_category()),
            postal_code.to_string(),
        ];
        if let Some(provider) = non_empty(&spec.provider_type) {
            segments.push(format!("{PROVIDER_PREFIX}{provider}"));
        }
        if let Some(listing) = non_empty(&spec.listing_type) {
            segments.push(format!("{LISTING_PREFIX}{listing}"));
        }
        if let Some(price) = non_empty(&spec.price_ceiling) {
            segments.push(format!("{PRICE_PREFIX}{price}:"));
        }
        if let Some(keyword) = non_empty(&spec.keyword) {
            segments.push(keyword.to_string());
        }
        format!("{}/{}", self.base_url, segments.join("/"))
    }

    pub fn decode(&self, url: &str) -> Result<DecodedSearch, CodecError> {
        decode(url)
    }
}

pub fn encode(spec: &SearchSpec, postal_code: &str) -> Result<String, CodecError> {
    SearchUrlCodec::default().encode(spec, postal_code)
}

/// Best-effort parse of a search URL into its filter fields.
///
/// The host is not checked; only the path grammar matters.
pub fn decode(url: &str) -> Result<DecodedSearch, CodecError> {
    let parsed = Url::parse(url.trim()).map_err(|err| CodecError::InvalidUrl {
        url: url.to_string(),
        reason: err.to_string(),
    })?;
    let mut segments: Vec<String> = parsed
        .path_segments()
        .map(|parts| {
            parts
                .filter(|part| !part.is_empty())
                .map(decode_segment)
                .collect()
        })
        .unwrap_or_default();

    let mut decoded = DecodedSearch::default();

    if let Some(last) = segments.last() {
        if let Ok(location) = last.parse::<LocationSegment>() {
            decoded.location = Some(location);
            segments.pop();
        }
    }

    let mut rest = segments.into_iter();

    match rest.next() {
        None => return Ok(decoded),
        Some(first) => {
            decoded.category = match first.strip_prefix(CATEGORY_PREFIX) {
                Some(category) if !category.is_empty() => FieldParse::Parsed(category.to_string()),
                _ => FieldParse::Unparseable(first),
            };
        }
    }

    let mut pool: Vec<String> = Vec::new();
    if let Some(second) = rest.next() {
        if let Ok(code) = PostalCode::parse(&second) {
            decoded.postal_code = FieldParse::Parsed(code);
        } else if second.bytes().all(|b| b.is_ascii_digit()) {
            decoded.postal_code = FieldParse::Unparseable(second);
        } else {
            pool.push(second);
        }
    }
    pool.extend(rest);

    let mut keyword_parts = Vec::new();
    for segment in pool {
        if let Some(value) = segment.strip_prefix(PROVIDER_PREFIX) {
            set_once(&mut decoded.provider_type, plain_value(value, &segment));
        } else if let Some(value) = segment.strip_prefix(LISTING_PREFIX) {
            set_once(&mut decoded.listing_type, plain_value(value, &segment));
        } else if let Some(value) = segment.strip_prefix(PRICE_PREFIX) {
            set_once(&mut decoded.price_ceiling, price_value(value, &segment));
        } else if segment.contains(':') {
            admin_debug!("Unrecognized filter segment in search url: {}", segment);
            decoded.unrecognized.push(segment);
        } else {
            keyword_parts.push(segment);
        }
    }
    if !keyword_parts.is_empty() {
        decoded.keyword = FieldParse::Parsed(keyword_parts.join("/"));
    }

    Ok(decoded)
}

fn decode_segment(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|value| value.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn set_once(field: &mut FieldParse<String>, value: FieldParse<String>) {
    if field.is_absent() {
        *field = value;
    }
}

fn plain_value(value: &str, segment: &str) -> FieldParse<String> {
    if value.is_empty() || value.contains(':') {
        FieldParse::Unparseable(segment.to_string())
    } else {
        FieldParse::Parsed(value.to_string())
    }
}

// Only the open-ended `preis:<digits>:` form is produced by the encoder.
fn price_value(value: &str, segment: &str) -> FieldParse<String> {
    match value.strip_suffix(':') {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            FieldParse::Parsed(digits.to_string())
        }
        _ => FieldParse::Unparseable(segment.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_segment_round_trips_through_display() {
        let location: LocationSegment = "k0c195l1857".parse().unwrap();
        assert_eq!(
            location,
            LocationSegment {
                page: 0,
                category: 195,
                location: 1857
            }
        );
        assert_eq!(location.to_string(), "k0c195l1857");
        assert!("k0c195".parse::<LocationSegment>().is_err());
    }

    #[test]
    fn blank_optional_fields_are_not_encoded() {
        let spec = SearchSpec::default()
            .with_provider_type("  ")
            .with_keyword("");
        let url = encode(&spec, "10115").unwrap();
        assert_eq!(url, "https://www.kleinanzeigen.de/s-immobilien/10115");
    }

    #[test]
    fn custom_base_url_drops_trailing_slash() {
        let codec = SearchUrlCodec::new("http://localhost:8080/");
        let url = codec.encode(&SearchSpec::new("wohnung"), "04109").unwrap();
        assert_eq!(url, "http://localhost:8080/s-wohnung/04109");
    }
}

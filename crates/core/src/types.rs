//! Types shared across the search console: domain filters, search requests,
//! hotel records as the search service returns them, suggestion entries,
//! committed search results, and hot recommendations.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Business-domain filter
// ---------------------------------------------------------------------------

/// Business-region scoping applied to suggestion and search calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomainFilter {
    /// No scoping. Never sent over the wire.
    #[default]
    #[serde(rename = "ALL")]
    All,
    /// Mainland China.
    #[serde(rename = "CN")]
    Cn,
    /// Hong Kong, Macau and Taiwan.
    #[serde(rename = "HMT")]
    Hmt,
    /// International.
    #[serde(rename = "INTL")]
    Intl,
}

impl DomainFilter {
    /// Value of the `tag` request parameter, or `None` when the filter is
    /// [`DomainFilter::All`] and the parameter must be omitted entirely.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            DomainFilter::All => None,
            DomainFilter::Cn => Some("CN"),
            DomainFilter::Hmt => Some("HMT"),
            DomainFilter::Intl => Some("INTL"),
        }
    }

    /// Human-readable label for filter chips.
    pub fn label(self) -> &'static str {
        match self {
            DomainFilter::All => "All",
            DomainFilter::Cn => "Mainland",
            DomainFilter::Hmt => "HK / Macau / Taiwan",
            DomainFilter::Intl => "International",
        }
    }
}

impl fmt::Display for DomainFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().unwrap_or("ALL"))
    }
}

impl FromStr for DomainFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(DomainFilter::All),
            "cn" => Ok(DomainFilter::Cn),
            "hmt" => Ok(DomainFilter::Hmt),
            "intl" => Ok(DomainFilter::Intl),
            other => Err(format!("unknown domain '{other}' (expected all, cn, hmt or intl)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Search request
// ---------------------------------------------------------------------------

/// One call to the remote search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub filter: DomainFilter,
    pub page_size: usize,
    /// Optional location hints understood by the smart search endpoint.
    pub country: Option<String>,
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, filter: DomainFilter, page_size: usize) -> Self {
        Self {
            query: query.into(),
            filter,
            page_size,
            country: None,
            city: None,
            lat: None,
            lon: None,
        }
    }

    /// Query-string pairs for `GET /search/smart`. Absent hints and the
    /// `ALL` filter produce no pair at all.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("q", self.query.clone()), ("size", self.page_size.to_string())];
        if let Some(tag) = self.filter.tag() {
            pairs.push(("tag", tag.to_string()));
        }
        if let Some(country) = &self.country {
            pairs.push(("country", country.clone()));
        }
        if let Some(city) = &self.city {
            pairs.push(("city", city.clone()));
        }
        if let Some(lat) = self.lat {
            pairs.push(("lat", lat.to_string()));
        }
        if let Some(lon) = self.lon {
            pairs.push(("lon", lon.to_string()));
        }
        pairs
    }
}

// ---------------------------------------------------------------------------
// Hotel records (search hits)
// ---------------------------------------------------------------------------

/// A hotel document as returned by the search service. Every field is
/// optional on the wire; `highlighted_*` fields carry `<em>` markup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HotelRecord {
    pub id: Option<String>,
    pub hotel_id: Option<i64>,
    pub tag_source: Option<String>,
    pub provider_source: Option<String>,
    pub name_cn: Option<String>,
    pub name_en: Option<String>,
    pub name_traditional: Option<String>,
    pub country_cn: Option<String>,
    pub country_en: Option<String>,
    pub city_cn: Option<String>,
    pub city_en: Option<String>,
    pub region_cn: Option<String>,
    pub region_en: Option<String>,
    pub address_cn: Option<String>,
    pub address_en: Option<String>,
    pub address_traditional: Option<String>,
    pub brand_cn: Option<String>,
    pub brand_en: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub highlighted_name_cn: Option<String>,
    pub highlighted_name_en: Option<String>,
    pub highlighted_name_traditional: Option<String>,
    pub highlighted_address_cn: Option<String>,
    pub highlighted_address_en: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl HotelRecord {
    /// Numeric hotel id if present, otherwise the document id.
    pub fn ident(&self) -> String {
        match (self.hotel_id, &self.id) {
            (Some(id), _) => id.to_string(),
            (None, Some(id)) => id.clone(),
            (None, None) => "?".to_string(),
        }
    }

    /// Raw name: Chinese first, then English.
    pub fn raw_name(&self) -> Option<&str> {
        non_empty(&self.name_cn).or_else(|| non_empty(&self.name_en))
    }

    /// Name with a synthesized `hotel #<id>` placeholder when the record has none.
    pub fn display_name(&self) -> String {
        self.raw_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("hotel #{}", self.ident()))
    }

    /// Server-highlighted name, if the service supplied one.
    pub fn highlighted_name(&self) -> Option<&str> {
        non_empty(&self.highlighted_name_cn)
            .or_else(|| non_empty(&self.highlighted_name_traditional))
            .or_else(|| non_empty(&self.highlighted_name_en))
    }

    pub fn city(&self) -> Option<&str> {
        non_empty(&self.city_cn).or_else(|| non_empty(&self.city_en))
    }

    pub fn region(&self) -> Option<&str> {
        non_empty(&self.region_cn).or_else(|| non_empty(&self.region_en))
    }

    pub fn brand(&self) -> Option<&str> {
        non_empty(&self.brand_cn).or_else(|| non_empty(&self.brand_en))
    }

    pub fn country(&self) -> Option<&str> {
        non_empty(&self.country_cn).or_else(|| non_empty(&self.country_en))
    }

    /// "City · Region", either half may be missing.
    pub fn location_line(&self) -> Option<String> {
        match (self.city(), self.region()) {
            (Some(city), Some(region)) => Some(format!("{city} · {region}")),
            (Some(city), None) => Some(city.to_string()),
            (None, Some(region)) => Some(region.to_string()),
            (None, None) => None,
        }
    }

    /// Address, preferring highlighted markup over the raw field.
    pub fn address(&self) -> Option<&str> {
        non_empty(&self.highlighted_address_cn)
            .or_else(|| non_empty(&self.highlighted_address_en))
            .or_else(|| non_empty(&self.address_cn))
            .or_else(|| non_empty(&self.address_en))
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Strip highlight tags (`<em>`, `</em>`, ...) for plain-text renderers.
pub fn strip_highlight(markup: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("static regex"));
    tag.replace_all(markup, "").into_owned()
}

// ---------------------------------------------------------------------------
// Search pages and committed results
// ---------------------------------------------------------------------------

/// The `data` payload of a smart search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchPage {
    pub keyword: Option<String>,
    pub total: Option<u64>,
    pub hotels: Vec<HotelRecord>,
    pub duration_ms: Option<u64>,
}

impl SearchPage {
    pub fn total_count(&self) -> u64 {
        self.total.unwrap_or(self.hotels.len() as u64)
    }
}

/// Result set owned by the search executor. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub items: Vec<HotelRecord>,
    pub total_count: u64,
    pub issued_query: String,
    pub issued_filter: DomainFilter,
}

impl SearchResult {
    pub fn from_page(page: SearchPage, request: &SearchRequest) -> Self {
        let total_count = page.total_count();
        Self {
            items: page.hotels,
            total_count,
            issued_query: request.query.clone(),
            issued_filter: request.filter,
        }
    }

    /// Zero items, zero total: what a failed search degrades to.
    pub fn empty(request: &SearchRequest) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            issued_query: request.query.clone(),
            issued_filter: request.filter,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Suggestion entries
// ---------------------------------------------------------------------------

/// One row of the autosuggest overlay, built from a search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionEntry {
    /// Plain text committed when the row is picked.
    pub display_text: String,
    /// English name shown next to a Chinese primary name.
    pub display_text_secondary: Option<String>,
    /// Server-highlighted name, preferred by renderers over `display_text`.
    pub highlight_markup: Option<String>,
    pub source: HotelRecord,
}

impl SuggestionEntry {
    pub fn from_hit(hit: HotelRecord) -> Self {
        let display_text = hit.display_name();
        let display_text_secondary = non_empty(&hit.name_en)
            .filter(|en| *en != display_text)
            .map(str::to_string);
        let highlight_markup = hit.highlighted_name().map(str::to_string);
        Self {
            display_text,
            display_text_secondary,
            highlight_markup,
            source: hit,
        }
    }

    /// Label for plain-text output: highlighted name with tags stripped, or the display text.
    pub fn label(&self) -> String {
        match &self.highlight_markup {
            Some(markup) => strip_highlight(markup),
            None => self.display_text.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Hot recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotRegion {
    pub name: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotHotel {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub name_en: Option<String>,
    pub city: String,
    #[serde(default)]
    pub brand: Option<String>,
}

/// Payload of the hot-recommendations panel, loaded once per session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub popular_regions: Vec<HotRegion>,
    pub popular_hotels: Vec<HotHotel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel(json: serde_json::Value) -> HotelRecord {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn all_filter_is_never_sent() {
        let req = SearchRequest::new("paris", DomainFilter::All, 8);
        let keys: Vec<&str> = req.query_pairs().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["q", "size"]);

        let req = SearchRequest::new("paris", DomainFilter::Hmt, 20);
        assert!(req.query_pairs().contains(&("tag", "HMT".to_string())));
    }

    #[test]
    fn domain_filter_parses_case_insensitively() {
        assert_eq!("INTL".parse::<DomainFilter>().unwrap(), DomainFilter::Intl);
        assert_eq!("cn".parse::<DomainFilter>().unwrap(), DomainFilter::Cn);
        assert!("mars".parse::<DomainFilter>().is_err());
        assert_eq!(DomainFilter::All.to_string(), "ALL");
    }

    #[test]
    fn hotel_record_reads_camel_case_with_nulls() {
        let h = hotel(serde_json::json!({
            "id": "doc-1",
            "hotelId": 42,
            "nameCn": null,
            "nameEn": "Tokyo Bay Inn",
            "cityEn": "Tokyo",
            "regionCn": "关东",
            "lat": 35.6,
            "lon": 139.7,
            "unknownField": [1, 2, 3]
        }));
        assert_eq!(h.display_name(), "Tokyo Bay Inn");
        assert_eq!(h.location_line().as_deref(), Some("Tokyo · 关东"));
        assert_eq!(h.coordinates(), Some((35.6, 139.7)));
        assert_eq!(h.ident(), "42");
    }

    #[test]
    fn nameless_hotel_gets_placeholder() {
        let h = hotel(serde_json::json!({ "hotelId": 7, "nameCn": "  " }));
        assert_eq!(h.display_name(), "hotel #7");
    }

    #[test]
    fn suggestion_prefers_highlight_over_raw_name() {
        let entry = SuggestionEntry::from_hit(hotel(serde_json::json!({
            "hotelId": 1,
            "nameCn": "上海外滩W酒店",
            "nameEn": "W Shanghai - The Bund",
            "highlightedNameCn": "<em>上海</em>外滩W酒店"
        })));
        assert_eq!(entry.display_text, "上海外滩W酒店");
        assert_eq!(entry.display_text_secondary.as_deref(), Some("W Shanghai - The Bund"));
        assert_eq!(entry.highlight_markup.as_deref(), Some("<em>上海</em>外滩W酒店"));
        assert_eq!(entry.label(), "上海外滩W酒店");
    }

    #[test]
    fn english_only_suggestion_has_no_secondary_text() {
        let entry = SuggestionEntry::from_hit(hotel(serde_json::json!({ "nameEn": "Park Hyatt" })));
        assert_eq!(entry.display_text, "Park Hyatt");
        assert!(entry.display_text_secondary.is_none());
        assert!(entry.highlight_markup.is_none());
    }

    #[test]
    fn page_total_falls_back_to_hit_count() {
        let page = SearchPage {
            hotels: vec![HotelRecord::default(), HotelRecord::default()],
            ..Default::default()
        };
        assert_eq!(page.total_count(), 2);
        let req = SearchRequest::new("x", DomainFilter::Cn, 20);
        let result = SearchResult::from_page(page, &req);
        assert_eq!(result.issued_filter, DomainFilter::Cn);
        assert_eq!(result.total_count, 2);
    }
}

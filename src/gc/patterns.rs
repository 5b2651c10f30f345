use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static CSRF_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""csrfToken":"([^"]+)""#).unwrap());

static TB_CURRENT_GEOCACHE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""currentGeocache":\{([^}]+)\}"#).unwrap());

/// Matches a JSON snippet like `{"id":123,"referenceCode":"GCxyz","name":"somename"}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocacheReference {
    pub id: Option<i64>,
    pub reference_code: Option<String>,
    pub name: Option<String>,
}

/// Extract the anti-forgery token embedded in a log page.
pub fn csrf_token(html: &str) -> Option<String> {
    CSRF_TOKEN_RE
        .captures(html)
        .map(|caps| caps[1].to_string())
}

/// Geocache a trackable currently sits in, as announced in its log page.
pub fn current_geocache(html: &str) -> Option<GeocacheReference> {
    let inner = TB_CURRENT_GEOCACHE_RE.captures(html)?;
    serde_json::from_str(&format!("{{{}}}", &inner[1])).ok()
}

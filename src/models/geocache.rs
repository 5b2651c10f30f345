use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    #[default]
    Traditional,
    Multi,
    Mystery,
    Letterbox,
    Wherigo,
    Earth,
    Virtual,
    Webcam,
    Event,
    Unknown,
}

impl CacheType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheType::Traditional => "traditional",
            CacheType::Multi => "multi",
            CacheType::Mystery => "mystery",
            CacheType::Letterbox => "letterbox",
            CacheType::Wherigo => "wherigo",
            CacheType::Earth => "earth",
            CacheType::Virtual => "virtual",
            CacheType::Webcam => "webcam",
            CacheType::Event => "event",
            CacheType::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "traditional" => CacheType::Traditional,
            "multi" => CacheType::Multi,
            "mystery" => CacheType::Mystery,
            "letterbox" => CacheType::Letterbox,
            "wherigo" => CacheType::Wherigo,
            "earth" => CacheType::Earth,
            "virtual" => CacheType::Virtual,
            "webcam" => CacheType::Webcam,
            "event" => CacheType::Event,
            _ => CacheType::Unknown,
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self, CacheType::Event)
    }
}

/// Locally known state of a geocache, as far as logging touches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geocache {
    pub geocode: String,
    pub name: String,
    pub cache_type: CacheType,
    /// Listing guid, needed for GCVote.
    pub guid: Option<String>,
    pub owned: bool,
    pub found: bool,
    pub dnf: bool,
    pub disabled: bool,
    pub favorite: bool,
    pub favorite_points: i32,
    pub visited_date: Option<NaiveDateTime>,
    pub my_vote: f32,
}

impl Geocache {
    pub fn new(geocode: impl Into<String>) -> Self {
        let geocode = geocode.into();
        Self {
            name: geocode.clone(),
            geocode,
            cache_type: CacheType::default(),
            guid: None,
            owned: false,
            found: false,
            dnf: false,
            disabled: false,
            favorite: false,
            favorite_points: 0,
            visited_date: None,
            my_vote: 0.0,
        }
    }
}

use serde::{Deserialize, Serialize};

use super::log_type::LogTypeTrackable;

/// Service a trackable is registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackableBrand {
    TravelBug,
    GeoKrety,
    Unknown,
}

impl TrackableBrand {
    pub fn label(&self) -> &'static str {
        match self {
            TrackableBrand::TravelBug => "Travel Bug",
            TrackableBrand::GeoKrety => "GeoKrety",
            TrackableBrand::Unknown => "Unknown",
        }
    }

    /// Guess the brand from a public trackable code.
    pub fn from_code(code: &str) -> Self {
        let code = code.to_ascii_uppercase();
        if code.starts_with("TB") {
            TrackableBrand::TravelBug
        } else if code.starts_with("GK") {
            TrackableBrand::GeoKrety
        } else {
            TrackableBrand::Unknown
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackableLog {
    /// Public reference code, e.g. `TB1234`.
    pub geocode: String,
    /// Secret code written on the trackable itself.
    pub track_code: Option<String>,
    pub name: String,
    pub brand: TrackableBrand,
    pub action: LogTypeTrackable,
}

impl TrackableLog {
    pub fn new(geocode: impl Into<String>, action: LogTypeTrackable) -> Self {
        let geocode = geocode.into();
        Self {
            brand: TrackableBrand::from_code(&geocode),
            name: geocode.clone(),
            geocode,
            track_code: None,
            action,
        }
    }

    pub fn with_track_code(mut self, code: impl Into<String>) -> Self {
        self.track_code = Some(code.into());
        self
    }

    pub fn is_moved(&self) -> bool {
        self.action != LogTypeTrackable::DoNothing
    }
}

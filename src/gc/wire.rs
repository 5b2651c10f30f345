use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WebLogTrackable {
    pub trackable_code: String,
    pub trackable_log_type_id: Option<i32>,
}

/// Body of a cache log post to geocaching.com, e.g.:
///
/// ```json
/// {"images":[],"logDate":"2023-09-08T22:31:54","logText":"TFTC","logType":2,
///  "trackables":[{"trackableCode":"TBxyz","trackableLogTypeId":75}],"usedFavoritePoint":false}
/// ```
///
/// answered by a [`WebLogResponse`] like:
///
/// ```json
/// {"guid":"xyz","logReferenceCode":"GLxyz","dateTimeCreatedUtc":"2023-09-17T14:03:26",
///  "logDate":"2023-09-08T12:00:00","logType":4,"images":[],"trackables":[],"cannotDelete":false}
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebLogRequest {
    pub images: Vec<String>,
    #[serde(with = "local_timestamp")]
    pub log_date: NaiveDateTime,
    pub log_text: String,
    pub log_type: i32,
    pub trackables: Vec<WebLogTrackable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_favorite_point: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebLogResponse {
    pub guid: Option<String>,
    pub log_reference_code: Option<String>,
    #[serde(with = "local_timestamp::option")]
    pub date_time_created_utc: Option<NaiveDateTime>,
    #[serde(with = "local_timestamp::option")]
    pub date_time_last_updated_utc: Option<NaiveDateTime>,
    #[serde(with = "local_timestamp::option")]
    pub log_date: Option<NaiveDateTime>,
    pub log_type: Option<i32>,
    pub log_text: Option<String>,
    pub images: Vec<serde_json::Value>,
    pub trackables: Vec<serde_json::Value>,
    pub cannot_delete: Option<bool>,
    pub is_archived: Option<bool>,
    pub used_favorite_point: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebTrackableLogRequest {
    pub images: Vec<String>,
    #[serde(with = "local_timestamp")]
    pub log_date: NaiveDateTime,
    pub log_text: String,
    pub log_type: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_code: Option<String>,
    /// Mandatory for "retrieved it" logs, omitted otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geocache_reference_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebTrackableLogType {
    pub id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebTrackableLogResponse {
    pub guid: Option<String>,
    pub log_reference_code: Option<String>,
    #[serde(with = "local_timestamp::option")]
    pub log_date: Option<NaiveDateTime>,
    pub log_type: Option<WebTrackableLogType>,
    pub log_text: Option<String>,
    pub tracking_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebLogImageResponse {
    pub guid: Option<String>,
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub success: Option<bool>,
}

/// Build a log image id of the form `<guid>::<imageId>`.
pub fn log_image_id(image_guid: Option<&str>, image_id: Option<&str>) -> String {
    format!(
        "{}::{}",
        image_guid.unwrap_or_default(),
        image_id.unwrap_or_default()
    )
}

pub fn guid_from(log_image_id: &str) -> &str {
    log_image_id.split("::").next().unwrap_or_default()
}

pub fn image_id_from(log_image_id: &str) -> &str {
    log_image_id.split("::").nth(1).unwrap_or_default()
}

/// Timestamps without zone, e.g. `2023-09-17T14:03:26`.
pub mod local_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Accepts optional fractional seconds and a trailing `Z`.
    pub fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        raw.trim_end_matches('Z').parse::<NaiveDateTime>()
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

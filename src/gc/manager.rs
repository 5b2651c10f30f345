use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use crate::config::Config;
use crate::connector::{ImageResult, LogResult, LoggingManager, Login, VotingCapability};
use crate::error::LogError;
use crate::models::{
    CacheType, Geocache, Image, LogContextInfo, LogEntry, LogType, ReportProblemType,
    TrackableLog,
};

use super::api::GcLogApi;
use super::vote::GcVote;

/// Logging on geocaching.com caches.
///
/// Trackables and favorite points travel inside the cache log. Ratings go to
/// GCVote separately, and reported problems are always posted as logs of
/// their own.
pub struct GcLoggingManager {
    api: Arc<GcLogApi>,
    connector_id: String,
    /// -1 while unknown
    caches_found: AtomicI64,
    vote: Option<GcVote>,
}

impl GcLoggingManager {
    pub fn new(api: Arc<GcLogApi>, caches_found: Option<u32>, vote: Option<GcVote>) -> Self {
        let connector_id = api
            .website_url()
            .split("://")
            .nth(1)
            .unwrap_or(api.website_url())
            .to_string();
        Self {
            api,
            connector_id,
            caches_found: AtomicI64::new(caches_found.map(i64::from).unwrap_or(-1)),
            vote,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, LogError> {
        let api = Arc::new(GcLogApi::new(config)?);
        let vote = match &config.gcvote {
            Some(vote_config) => {
                let client = reqwest::Client::builder()
                    .timeout(config.http_timeout)
                    .build()
                    .map_err(|e| {
                        LogError::log_post(format!("Failed to build GCVote client: {e}"))
                    })?;
                Some(GcVote::new(client, vote_config, &config.username))
            }
            None => None,
        };
        Ok(Self::new(api, config.caches_found, vote))
    }

    pub fn api(&self) -> &Arc<GcLogApi> {
        &self.api
    }
}

/// Log types the website offers for a cache.
pub fn available_log_types(cache: &Geocache) -> Vec<LogType> {
    let mut types = Vec::new();
    if cache.cache_type.is_event() {
        types.extend([LogType::WillAttend, LogType::Attended]);
    } else if cache.cache_type == CacheType::Webcam {
        types.extend([LogType::WebcamPhotoTaken, LogType::DidntFindIt]);
    } else {
        types.extend([LogType::FoundIt, LogType::DidntFindIt]);
    }
    types.push(LogType::Note);

    if cache.owned {
        types.push(LogType::OwnerMaintenance);
        types.push(if cache.disabled {
            LogType::EnableListing
        } else {
            LogType::TempDisableListing
        });
        if !cache.cache_type.is_event() {
            types.push(LogType::UpdateCoordinates);
        }
        types.push(LogType::Archive);
    }
    types
}

/// Problems a visitor may report for a cache.
pub fn available_report_problems(cache: &Geocache) -> Vec<ReportProblemType> {
    if cache.owned {
        return Vec::new();
    }
    ReportProblemType::PROBLEMS
        .into_iter()
        .filter(|p| {
            !cache.cache_type.is_event()
                || matches!(p, ReportProblemType::Archive | ReportProblemType::Other)
        })
        .collect()
}

#[async_trait]
impl LoggingManager for GcLoggingManager {
    fn connector_id(&self) -> &str {
        &self.connector_id
    }

    async fn log_context(
        &self,
        cache: &Geocache,
        service_log_id: Option<&str>,
    ) -> LogContextInfo {
        let mut info = LogContextInfo::new(
            &self.connector_id,
            &cache.geocode,
            service_log_id.map(str::to_string),
        );

        if !self.api.probe_log_page(&cache.geocode).await {
            info.add_error("Unable to load the log page from geocaching.com");
        }

        info.available_log_types = available_log_types(cache);
        info.available_report_problem_types = available_report_problems(cache);
        info
    }

    async fn create_log(
        &self,
        cache: &Geocache,
        entry: &LogEntry,
        _password: Option<&str>,
        trackables: &[TrackableLog],
        add_to_favorites: bool,
        _rating: f32,
    ) -> Result<LogResult, LogError> {
        self.api
            .create_log(&cache.geocode, entry, trackables, add_to_favorites)
            .await
    }

    async fn edit_log(
        &self,
        cache: &Geocache,
        entry: &LogEntry,
        trackables: &[TrackableLog],
        used_favorite_point: Option<bool>,
    ) -> Result<LogResult, LogError> {
        self.api
            .edit_log(&cache.geocode, entry, trackables, used_favorite_point)
            .await
    }

    async fn delete_log(
        &self,
        _cache: &Geocache,
        service_log_id: &str,
    ) -> Result<LogResult, LogError> {
        self.api.delete_log(service_log_id).await
    }

    async fn create_log_image(
        &self,
        service_log_id: &str,
        image: &Image,
        data: Vec<u8>,
    ) -> Result<ImageResult, LogError> {
        self.api.add_log_image(service_log_id, image, data).await
    }

    async fn edit_log_image(
        &self,
        service_log_id: &str,
        service_image_id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<ImageResult, LogError> {
        self.api
            .edit_log_image_data(service_log_id, service_image_id, title, description)
            .await
    }

    async fn delete_log_image(
        &self,
        service_log_id: &str,
        service_image_id: &str,
    ) -> Result<ImageResult, LogError> {
        self.api
            .delete_log_image(service_log_id, service_image_id)
            .await
    }

    fn supports_log_with_trackables(&self) -> bool {
        true
    }

    fn supports_log_with_favorite(&self) -> bool {
        true
    }

    fn supports_log_with_vote(&self) -> bool {
        false
    }

    fn can_log_report_type(&self, _problem: ReportProblemType) -> bool {
        false
    }

    fn login(&self) -> Option<&dyn Login> {
        Some(self)
    }

    fn voting(&self) -> Option<&dyn VotingCapability> {
        self.vote.as_ref().map(|v| v as &dyn VotingCapability)
    }
}

impl Login for GcLoggingManager {
    fn user_name(&self) -> &str {
        self.api.username()
    }

    fn caches_found(&self) -> Option<u32> {
        u32::try_from(self.caches_found.load(Ordering::Relaxed)).ok()
    }

    fn increase_caches_found(&self) {
        let _ = self
            .caches_found
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                (n >= 0).then_some(n + 1)
            });
    }
}

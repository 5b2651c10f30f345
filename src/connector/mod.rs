pub mod registry;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::LogError;
use crate::models::{
    Geocache, Image, LogContextInfo, LogEntry, ReportProblemType, TrackableBrand, TrackableLog,
};

pub use registry::TrackableConnectorRegistry;

/// A log accepted by a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogResult {
    /// Reference code of the log at the service, e.g. `GL1234`.
    pub service_log_id: String,
}

impl LogResult {
    pub fn ok(service_log_id: impl Into<String>) -> Self {
        Self {
            service_log_id: service_log_id.into(),
        }
    }
}

/// An image accepted by a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResult {
    pub image_uri: String,
    pub service_image_id: String,
}

impl ImageResult {
    pub fn ok(image_uri: impl Into<String>, service_image_id: impl Into<String>) -> Self {
        Self {
            image_uri: image_uri.into(),
            service_image_id: service_image_id.into(),
        }
    }
}

/// Writes logs to one geocaching service.
///
/// Optional capabilities (login state, voting) are exposed as accessors
/// returning trait objects, so a connector only implements what it supports.
#[async_trait]
pub trait LoggingManager: Send + Sync {
    /// Host name of the service, used as connector id.
    fn connector_id(&self) -> &str;

    async fn log_context(
        &self,
        cache: &Geocache,
        service_log_id: Option<&str>,
    ) -> LogContextInfo;

    async fn create_log(
        &self,
        cache: &Geocache,
        entry: &LogEntry,
        password: Option<&str>,
        trackables: &[TrackableLog],
        add_to_favorites: bool,
        rating: f32,
    ) -> Result<LogResult, LogError>;

    /// `used_favorite_point` of `None` keeps the log's favorite point unchanged.
    async fn edit_log(
        &self,
        cache: &Geocache,
        entry: &LogEntry,
        trackables: &[TrackableLog],
        used_favorite_point: Option<bool>,
    ) -> Result<LogResult, LogError>;

    async fn delete_log(&self, cache: &Geocache, service_log_id: &str)
    -> Result<LogResult, LogError>;

    async fn create_log_image(
        &self,
        service_log_id: &str,
        image: &Image,
        data: Vec<u8>,
    ) -> Result<ImageResult, LogError>;

    async fn edit_log_image(
        &self,
        service_log_id: &str,
        service_image_id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<ImageResult, LogError>;

    async fn delete_log_image(
        &self,
        service_log_id: &str,
        service_image_id: &str,
    ) -> Result<ImageResult, LogError>;

    fn supports_log_with_trackables(&self) -> bool;

    fn supports_log_with_favorite(&self) -> bool;

    /// Whether a rating is sent as part of the log itself.
    fn supports_log_with_vote(&self) -> bool;

    /// Whether a reported problem is carried by the log itself.
    fn can_log_report_type(&self, problem: ReportProblemType) -> bool;

    fn login(&self) -> Option<&dyn Login> {
        None
    }

    fn voting(&self) -> Option<&dyn VotingCapability> {
        None
    }
}

/// Account state of a connector the user is logged in to.
pub trait Login: Send + Sync {
    fn user_name(&self) -> &str;

    fn caches_found(&self) -> Option<u32>;

    fn increase_caches_found(&self);
}

#[async_trait]
pub trait VotingCapability: Send + Sync {
    fn supports_voting(&self, cache: &Geocache) -> bool;

    fn is_valid_rating(&self, rating: f32) -> bool;

    /// Returns whether the vote was accepted.
    async fn post_vote(&self, cache: &Geocache, rating: f32) -> bool;
}

#[async_trait]
pub trait TrackableLoggingManager: Send + Sync {
    async fn post_log(
        &self,
        cache: Option<&Geocache>,
        trackable_log: &TrackableLog,
        date: NaiveDateTime,
        text: &str,
    ) -> Result<LogResult, LogError>;
}

pub trait TrackableConnector: Send + Sync {
    fn brand(&self) -> TrackableBrand;

    /// Generic connectors have their trackables logged after the cache log,
    /// instead of inline with it.
    fn is_generic_loggable(&self) -> bool;

    fn logging_manager(&self) -> Option<Arc<dyn TrackableLoggingManager>>;
}

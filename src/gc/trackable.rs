use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::connector::{LogResult, TrackableConnector, TrackableLoggingManager};
use crate::error::LogError;
use crate::models::{Geocache, TrackableBrand, TrackableLog};

use super::api::GcLogApi;

/// Travel Bugs live on geocaching.com. When logging a cache they ride along
/// in the cache log, so this connector is not generic-loggable; its manager
/// posts standalone trackable logs.
pub struct TravelBugConnector {
    manager: Arc<dyn TrackableLoggingManager>,
}

impl TravelBugConnector {
    pub fn new(api: Arc<GcLogApi>) -> Self {
        Self {
            manager: Arc::new(TravelBugLoggingManager { api }),
        }
    }
}

impl TrackableConnector for TravelBugConnector {
    fn brand(&self) -> TrackableBrand {
        TrackableBrand::TravelBug
    }

    fn is_generic_loggable(&self) -> bool {
        false
    }

    fn logging_manager(&self) -> Option<Arc<dyn TrackableLoggingManager>> {
        Some(self.manager.clone())
    }
}

pub struct TravelBugLoggingManager {
    api: Arc<GcLogApi>,
}

#[async_trait]
impl TrackableLoggingManager for TravelBugLoggingManager {
    async fn post_log(
        &self,
        _cache: Option<&Geocache>,
        trackable_log: &TrackableLog,
        date: NaiveDateTime,
        text: &str,
    ) -> Result<LogResult, LogError> {
        self.api.create_log_trackable(trackable_log, date, text).await
    }
}

pub mod config;
pub mod error;
pub mod state;
pub mod connector;
pub mod db;
pub mod models;
pub mod gc;
pub mod log_task;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::connector::{LoggingManager, TrackableConnectorRegistry};
use crate::error::LogError;
use crate::gc::{GcLoggingManager, TravelBugConnector};
use crate::log_task::{LogTaskRunner, numbered_image_titles};
use crate::state::{AppState, SharedState};

pub fn build_state(pool: SqlitePool, config: Config) -> Result<SharedState, LogError> {
    let gc = Arc::new(GcLoggingManager::from_config(&config)?);

    if gc.voting().is_some() {
        tracing::info!("GCVote configured");
    }

    // Travel Bugs ride along in cache logs; other brands register here to
    // have their trackables logged after the cache log.
    let mut trackables = TrackableConnectorRegistry::new();
    trackables.register(Arc::new(TravelBugConnector::new(gc.api().clone())));
    let trackables = Arc::new(trackables);

    let runner = LogTaskRunner::new(
        pool.clone(),
        gc.clone(),
        trackables.clone(),
        numbered_image_titles(config.image_title_prefix.clone()),
    );

    Ok(Arc::new(AppState {
        pool,
        config,
        gc,
        trackables,
        runner,
    }))
}

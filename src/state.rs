use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::connector::TrackableConnectorRegistry;
use crate::gc::GcLoggingManager;
use crate::log_task::LogTaskRunner;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub gc: Arc<GcLoggingManager>,
    pub trackables: Arc<TrackableConnectorRegistry>,
    pub runner: LogTaskRunner,
}

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sqlx::SqlitePool;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::connector::{LogResult, LoggingManager, TrackableConnectorRegistry};
use crate::db;
use crate::error::{LogError, StatusCode};
use crate::models::{
    Geocache, Image, LogEntry, LogEntryBuilder, LogType, ReportProblemType, TrackableLog,
};

/// Produces the title of the n-th uploaded image.
pub type ImageTitleCreator = Arc<dyn Fn(&Image, usize) -> String + Send + Sync>;

/// Keeps an existing title, otherwise numbers images as `<prefix> <n>`.
pub fn numbered_image_titles(prefix: impl Into<String>) -> ImageTitleCreator {
    let prefix = prefix.into();
    Arc::new(move |image: &Image, pos: usize| match &image.title {
        Some(title) if !title.trim().is_empty() => title.clone(),
        _ => format!("{prefix} {}", pos + 1),
    })
}

/// Everything the user entered for one log action.
#[derive(Debug, Clone)]
pub struct LogRequest {
    pub cache: Geocache,
    pub entry: LogEntry,
    pub password: Option<String>,
    pub trackables: Vec<TrackableLog>,
    pub add_to_favorite: bool,
    /// 0 when the user did not rate.
    pub rating: f32,
}

#[derive(Debug, Clone)]
pub struct LogOutcome {
    pub log: LogResult,
    /// Cache state after the local updates.
    pub cache: Geocache,
    /// The log as it was stored locally.
    pub stored_log: LogEntry,
}

/// Posts one log action and mirrors the result locally.
///
/// The whole sequence runs here: the log itself, an optional problem report,
/// images, the local store, the rating and generic trackables. The first
/// failure of the log post ends the task; later steps report their failures
/// without undoing what was already accepted remotely.
pub struct LogTask {
    pool: SqlitePool,
    manager: Arc<dyn LoggingManager>,
    trackables: Arc<TrackableConnectorRegistry>,
    image_title: ImageTitleCreator,
    progress: watch::Sender<String>,
}

impl LogTask {
    pub fn new(
        pool: SqlitePool,
        manager: Arc<dyn LoggingManager>,
        trackables: Arc<TrackableConnectorRegistry>,
        image_title: ImageTitleCreator,
        progress: watch::Sender<String>,
    ) -> Self {
        Self {
            pool,
            manager,
            trackables,
            image_title,
            progress,
        }
    }

    fn publish_progress(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(progress = %message);
        self.progress.send_replace(message);
    }

    pub async fn run(&self, request: LogRequest) -> Result<LogOutcome, LogError> {
        let LogRequest {
            mut cache,
            entry,
            password,
            trackables,
            add_to_favorite,
            rating,
        } = request;

        let log_rating = self.rating_for_log(rating, &cache);

        let log_result = self
            .manager
            .create_log(
                &cache,
                &entry,
                password.as_deref(),
                &trackables,
                add_to_favorite,
                log_rating,
            )
            .await;

        if entry.report_problem != ReportProblemType::NoProblem
            && !self.manager.can_log_report_type(entry.report_problem)
        {
            let problem_entry = LogEntry::builder()
                .log_type(entry.report_problem.log_type())
                .date(entry.date)
                .log(entry.report_problem.text())
                .build();
            if let Err(e) = self
                .manager
                .create_log(&cache, &problem_entry, password.as_deref(), &[], false, 0.0)
                .await
            {
                tracing::warn!(geocode = %cache.geocode, "Problem report not posted: {e}");
            }
        }

        let log_result = log_result?;

        if self.manager.supports_log_with_trackables() {
            for trackable in &trackables {
                db::trackable_actions::set_action(&self.pool, trackable).await?;
            }
        }

        let login = self.manager.login();
        if entry.log_type.is_found_log() {
            if let Some(login) = login {
                login.increase_caches_found();
            }
        }

        match entry.log_type {
            LogType::TempDisableListing => cache.disabled = true,
            LogType::EnableListing => cache.disabled = false,
            _ => {}
        }

        if self.manager.supports_log_with_favorite() && add_to_favorite {
            cache.favorite = true;
            cache.favorite_points += 1;
        }

        if entry.log_type.is_found_log() {
            cache.found = true;
            cache.visited_date = Some(entry.date);
        } else if entry.log_type == LogType::DidntFindIt {
            cache.dnf = true;
            cache.visited_date = Some(entry.date);
        }
        db::caches::save_changed_cache(&self.pool, &cache).await?;

        let mut log_builder = LogEntry::builder()
            .service_log_id(&log_result.service_log_id)
            .date(entry.date)
            .log_type(entry.log_type)
            .log(&entry.log)
            .friend(true);

        // the login name may differ from the author name shown on the site
        if let Some(name) = login.map(|l| l.user_name()).filter(|n| !n.trim().is_empty()) {
            log_builder = log_builder.author(name);
        }

        let (uploaded, image_result) = self
            .post_images(&log_result.service_log_id, &entry.log_images)
            .await;
        for image in uploaded {
            log_builder = log_builder.add_log_image(image);
        }

        let stored_log = self.store_log(log_builder, &cache, &entry).await?;
        self.post_cache_rating(&mut cache, rating).await?;
        self.post_trackables(&cache, &entry, &trackables).await;

        // an image that could not be uploaded is the final state
        image_result?;

        Ok(LogOutcome {
            log: log_result,
            cache,
            stored_log,
        })
    }

    fn rating_for_log(&self, rating: f32, cache: &Geocache) -> f32 {
        match self.manager.voting() {
            Some(voting)
                if voting.supports_voting(cache)
                    && voting.is_valid_rating(rating)
                    && self.manager.supports_log_with_vote() =>
            {
                rating
            }
            _ => 0.0,
        }
    }

    /// Upload images in order, stopping at the first failure.
    async fn post_images(
        &self,
        service_log_id: &str,
        images: &[Image],
    ) -> (Vec<Image>, Result<(), LogError>) {
        let mut uploaded = Vec::new();
        if images.is_empty() {
            return (uploaded, Ok(()));
        }

        self.publish_progress("Posting images");
        for (pos, image) in images.iter().enumerate() {
            let data = match read_image(image).await {
                Some(data) => data,
                None => {
                    let err = LogError::image_post(format!("Failed to process: {}", image.uri));
                    return (uploaded, Err(err));
                }
            };

            let to_send = Image {
                title: Some((self.image_title)(image, pos)),
                ..image.clone()
            };

            match self
                .manager
                .create_log_image(service_log_id, &to_send, data)
                .await
            {
                Ok(result) => {
                    if !result.image_uri.is_empty() {
                        uploaded.push(Image {
                            uri: result.image_uri,
                            service_image_id: Some(result.service_image_id),
                            ..to_send
                        });
                    }
                }
                Err(e) => return (uploaded, Err(e)),
            }
        }

        for image in images {
            if let Some(path) = image.local_path() {
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    tracing::info!(path = %path.display(), "Uploaded image not deleted: {e}");
                }
            }
        }

        (uploaded, Ok(()))
    }

    async fn store_log(
        &self,
        log_builder: LogEntryBuilder,
        cache: &Geocache,
        entry: &LogEntry,
    ) -> Result<LogEntry, LogError> {
        let mut logs = db::logs::load_logs(&self.pool, &cache.geocode).await?;
        let log_now = log_builder.clone().build();
        logs.insert(0, log_now.clone());

        if entry.report_problem != ReportProblemType::NoProblem {
            let problem = log_builder
                .log(entry.report_problem.text())
                .log_images(Vec::new())
                .log_type(entry.report_problem.log_type())
                .build();
            logs.insert(0, problem);
        }

        db::logs::save_logs(&self.pool, &cache.geocode, &logs, true).await?;
        db::offline_logs::clear(&self.pool, &cache.geocode).await?;
        Ok(log_now)
    }

    async fn post_cache_rating(&self, cache: &mut Geocache, rating: f32) -> Result<(), LogError> {
        let Some(voting) = self.manager.voting() else {
            return Ok(());
        };
        if !voting.supports_voting(cache) || !voting.is_valid_rating(rating) {
            return Ok(());
        }

        self.publish_progress("Posting vote");
        if voting.post_vote(cache, rating).await {
            cache.my_vote = rating;
            db::caches::save_changed_cache(&self.pool, cache).await?;
        } else {
            self.publish_progress("Failed to send rating");
        }
        Ok(())
    }

    /// Log trackables of services other than the cache's own.
    async fn post_trackables(&self, cache: &Geocache, entry: &LogEntry, trackables: &[TrackableLog]) {
        for connector in self.trackables.loggable_generic() {
            let Some(manager) = connector.logging_manager() else {
                continue;
            };

            let mut seen = HashSet::new();
            let moved: Vec<&TrackableLog> = trackables
                .iter()
                .filter(|t| t.is_moved() && t.brand == connector.brand())
                .filter(|t| seen.insert(t.geocode.as_str()))
                .collect();

            for (index, trackable) in moved.iter().enumerate() {
                self.publish_progress(format!(
                    "Posting {} trackable {}/{}",
                    trackable.brand.label(),
                    index + 1,
                    moved.len()
                ));
                if let Err(e) = manager
                    .post_log(Some(cache), trackable, entry.date, &entry.log)
                    .await
                {
                    tracing::warn!(trackable = %trackable.geocode, "Trackable log not posted: {e}");
                }
            }
        }
    }
}

async fn read_image(image: &Image) -> Option<Vec<u8>> {
    let path = image.local_path()?;
    match tokio::fs::read(&path).await {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Unable to read image: {e}");
            None
        }
    }
}

/// Starts log tasks in the background, at most one per geocode.
pub struct LogTaskRunner {
    pool: SqlitePool,
    manager: Arc<dyn LoggingManager>,
    trackables: Arc<TrackableConnectorRegistry>,
    image_title: ImageTitleCreator,
    in_flight: Arc<DashMap<String, Uuid>>,
}

pub struct LogTaskHandle {
    pub id: Uuid,
    pub progress: watch::Receiver<String>,
    join: JoinHandle<Result<LogOutcome, LogError>>,
}

impl LogTaskHandle {
    pub async fn wait(self) -> Result<LogOutcome, LogError> {
        self.join
            .await
            .map_err(|e| LogError::log_post(format!("Log task aborted: {e}")))?
    }
}

struct InFlightGuard {
    in_flight: Arc<DashMap<String, Uuid>>,
    geocode: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.geocode);
    }
}

impl LogTaskRunner {
    pub fn new(
        pool: SqlitePool,
        manager: Arc<dyn LoggingManager>,
        trackables: Arc<TrackableConnectorRegistry>,
        image_title: ImageTitleCreator,
    ) -> Self {
        Self {
            pool,
            manager,
            trackables,
            image_title,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    pub fn is_running(&self, geocode: &str) -> bool {
        self.in_flight.contains_key(geocode)
    }

    pub fn spawn(&self, request: LogRequest) -> Result<LogTaskHandle, LogError> {
        let id = Uuid::now_v7();
        let geocode = request.cache.geocode.clone();

        match self.in_flight.entry(geocode.clone()) {
            Entry::Occupied(running) => {
                return Err(LogError::new(
                    StatusCode::AlreadyRunning,
                    format!("Log task {} is already running for {geocode}", running.get()),
                ));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }
        let guard = InFlightGuard {
            in_flight: self.in_flight.clone(),
            geocode: geocode.clone(),
        };

        let (progress_tx, progress_rx) = watch::channel(String::new());
        let task = LogTask::new(
            self.pool.clone(),
            self.manager.clone(),
            self.trackables.clone(),
            self.image_title.clone(),
            progress_tx,
        );

        let span = tracing::info_span!("log_task", task_id = %id, geocode = %geocode);
        let join = tokio::spawn(
            async move {
                let _guard = guard;
                tracing::info!(log_type = ?request.entry.log_type, "Log task started");
                let result = task.run(request).await;
                match &result {
                    Ok(outcome) => {
                        tracing::info!(log_id = %outcome.log.service_log_id, "Log task finished")
                    }
                    Err(e) => tracing::warn!(status = %e.status, "Log task failed: {e}"),
                }
                result
            }
            .instrument(span),
        );

        Ok(LogTaskHandle {
            id,
            progress: progress_rx,
            join,
        })
    }
}

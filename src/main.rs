use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cachelog::config::Config;
use cachelog::connector::{LoggingManager, TrackableConnector};
use cachelog::db;
use cachelog::gc::wire::local_timestamp;
use cachelog::log_task::LogRequest;
use cachelog::models::{
    Image, LogEntry, LogType, LogTypeTrackable, OfflineLog, ReportProblemType, TrackableBrand,
    TrackableLog,
};
use cachelog::state::SharedState;

#[derive(Parser)]
#[command(name = "cachelog", about = "Post geocache logs to geocaching.com")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Post a new log for a cache
    Log {
        geocode: String,
        #[arg(long = "type", default_value = "found")]
        log_type: LogType,
        #[arg(long)]
        text: String,
        /// Local timestamp, e.g. 2024-05-01T14:30:00 (defaults to now)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDateTime>,
        #[arg(long)]
        favorite: bool,
        #[arg(long, default_value_t = 0.0)]
        rating: f32,
        #[arg(long = "image")]
        images: Vec<String>,
        /// Trackable movement as CODE=action, e.g. TB12AB=drop
        #[arg(long = "trackable", value_parser = parse_trackable)]
        trackables: Vec<TrackableLog>,
        #[arg(long, default_value = "no_problem")]
        report_problem: ReportProblemType,
        #[arg(long)]
        password: Option<String>,
    },
    /// Change text, type or date of a posted log
    ///
    /// Type, date and favorite point keep their current values unless given.
    /// Logs not stored locally need both --type and --date.
    EditLog {
        geocode: String,
        log_id: String,
        #[arg(long = "type")]
        log_type: Option<LogType>,
        #[arg(long)]
        text: String,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDateTime>,
        /// Spend (true) or return (false) the favorite point
        #[arg(long)]
        favorite: Option<bool>,
    },
    /// Delete a posted log
    DeleteLog { geocode: String, log_id: String },
    /// Post a standalone trackable log
    LogTrackable {
        code: String,
        #[arg(long)]
        action: LogTypeTrackable,
        #[arg(long)]
        text: String,
        #[arg(long)]
        tracking_code: Option<String>,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDateTime>,
    },
    /// Delete an image from a posted log
    DeleteImage { log_id: String, image_id: String },
    /// Show what can be logged for a cache
    Context { geocode: String },
    /// List logs stored locally for a cache
    ShowLogs { geocode: String },
    /// Save a log draft without sending it
    SaveDraft {
        geocode: String,
        #[arg(long = "type", default_value = "found")]
        log_type: LogType,
        #[arg(long)]
        text: String,
        #[arg(long)]
        favorite: bool,
        #[arg(long, default_value_t = 0.0)]
        rating: f32,
        #[arg(long, default_value = "no_problem")]
        report_problem: ReportProblemType,
    },
}

fn parse_date(s: &str) -> Result<NaiveDateTime, String> {
    local_timestamp::parse(s).map_err(|e| format!("Invalid date '{s}': {e}"))
}

fn parse_trackable(s: &str) -> Result<TrackableLog, String> {
    let (code, action) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected CODE=action, got '{s}'"))?;
    Ok(TrackableLog::new(code.trim(), action.trim().parse()?))
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let pool = db::connect(&config.database_url).await?;
    let state = cachelog::build_state(pool, config)?;

    run(&state, cli.command).await?;
    Ok(())
}

async fn run(state: &SharedState, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Log {
            geocode,
            log_type,
            text,
            date,
            favorite,
            rating,
            images,
            trackables,
            report_problem,
            password,
        } => {
            let cache = db::caches::load_or_new(&state.pool, &geocode).await?;
            let entry = LogEntry::builder()
                .log_type(log_type)
                .date(date.unwrap_or_else(now))
                .log(text)
                .report_problem(report_problem)
                .log_images(images.into_iter().map(Image::new).collect())
                .build();

            let handle = state.runner.spawn(LogRequest {
                cache,
                entry,
                password,
                trackables,
                add_to_favorite: favorite,
                rating,
            })?;

            let mut progress = handle.progress.clone();
            let printer = tokio::spawn(async move {
                while progress.changed().await.is_ok() {
                    eprintln!("{}", *progress.borrow_and_update());
                }
            });

            let outcome = handle.wait().await;
            let _ = printer.await;
            let outcome = outcome?;
            println!("Posted {} for {}", outcome.log.service_log_id, outcome.cache.geocode);
        }
        Command::EditLog {
            geocode,
            log_id,
            log_type,
            text,
            date,
            favorite,
        } => {
            let cache = db::caches::load_or_new(&state.pool, &geocode).await?;
            let mut logs = db::logs::load_logs(&state.pool, &geocode).await?;
            let existing = logs
                .iter()
                .position(|l| l.service_log_id.as_deref() == Some(log_id.as_str()));

            let mut builder = match existing {
                Some(i) => logs[i].build_upon(),
                None if log_type.is_some() && date.is_some() => {
                    LogEntry::builder().service_log_id(&log_id)
                }
                None => {
                    return Err(format!(
                        "Log {log_id} is not stored locally, give --type and --date to edit it"
                    )
                    .into());
                }
            };
            builder = builder.log(text);
            if let Some(log_type) = log_type {
                builder = builder.log_type(log_type);
            }
            if let Some(date) = date {
                builder = builder.date(date);
            }
            let entry = builder.build();

            let result = state.gc.edit_log(&cache, &entry, &[], favorite).await?;
            if let Some(i) = existing {
                logs[i] = entry;
                db::logs::save_logs(&state.pool, &geocode, &logs, true).await?;
            }
            println!("Edited {}", result.service_log_id);
        }
        Command::DeleteLog { geocode, log_id } => {
            let cache = db::caches::load_or_new(&state.pool, &geocode).await?;
            state.gc.delete_log(&cache, &log_id).await?;

            let mut logs = db::logs::load_logs(&state.pool, &geocode).await?;
            logs.retain(|l| l.service_log_id.as_deref() != Some(log_id.as_str()));
            db::logs::save_logs(&state.pool, &geocode, &logs, true).await?;
            println!("Deleted {log_id}");
        }
        Command::LogTrackable {
            code,
            action,
            text,
            tracking_code,
            date,
        } => {
            let mut trackable = TrackableLog::new(code, action);
            trackable.track_code = tracking_code;

            let manager = state
                .trackables
                .get(TrackableBrand::TravelBug)
                .and_then(|c| c.logging_manager())
                .ok_or("No trackable connector available")?;
            let result = manager
                .post_log(None, &trackable, date.unwrap_or_else(now), &text)
                .await?;
            db::trackable_actions::set_action(&state.pool, &trackable).await?;
            println!("Posted {}", result.service_log_id);
        }
        Command::DeleteImage { log_id, image_id } => {
            state.gc.delete_log_image(&log_id, &image_id).await?;
            println!("Deleted image {image_id}");
        }
        Command::Context { geocode } => {
            let cache = db::caches::load_or_new(&state.pool, &geocode).await?;
            let info = state.gc.log_context(&cache, None).await;
            if let Some(message) = info.user_displayable_error_message() {
                eprintln!("Warning: {message}");
            }
            println!("Connector: {}", info.connector_id);
            for log_type in &info.available_log_types {
                println!("  log type: {}", log_type.label());
            }
            for problem in &info.available_report_problem_types {
                println!("  problem:  {}", problem.code());
            }
            if let Some(draft) = db::offline_logs::load(&state.pool, &geocode).await? {
                println!("Draft ({}): {}", draft.log_type.label(), draft.log);
            }
        }
        Command::ShowLogs { geocode } => {
            for log in db::logs::load_logs(&state.pool, &geocode).await? {
                println!(
                    "{} {:<22} {:<12} {}",
                    log.date.format("%Y-%m-%d"),
                    log.log_type.label(),
                    log.service_log_id.as_deref().unwrap_or("-"),
                    log.log.lines().next().unwrap_or_default()
                );
            }
        }
        Command::SaveDraft {
            geocode,
            log_type,
            text,
            favorite,
            rating,
            report_problem,
        } => {
            let draft = OfflineLog {
                geocode,
                log_type,
                date: now(),
                log: text,
                report_problem,
                favorite,
                rating,
            };
            db::offline_logs::save(&state.pool, &draft).await?;
            println!("Draft saved for {}", draft.geocode);
        }
    }
    Ok(())
}

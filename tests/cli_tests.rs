mod common;

use std::process::Output;

use axum::http::Method;
use chrono::NaiveDateTime;
use uuid::Uuid;

use cachelog::db;
use cachelog::gc::wire::local_timestamp;
use cachelog::models::{Image, LogEntry, LogType};

fn date(raw: &str) -> NaiveDateTime {
    local_timestamp::parse(raw).unwrap()
}

/// File database holding one posted DNF log `GL5` with an uploaded image.
async fn database_with_dnf_log() -> String {
    let path = std::env::temp_dir().join(format!("cachelog-cli-{}.db", Uuid::now_v7()));
    let url = format!("sqlite://{}?mode=rwc", path.display());

    let pool = db::connect(&url).await.unwrap();
    let mut image = Image::new("https://img.example.com/img-guid.jpg").with_title("Hint spot");
    image.service_image_id = Some("img-guid::".to_string());
    let log = LogEntry::builder()
        .service_log_id("GL5")
        .log_type(LogType::DidntFindIt)
        .date(date("2020-01-02T10:00:00"))
        .log("No luck today")
        .author("alice")
        .friend(true)
        .add_log_image(image)
        .build();
    db::logs::save_logs(&pool, "GC1", &[log], true).await.unwrap();
    pool.close().await;
    url
}

async fn run_cli(fake: &common::FakeGc, database_url: &str, args: &[&str]) -> Output {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_cachelog"))
        .args(args)
        .env("CACHELOG_DATABASE_URL", database_url)
        .env("GC_WEBSITE_URL", fake.url())
        .env("GC_USERNAME", "alice")
        .env("GC_AUTH_COOKIE", "gspkauth=test-session")
        .env("CACHELOG_LOG_LEVEL", "warn")
        .env_remove("GCVOTE_PASSWORD")
        .env_remove("RUST_LOG")
        .output()
        .await
        .expect("Failed to run cachelog")
}

// ── edit-log ────────────────────────────────────────────────────

#[tokio::test]
async fn edit_log_changes_only_the_text() {
    let fake = common::spawn_fake_gc().await;
    let url = database_with_dnf_log().await;

    let out = run_cli(&fake, &url, &["edit-log", "GC1", "GL5", "--text", "Searched for ages"]).await;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let body = fake
        .find(Method::PUT, "/api/live/v1/logs/geocacheLog/GL5")
        .expect("edit not sent")
        .json();
    assert_eq!(body["logType"], 3);
    assert_eq!(body["logDate"], "2020-01-02T10:00:00");
    assert_eq!(body["logText"], "Searched for ages");
    assert_eq!(body["images"], serde_json::json!(["img-guid"]));
    assert!(body.get("usedFavoritePoint").is_none());

    let pool = db::connect(&url).await.unwrap();
    let logs = db::logs::load_logs(&pool, "GC1").await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].log_type, LogType::DidntFindIt);
    assert_eq!(logs[0].date, date("2020-01-02T10:00:00"));
    assert_eq!(logs[0].log, "Searched for ages");
    assert_eq!(logs[0].log_images.len(), 1);
}

#[tokio::test]
async fn edit_log_applies_given_overrides() {
    let fake = common::spawn_fake_gc().await;
    let url = database_with_dnf_log().await;

    let out = run_cli(
        &fake,
        &url,
        &[
            "edit-log",
            "GC1",
            "GL5",
            "--text",
            "Found it on the second visit",
            "--type",
            "found",
            "--date",
            "2020-01-05T16:20:00",
            "--favorite",
            "true",
        ],
    )
    .await;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let body = fake
        .find(Method::PUT, "/api/live/v1/logs/geocacheLog/GL5")
        .unwrap()
        .json();
    assert_eq!(body["logType"], 2);
    assert_eq!(body["logDate"], "2020-01-05T16:20:00");
    assert_eq!(body["usedFavoritePoint"], true);
}

#[tokio::test]
async fn edit_log_of_unknown_log_needs_type_and_date() {
    let fake = common::spawn_fake_gc().await;
    let url = database_with_dnf_log().await;

    let out = run_cli(&fake, &url, &["edit-log", "GC1", "GL9", "--text", "Updated"]).await;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("not stored locally"));
    assert!(fake.api_requests().is_empty());

    let out = run_cli(
        &fake,
        &url,
        &[
            "edit-log", "GC1", "GL9", "--text", "Updated", "--type", "note", "--date",
            "2021-03-04T05:06:07",
        ],
    )
    .await;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let body = fake
        .find(Method::PUT, "/api/live/v1/logs/geocacheLog/GL9")
        .expect("edit not sent")
        .json();
    assert_eq!(body["logType"], 4);
    assert_eq!(body["logDate"], "2021-03-04T05:06:07");
    assert_eq!(body["images"], serde_json::json!([]));
}

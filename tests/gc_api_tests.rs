mod common;

use axum::http::Method;
use chrono::NaiveDate;

use cachelog::connector::LoggingManager;
use cachelog::error::StatusCode;
use cachelog::models::{Geocache, Image, LogEntry, LogType, LogTypeTrackable, TrackableLog};

fn log_date() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap()
}

fn found_entry(text: &str) -> LogEntry {
    LogEntry::builder()
        .log_type(LogType::FoundIt)
        .date(log_date())
        .log(text)
        .build()
}

// ── Cache logs ──────────────────────────────────────────────────

#[tokio::test]
async fn create_log_sends_csrf_token_and_payload() {
    let fake = common::spawn_fake_gc().await;
    let gc = common::gc_manager(&fake, false);

    let trackables = vec![
        TrackableLog::new("TB1AB", LogTypeTrackable::DroppedOff),
        TrackableLog::new("TB2CD", LogTypeTrackable::Visited),
    ];
    let result = gc
        .create_log(&Geocache::new("GC1234"), &found_entry("TFTC"), None, &trackables, true, 0.0)
        .await
        .unwrap();
    assert_eq!(result.service_log_id, "GL1");

    let requests = fake.requests();
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].path, "/live/geocache/GC1234/log");

    let post = fake
        .find(Method::POST, "/api/live/v1/logs/GC1234/geocacheLog")
        .expect("log not posted");
    assert_eq!(post.csrf.as_deref(), Some(common::CSRF_TOKEN));

    let body = post.json();
    assert_eq!(body["logType"], 2);
    assert_eq!(body["logText"], "TFTC");
    assert_eq!(body["logDate"], "2024-05-01T14:30:00");
    assert_eq!(body["usedFavoritePoint"], true);
    assert_eq!(body["trackables"][0]["trackableCode"], "TB1AB");
    assert_eq!(body["trackables"][0]["trackableLogTypeId"], 14);
    assert_eq!(body["trackables"][1]["trackableLogTypeId"], 75);
}

#[tokio::test]
async fn create_log_rejects_blank_text_without_contacting_server() {
    let fake = common::spawn_fake_gc().await;
    let gc = common::gc_manager(&fake, false);

    let err = gc
        .create_log(&Geocache::new("GC1"), &found_entry("   "), None, &[], false, 0.0)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::LogPostError);
    assert!(err.message.contains("No log text given"));
    assert!(err.message.starts_with("LOG ERROR(user=alice):"));
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn create_log_fails_without_csrf_token() {
    let fake = common::spawn_fake_gc().await;
    fake.set(&fake.state.omit_csrf, true);
    let gc = common::gc_manager(&fake, false);

    let err = gc
        .create_log(&Geocache::new("GC1"), &found_entry("TFTC"), None, &[], false, 0.0)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::LogPostError);
    assert!(err.message.contains("unable to extract CSRF Token"));
    assert!(fake.api_requests().is_empty());
}

#[tokio::test]
async fn create_log_reports_server_response_without_reference_code() {
    let fake = common::spawn_fake_gc().await;
    fake.set(&fake.state.reject_logs, true);
    let gc = common::gc_manager(&fake, false);

    let err = gc
        .create_log(&Geocache::new("GC1"), &found_entry("TFTC"), None, &[], false, 0.0)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::LogPostError);
    assert!(err.message.contains("Problem posting log, response is:"));
    assert!(err.message.contains("Log type not allowed"));
}

#[tokio::test]
async fn edit_log_requires_service_log_id() {
    let fake = common::spawn_fake_gc().await;
    let gc = common::gc_manager(&fake, false);

    let err = gc
        .edit_log(&Geocache::new("GC1"), &found_entry("TFTC"), &[], None)
        .await
        .unwrap_err();
    assert!(err.message.contains("Need a serviceLogId"));
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn edit_log_puts_to_log_reference() {
    let fake = common::spawn_fake_gc().await;
    let gc = common::gc_manager(&fake, false);

    let entry = found_entry("TFTC")
        .build_upon()
        .service_log_id("GL55")
        .log("Edited: thanks for the cache")
        .build();
    let result = gc
        .edit_log(&Geocache::new("GC1"), &entry, &[], None)
        .await
        .unwrap();
    assert_eq!(result.service_log_id, "GL55");

    assert!(fake.find(Method::GET, "/live/geocache/GC1/log/GL55/edit").is_some());
    let put = fake
        .find(Method::PUT, "/api/live/v1/logs/geocacheLog/GL55")
        .expect("edit not sent");
    assert_eq!(put.json()["logText"], "Edited: thanks for the cache");
    // favorite point left alone
    assert!(put.json().get("usedFavoritePoint").is_none());
}

#[tokio::test]
async fn delete_log_posts_delete_request() {
    let fake = common::spawn_fake_gc().await;
    let gc = common::gc_manager(&fake, false);

    let result = gc.delete_log(&Geocache::new("GC1"), "GL77").await.unwrap();
    assert_eq!(result.service_log_id, "GL77");
    assert!(fake.find(Method::GET, "/live/log/GL77").is_some());

    let post = fake
        .find(Method::POST, "/api/live/v1/logs/geocacheLog/delete/GL77")
        .expect("delete not sent");
    assert_eq!(post.csrf.as_deref(), Some(common::CSRF_TOKEN));
}

// ── Log images ──────────────────────────────────────────────────

#[tokio::test]
async fn add_log_image_uploads_then_sets_title() {
    let fake = common::spawn_fake_gc().await;
    let gc = common::gc_manager(&fake, false);

    let image = Image::new("/tmp/cache-box.jpg")
        .with_title("Cache box")
        .with_description("Found under the rock");
    let result = gc
        .create_log_image("GL9", &image, vec![0xFF, 0xD8, 0xFF])
        .await
        .unwrap();
    assert_eq!(result.image_uri, "https://img.example.com/img-1.jpg");
    assert_eq!(result.service_image_id, "img-1::");

    let upload = fake
        .find(Method::POST, "/api/live/v1/logs/GL9/images")
        .expect("image not uploaded");
    let body = upload.text();
    assert!(body.contains(r#"name="image""#));
    assert!(body.contains(r#"filename="cache-box.jpg""#));
    assert!(body.contains("image/jpeg"));

    let put = fake
        .find(Method::PUT, "/api/live/v1/images/GL9/img-1/replace")
        .expect("image data not sent");
    let body = put.text();
    assert!(body.contains("Cache box"));
    assert!(body.contains("Found under the rock"));
}

#[tokio::test]
async fn add_log_image_without_title_skips_data_update() {
    let fake = common::spawn_fake_gc().await;
    let gc = common::gc_manager(&fake, false);

    gc.create_log_image("GL9", &Image::new("/tmp/a.jpg"), vec![1, 2, 3])
        .await
        .unwrap();
    assert_eq!(fake.api_requests().len(), 1);
}

#[tokio::test]
async fn add_log_image_failure_is_image_error() {
    let fake = common::spawn_fake_gc().await;
    fake.set(&fake.state.reject_images, true);
    let gc = common::gc_manager(&fake, false);

    let err = gc
        .create_log_image("GL9", &Image::new("/tmp/a.jpg"), vec![1, 2, 3])
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::LogImagePostError);
    assert!(err.message.starts_with("LOG IMAGE ERROR(user=alice):"));
}

#[tokio::test]
async fn edit_and_delete_log_image_use_guid() {
    let fake = common::spawn_fake_gc().await;
    let gc = common::gc_manager(&fake, false);

    gc.edit_log_image("GL9", "abc-guid::123", Some("New title"), None)
        .await
        .unwrap();
    let put = fake
        .find(Method::PUT, "/api/live/v1/images/GL9/abc-guid/replace")
        .expect("image data not sent");
    assert!(put.text().contains("New title"));
    assert!(!put.text().contains(r#"name="description""#));

    let result = gc.delete_log_image("GL9", "abc-guid::123").await.unwrap();
    assert_eq!(result.service_image_id, "abc-guid::123");
    assert!(fake
        .find(Method::POST, "/api/live/v1/images/delete/GL9/abc-guid")
        .is_some());
}

// ── Trackable logs ──────────────────────────────────────────────

#[tokio::test]
async fn retrieved_trackable_log_names_current_cache() {
    let fake = common::spawn_fake_gc().await;
    let gc = common::gc_manager(&fake, false);

    let trackable =
        TrackableLog::new("TB99X", LogTypeTrackable::RetrievedIt).with_track_code("SECRET1");
    let result = gc
        .api()
        .create_log_trackable(&trackable, log_date(), "Taking it along")
        .await
        .unwrap();
    assert!(result.service_log_id.starts_with("TL"));

    assert!(fake.find(Method::GET, "/live/trackable/TB99X/log").is_some());
    let body = fake
        .find(Method::POST, "/api/live/v1/logs/TB99X/trackableLog")
        .expect("trackable log not posted")
        .json();
    assert_eq!(body["logType"], 13);
    assert_eq!(body["trackingCode"], "SECRET1");
    assert_eq!(body["geocacheReferenceCode"], "GC77TB");
    assert_eq!(body["logText"], "Taking it along");
}

#[tokio::test]
async fn discovered_trackable_log_omits_cache_reference() {
    let fake = common::spawn_fake_gc().await;
    let gc = common::gc_manager(&fake, false);

    let trackable = TrackableLog::new("TB99X", LogTypeTrackable::DiscoveredIt);
    gc.api()
        .create_log_trackable(&trackable, log_date(), "Seen at the event")
        .await
        .unwrap();

    let body = fake
        .find(Method::POST, "/api/live/v1/logs/TB99X/trackableLog")
        .unwrap()
        .json();
    assert_eq!(body["logType"], 48);
    assert!(body.get("geocacheReferenceCode").is_none());
    assert!(body.get("trackingCode").is_none());
}

#[tokio::test]
async fn trackable_log_without_action_is_rejected() {
    let fake = common::spawn_fake_gc().await;
    let gc = common::gc_manager(&fake, false);

    let trackable = TrackableLog::new("TB99X", LogTypeTrackable::DoNothing);
    let err = gc
        .api()
        .create_log_trackable(&trackable, log_date(), "nothing")
        .await
        .unwrap_err();
    assert!(err.message.contains("Incomplete data for logging"));
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn delete_trackable_log() {
    let fake = common::spawn_fake_gc().await;
    let gc = common::gc_manager(&fake, false);

    gc.api().delete_log_trackable("TL5").await.unwrap();
    assert!(fake
        .find(Method::POST, "/api/live/v1/logs/trackableLog/delete/TL5")
        .is_some());
}

// ── Log context ─────────────────────────────────────────────────

#[tokio::test]
async fn log_context_lists_types_and_flags_unreachable_site() {
    let fake = common::spawn_fake_gc().await;
    let gc = common::gc_manager(&fake, false);

    let info = gc.log_context(&Geocache::new("GC1"), None).await;
    assert!(!info.has_load_error());
    assert!(info.available_log_types.contains(&LogType::FoundIt));
    assert_eq!(info.available_favorite_points, -1);

    fake.set(&fake.state.omit_csrf, true);
    let info = gc.log_context(&Geocache::new("GC1"), Some("GL1")).await;
    assert!(info.has_load_error());
    assert!(info.user_displayable_error_message().is_some());
    assert_eq!(info.service_log_id.as_deref(), Some("GL1"));
}

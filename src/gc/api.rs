use chrono::NaiveDateTime;
use reqwest::RequestBuilder;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::connector::{ImageResult, LogResult};
use crate::error::LogError;
use crate::models::{Image, LogEntry, LogTypeTrackable, TrackableLog};

use super::patterns;
use super::wire::{
    self, WebLogImageResponse, WebLogRequest, WebLogResponse, WebLogTrackable,
    WebTrackableLogRequest, WebTrackableLogResponse,
};

const CSRF_HEADER: &str = "CSRF-Token";

struct CsrfPage {
    html: String,
    token: String,
}

/// A parsed JSON reply plus what is needed to describe it in an error.
struct JsonReply<T> {
    status: reqwest::StatusCode,
    body: T,
    raw: String,
}

impl<T> std::fmt::Display for JsonReply<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let excerpt: String = self.raw.chars().take(1024).collect();
        write!(f, "[{}] {}", self.status.as_u16(), excerpt)
    }
}

/// Creates, edits and deletes geocaching.com log entries (caches and
/// trackables) through the website's live API.
///
/// Every write first loads an HTML page of the website to obtain a CSRF token,
/// which is then echoed back in the `CSRF-Token` header of the API call.
pub struct GcLogApi {
    client: reqwest::Client,
    website_url: String,
    username: String,
}

impl GcLogApi {
    pub fn new(config: &Config) -> Result<Self, LogError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.auth_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| LogError::log_post(format!("Invalid GC_AUTH_COOKIE: {e}")))?;
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("cachelog/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| LogError::log_post(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, &config.website_url, &config.username))
    }

    pub fn with_client(client: reqwest::Client, website_url: &str, username: &str) -> Self {
        Self {
            client,
            website_url: website_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn website_url(&self) -> &str {
        &self.website_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.website_url, path)
    }

    /// Post a new log for a geocache.
    pub async fn create_log(
        &self,
        geocode: &str,
        entry: &LogEntry,
        trackables: &[TrackableLog],
        add_to_favorites: bool,
    ) -> Result<LogResult, LogError> {
        if entry.log.trim().is_empty() {
            return Err(self.log_error("postLog: No log text given"));
        }

        let Some(csrf) = self.csrf_token(&format!("/live/geocache/{geocode}/log")).await else {
            return Err(self.log_error("Log Post: unable to extract CSRF Token"));
        };

        let request = create_log_request(entry, trackables, Some(add_to_favorites));
        let req = self
            .client
            .post(self.url(&format!("/api/live/v1/logs/{geocode}/geocacheLog")))
            .header(CSRF_HEADER, &csrf)
            .json(&request);

        let reply: JsonReply<WebLogResponse> = self
            .request_json(req)
            .await
            .map_err(|e| self.log_error(format!("Log Post: request failed: {e}")))?;

        match reply.body.log_reference_code.clone() {
            Some(code) => {
                tracing::info!(geocode, log_id = %code, "Log posted");
                Ok(LogResult::ok(code))
            }
            None => Err(self.log_error(format!("Problem posting log, response is: {reply}"))),
        }
    }

    /// Replace text, type, date and images of an existing log.
    ///
    /// `used_favorite_point` of `None` leaves the log's favorite point as it is.
    pub async fn edit_log(
        &self,
        geocode: &str,
        entry: &LogEntry,
        trackables: &[TrackableLog],
        used_favorite_point: Option<bool>,
    ) -> Result<LogResult, LogError> {
        let Some(log_id) = entry.service_log_id.as_deref().filter(|s| !s.trim().is_empty())
        else {
            return Err(self.log_error("Need a serviceLogId to edit a log entry"));
        };

        let page = format!("/live/geocache/{geocode}/log/{log_id}/edit");
        let Some(csrf) = self.csrf_token(&page).await else {
            return Err(self.log_error("Log Post: unable to extract CSRF Token"));
        };

        let request = create_log_request(entry, trackables, used_favorite_point);
        let req = self
            .client
            .put(self.url(&format!("/api/live/v1/logs/geocacheLog/{log_id}")))
            .header(CSRF_HEADER, &csrf)
            .json(&request);

        let reply: JsonReply<WebLogResponse> = self
            .request_json(req)
            .await
            .map_err(|e| self.log_error(format!("Log Edit: request failed: {e}")))?;

        match reply.body.log_reference_code.clone() {
            Some(code) => Ok(LogResult::ok(code)),
            None => Err(self.log_error(format!("Problem editing log, response is: {reply}"))),
        }
    }

    pub async fn delete_log(&self, log_id: &str) -> Result<LogResult, LogError> {
        let Some(csrf) = self.csrf_token(&format!("/live/log/{log_id}")).await else {
            return Err(self.log_error("DeleteLog: unable to extract CSRF Token"));
        };

        // deletion is a POST, not a DELETE
        let resp = self
            .client
            .post(self.url(&format!("/api/live/v1/logs/geocacheLog/delete/{log_id}")))
            .header(CSRF_HEADER, &csrf)
            .send()
            .await
            .map_err(|e| self.log_error(format!("DeleteLog: request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(self.log_error(format!(
                "DeleteLog: Problem deleting, response is: {}",
                resp.status()
            )));
        }

        Ok(LogResult::ok(log_id))
    }

    /// Upload an image and attach it to a posted log.
    ///
    /// Name and description are sent in a second request; sending them along
    /// with the image data makes the server time out.
    pub async fn add_log_image(
        &self,
        log_id: &str,
        image: &Image,
        data: Vec<u8>,
    ) -> Result<ImageResult, LogError> {
        let Some(csrf) = self.csrf_token(&format!("/live/log/{log_id}")).await else {
            tracing::warn!(log_id, "Log Image Post: unable to extract CSRF Token");
            return Err(self.image_error("No CSRFToken found"));
        };

        let part = Part::bytes(data)
            .file_name(image.file_name())
            .mime_str("image/jpeg")
            .map_err(|e| self.image_error(format!("Invalid image part: {e}")))?;

        let req = self
            .client
            .post(self.url(&format!("/api/live/v1/logs/{log_id}/images")))
            .header(CSRF_HEADER, &csrf)
            .multipart(Form::new().part("image", part));

        let reply: JsonReply<WebLogImageResponse> = self
            .request_json(req)
            .await
            .map_err(|e| self.image_error(format!("Image upload failed: {e}")))?;

        let (Some(guid), Some(url)) = (reply.body.guid.clone(), reply.body.url.clone()) else {
            return Err(self.image_error(format!(
                "Problem posting image, logId='{log_id}', response is: {reply}"
            )));
        };

        // the csrf token stays valid for the follow-up request
        self.put_image_data(
            log_id,
            &wire::log_image_id(Some(&guid), None),
            &csrf,
            image.title.as_deref(),
            image.description.as_deref(),
        )
        .await?;

        tracing::debug!(log_id, %url, "Log image uploaded");
        Ok(ImageResult::ok(url, wire::log_image_id(Some(&guid), None)))
    }

    pub async fn edit_log_image_data(
        &self,
        log_id: &str,
        log_image_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<ImageResult, LogError> {
        let Some(csrf) = self.csrf_token(&format!("/live/log/{log_id}")).await else {
            tracing::warn!(log_id, "Log Image Edit: unable to extract CSRF Token");
            return Err(self.image_error("No CSRFToken found"));
        };

        self.put_image_data(log_id, log_image_id, &csrf, name, description)
            .await?;
        Ok(ImageResult::ok("", log_image_id))
    }

    pub async fn delete_log_image(
        &self,
        log_id: &str,
        log_image_id: &str,
    ) -> Result<ImageResult, LogError> {
        let Some(csrf) = self.csrf_token(&format!("/live/log/{log_id}")).await else {
            tracing::warn!(log_id, "Log Image Delete: unable to extract CSRF Token");
            return Err(self.image_error("No CSRFToken found"));
        };

        let guid = wire::guid_from(log_image_id);
        let resp = self
            .client
            .post(self.url(&format!("/api/live/v1/images/delete/{log_id}/{guid}")))
            .header(CSRF_HEADER, &csrf)
            .send()
            .await
            .map_err(|e| self.image_error(format!("Image delete failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(self.image_error(format!(
                "Problem deleting image, response is: {}",
                resp.status()
            )));
        }

        Ok(ImageResult::ok("", log_image_id))
    }

    /// Post a standalone log for a trackable.
    pub async fn create_log_trackable(
        &self,
        trackable_log: &TrackableLog,
        date: NaiveDateTime,
        text: &str,
    ) -> Result<LogResult, LogError> {
        let tb_code = trackable_log.geocode.as_str();
        let log_type = match trackable_log.action.gc_api_id() {
            Some(id) if !tb_code.trim().is_empty() => id,
            _ => {
                return Err(self.log_error(format!(
                    "Incomplete data for logging: {trackable_log:?}"
                )));
            }
        };

        let Some(page) = self.csrf_page(&format!("/live/trackable/{tb_code}/log")).await else {
            return Err(self.log_error(
                "Log Trackable Post: unable to extract CSRF Token in new Log Flow Page",
            ));
        };

        let geocache_reference_code = if trackable_log.action == LogTypeTrackable::RetrievedIt {
            patterns::current_geocache(&page.html).and_then(|r| r.reference_code)
        } else {
            None
        };

        let request = WebTrackableLogRequest {
            images: Vec::new(),
            log_date: date,
            log_text: text.to_string(),
            log_type,
            tracking_code: trackable_log.track_code.clone(),
            geocache_reference_code,
        };

        let req = self
            .client
            .post(self.url(&format!("/api/live/v1/logs/{tb_code}/trackableLog")))
            .header(CSRF_HEADER, &page.token)
            .json(&request);

        let reply: JsonReply<WebTrackableLogResponse> = self
            .request_json(req)
            .await
            .map_err(|e| self.log_error(format!("Log Trackable Post: request failed: {e}")))?;

        match reply.body.log_reference_code.clone() {
            Some(code) => {
                tracing::info!(trackable = tb_code, log_id = %code, "Trackable log posted");
                Ok(LogResult::ok(code))
            }
            None => Err(self.log_error(format!(
                "Problem posting trackable log, response is: {reply}"
            ))),
        }
    }

    pub async fn delete_log_trackable(&self, log_id: &str) -> Result<LogResult, LogError> {
        let Some(csrf) = self.csrf_token(&format!("/live/log/{log_id}")).await else {
            return Err(self.log_error("DeleteLogTrackable: unable to extract CSRF Token"));
        };

        let resp = self
            .client
            .post(self.url(&format!("/api/live/v1/logs/trackableLog/delete/{log_id}")))
            .header(CSRF_HEADER, &csrf)
            .send()
            .await
            .map_err(|e| self.log_error(format!("DeleteLogTrackable: request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(self.log_error(format!(
                "DeleteLogTrackable: Problem deleting, response is: {}",
                resp.status()
            )));
        }

        Ok(LogResult::ok(log_id))
    }

    /// Fetch a page and check whether a CSRF token can be obtained from it.
    pub async fn probe_log_page(&self, geocode: &str) -> bool {
        self.csrf_token(&format!("/live/geocache/{geocode}/log"))
            .await
            .is_some()
    }

    async fn put_image_data(
        &self,
        log_id: &str,
        log_image_id: &str,
        csrf: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), LogError> {
        let name = name.filter(|s| !s.trim().is_empty());
        let description = description.filter(|s| !s.trim().is_empty());
        if name.is_none() && description.is_none() {
            return Ok(());
        }

        let mut form = Form::new();
        if let Some(name) = name {
            form = form.text("name", name.to_string());
        }
        if let Some(description) = description {
            form = form.text("description", description.to_string());
        }

        let guid = wire::guid_from(log_image_id);
        let req = self
            .client
            .put(self.url(&format!("/api/live/v1/images/{log_id}/{guid}/replace")))
            .header(CSRF_HEADER, csrf)
            .multipart(form);

        let reply: JsonReply<WebLogImageResponse> = self
            .request_json(req)
            .await
            .map_err(|e| self.image_error(format!("Image data update failed: {e}")))?;

        if reply.body.url.is_none() {
            return Err(self.image_error(format!("Problem putting image: {reply}")));
        }
        Ok(())
    }

    async fn csrf_token(&self, path: &str) -> Option<String> {
        self.csrf_page(path).await.map(|page| page.token)
    }

    async fn csrf_page(&self, path: &str) -> Option<CsrfPage> {
        let url = self.url(path);
        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(%url, "Unable to load log page: {e}");
                return None;
            }
        };

        let status = resp.status();
        let html = resp.text().await.unwrap_or_default();
        match patterns::csrf_token(&html) {
            Some(token) if status.is_success() => Some(CsrfPage { html, token }),
            _ => {
                tracing::warn!(%url, status = status.as_u16(), "Unable to find a CSRF Token in log page");
                None
            }
        }
    }

    /// Send a request and parse its JSON reply. Unparseable bodies yield
    /// `T::default()` so callers can report what the server said.
    async fn request_json<T: DeserializeOwned + Default>(
        &self,
        req: RequestBuilder,
    ) -> Result<JsonReply<T>, reqwest::Error> {
        let resp = req.send().await?;
        let status = resp.status();
        let raw = resp.text().await?;
        let body = serde_json::from_str(&raw).unwrap_or_default();
        Ok(JsonReply { status, body, raw })
    }

    fn log_error(&self, message: impl AsRef<str>) -> LogError {
        let msg = format!("LOG ERROR(user={}):{}", self.username, message.as_ref());
        tracing::warn!("{msg}");
        LogError::log_post(msg)
    }

    fn image_error(&self, message: impl AsRef<str>) -> LogError {
        let msg = format!("LOG IMAGE ERROR(user={}):{}", self.username, message.as_ref());
        tracing::warn!("{msg}");
        LogError::image_post(msg)
    }
}

fn create_log_request(
    entry: &LogEntry,
    trackables: &[TrackableLog],
    used_favorite_point: Option<bool>,
) -> WebLogRequest {
    WebLogRequest {
        images: entry
            .log_images
            .iter()
            .filter_map(|img| img.service_image_id.as_deref())
            .map(|id| wire::guid_from(id).to_string())
            .collect(),
        log_date: entry.date,
        log_text: entry.log.clone(),
        log_type: entry.log_type.id(),
        trackables: trackables
            .iter()
            .map(|t| WebLogTrackable {
                trackable_code: t.geocode.clone(),
                trackable_log_type_id: t.action.gc_api_id(),
            })
            .collect(),
        // not sent by the website itself, but honored
        used_favorite_point,
    }
}

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub website_url: String,
    pub username: String,
    pub auth_cookie: Option<String>,
    pub caches_found: Option<u32>,
    pub http_timeout: Duration,
    pub image_title_prefix: String,
    pub log_level: String,
    pub gcvote: Option<GcVoteConfig>,
}

#[derive(Debug, Clone)]
pub struct GcVoteConfig {
    pub url: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_or("CACHELOG_DATABASE_URL", "sqlite://cachelog.db?mode=rwc");
        let website_url = env_or("GC_WEBSITE_URL", "https://www.geocaching.com")
            .trim_end_matches('/')
            .to_string();
        let username = env_required("GC_USERNAME")?;
        let auth_cookie = std::env::var("GC_AUTH_COOKIE")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let caches_found = match std::env::var("GC_CACHES_FOUND").ok() {
            Some(v) => Some(
                v.parse()
                    .map_err(|e| format!("Invalid GC_CACHES_FOUND: {e}"))?,
            ),
            None => None,
        };

        let timeout_secs: u64 = env_or("CACHELOG_HTTP_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| format!("Invalid CACHELOG_HTTP_TIMEOUT_SECS: {e}"))?;

        let image_title_prefix = env_or("CACHELOG_IMAGE_TITLE_PREFIX", "Photo");
        let log_level = env_or("CACHELOG_LOG_LEVEL", "info");

        let gcvote = std::env::var("GCVOTE_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|password| GcVoteConfig {
                url: env_or("GCVOTE_URL", "http://gcvote.com")
                    .trim_end_matches('/')
                    .to_string(),
                password,
            });

        Ok(Config {
            database_url,
            website_url,
            username,
            auth_cookie,
            caches_found,
            http_timeout: Duration::from_secs(timeout_secs),
            image_title_prefix,
            log_level,
            gcvote,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

use async_trait::async_trait;

use crate::config::GcVoteConfig;
use crate::connector::VotingCapability;
use crate::models::Geocache;

/// Client for the GCVote rating service.
pub struct GcVote {
    client: reqwest::Client,
    url: String,
    username: String,
    password: String,
}

impl GcVote {
    pub fn new(client: reqwest::Client, config: &GcVoteConfig, username: &str) -> Self {
        Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: config.password.clone(),
        }
    }

    async fn set_rating(&self, guid: &str, rating: f32) -> Result<bool, reqwest::Error> {
        let vote = format!("{rating:.1}");
        let params = [
            ("userName", self.username.as_str()),
            ("password", self.password.as_str()),
            ("cacheId", guid),
            ("voteUser", vote.as_str()),
            ("version", "cachelog"),
        ];

        let body = self
            .client
            .post(format!("{}/setVote.php", self.url))
            .form(&params)
            .send()
            .await?
            .text()
            .await?;

        Ok(body.trim().eq_ignore_ascii_case("ok"))
    }
}

/// Ratings go from 1 to 5 stars in half-star steps.
pub fn is_valid_rating(rating: f32) -> bool {
    (1.0..=5.0).contains(&rating) && (rating * 2.0).fract() == 0.0
}

#[async_trait]
impl VotingCapability for GcVote {
    fn supports_voting(&self, cache: &Geocache) -> bool {
        !self.username.is_empty()
            && !self.password.is_empty()
            && cache.guid.as_deref().is_some_and(|g| !g.is_empty())
    }

    fn is_valid_rating(&self, rating: f32) -> bool {
        is_valid_rating(rating)
    }

    async fn post_vote(&self, cache: &Geocache, rating: f32) -> bool {
        let Some(guid) = cache.guid.as_deref() else {
            return false;
        };
        match self.set_rating(guid, rating).await {
            Ok(true) => {
                tracing::info!(geocode = %cache.geocode, rating, "Vote posted");
                true
            }
            Ok(false) => {
                tracing::warn!(geocode = %cache.geocode, "GCVote rejected the vote");
                false
            }
            Err(e) => {
                tracing::warn!(geocode = %cache.geocode, "GCVote request failed: {e}");
                false
            }
        }
    }
}

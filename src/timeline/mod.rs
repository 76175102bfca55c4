//! Client for the remote timeline API.
//!
//! [`TimelineClient`] talks to the real service; [`TimelineService`] is the
//! seam the fetcher and tests program against. Rate limiting is surfaced as
//! a dedicated error variant so callers can distinguish it from transport
//! and API failures.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::config::Config;
use crate::timeline::model::{ExternalStatus, RateLimitStatus, UserProfile};

pub mod model;

const TIMELINE_API_BASE: &str = "https://api.twitter.com/1.1/";

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("rate limited (limit {}, remaining {}, resets in {}s)", .0.limit, .0.remaining, .0.reset_in_seconds)]
    RateLimited(RateLimitStatus),
    #[error("timeline API error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

#[derive(Clone)]
pub struct TimelineClient {
    http: Client,
    base_url: Url,
    bearer_token: String,
}

impl fmt::Debug for TimelineClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Read-only operations the fetcher needs from the remote platform.
#[async_trait]
pub trait TimelineService: Send + Sync {
    /// Single profile lookup used by the advisory existence check.
    async fn show_user(&self, screen_name: &str) -> Result<UserProfile, TimelineError>;

    /// One page of the user's timeline. Pages are 1-based.
    async fn user_timeline(
        &self,
        screen_name: &str,
        page: u32,
        count: u32,
    ) -> Result<Vec<ExternalStatus>, TimelineError>;
}

impl TimelineClient {
    pub fn new(bearer_token: String) -> Self {
        let base_url = Url::parse(TIMELINE_API_BASE).expect("valid default timeline URL");
        Self::with_base_url(bearer_token, base_url)
    }

    pub fn with_base_url(bearer_token: String, base_url: Url) -> Self {
        let http = Client::builder()
            .user_agent("timeline-archiver/0.1")
            .no_proxy()
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            bearer_token,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, TimelineError> {
        let base_url = Url::parse(&cfg.api.base_url)
            .map_err(|err| TimelineError::InvalidUrl(err.to_string()))?;
        Ok(Self::with_base_url(cfg.api.bearer_token.clone(), base_url))
    }

    fn endpoint(&self, path: &str) -> Result<Url, TimelineError> {
        self.base_url
            .join(path)
            .map_err(|err| TimelineError::InvalidUrl(err.to_string()))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, TimelineError> {
        let res = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.bearer_token))
            .send()
            .await?;

        if res.status() == StatusCode::TOO_MANY_REQUESTS {
            let body = res.text().await.unwrap_or_default();
            let status = serde_json::from_str::<RateLimitStatus>(&body).unwrap_or_default();
            warn!(
                limit = status.limit,
                remaining = status.remaining,
                reset_in_seconds = status.reset_in_seconds,
                "rate limited by timeline API"
            );
            return Err(TimelineError::RateLimited(status));
        }
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            warn!(%status, "timeline API error: {}", body);
            return Err(TimelineError::Api { status, body });
        }

        Ok(res.json::<T>().await?)
    }
}

#[async_trait]
impl TimelineService for TimelineClient {
    async fn show_user(&self, screen_name: &str) -> Result<UserProfile, TimelineError> {
        let mut url = self.endpoint("users/show.json")?;
        url.query_pairs_mut().append_pair("screen_name", screen_name);
        self.get_json(url).await
    }

    async fn user_timeline(
        &self,
        screen_name: &str,
        page: u32,
        count: u32,
    ) -> Result<Vec<ExternalStatus>, TimelineError> {
        let mut url = self.endpoint("statuses/user_timeline.json")?;
        url.query_pairs_mut()
            .append_pair("screen_name", screen_name)
            .append_pair("page", &page.to_string())
            .append_pair("count", &count.to_string());
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_client() -> TimelineClient {
        TimelineClient::with_base_url(
            "token".into(),
            Url::parse("https://timeline.test/1.1/").unwrap(),
        )
    }

    #[test]
    fn endpoint_joins_relative_to_base() {
        let client = sample_client();
        let url = client.endpoint("statuses/user_timeline.json").unwrap();
        assert_eq!(
            url.as_str(),
            "https://timeline.test/1.1/statuses/user_timeline.json"
        );
    }

    #[test]
    fn rate_limit_body_parses() {
        let status: RateLimitStatus =
            serde_json::from_str(r#"{"limit":180,"remaining":0,"reset_in_seconds":754}"#).unwrap();
        assert_eq!(status.limit, 180);
        assert_eq!(status.remaining, 0);
        assert_eq!(status.reset_in_seconds, 754);
    }

    #[test]
    fn rate_limit_body_tolerates_missing_fields() {
        let status: RateLimitStatus = serde_json::from_str(r#"{"limit":15}"#).unwrap();
        assert_eq!(status.limit, 15);
        assert_eq!(status.remaining, 0);
        assert_eq!(status.reset_in_seconds, 0);
    }

    #[test]
    fn rate_limited_error_displays_diagnostics() {
        let err = TimelineError::RateLimited(RateLimitStatus {
            limit: 180,
            remaining: 0,
            reset_in_seconds: 90,
        });
        let rendered = err.to_string();
        assert!(rendered.contains("180"));
        assert!(rendered.contains("90s"));
    }

    #[test]
    fn status_deserializes_with_absent_fields() {
        let status: ExternalStatus = serde_json::from_str(r#"{"id":42}"#).unwrap();
        assert_eq!(status.id, 42);
        assert!(status.created_at.is_none());
        assert!(status.text.is_none());
        assert!(status.user.is_none());
        assert!(status.lang.is_none());
        assert!(status.place.is_none());
    }
}

//! Rate-limit-aware timeline fetcher.
//!
//! One [`FetchSession`] pages through a user's timeline until the requested
//! count is reached, the timeline is exhausted, or quota runs out. Quota
//! exhaustion is not a failure: the session reports the diagnostics and
//! returns whatever it accumulated, optionally sleeping until the reported
//! reset and resuming when the caller granted a retry budget.

use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};

use crate::metrics::IngestMetrics;
use crate::model::{IngestRequest, Stage};
use crate::pipeline::{CancelToken, Cancelled};
use crate::timeline::model::{ExternalStatus, RateLimitStatus};
use crate::timeline::{TimelineError, TimelineService};

/// Quota policy for one fetch session.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotaPolicy {
    /// How many times the session may sleep until the reported reset and
    /// resume paging. Zero reproduces stop-on-quota.
    pub quota_retries: u32,
}

/// Ephemeral state of one fetch session. Created at pipeline start,
/// dropped when the session returns.
#[derive(Debug)]
pub struct FetchSession {
    username: String,
    requested: usize,
    page: u32,
    statuses: Vec<ExternalStatus>,
    rate_limit: Option<RateLimitStatus>,
    retries_left: u32,
}

impl FetchSession {
    pub fn new(request: &IngestRequest, policy: QuotaPolicy) -> Self {
        Self {
            username: request.username.clone(),
            requested: request.count as usize,
            page: 1,
            statuses: Vec::with_capacity(request.count as usize),
            rate_limit: None,
            retries_left: policy.quota_retries,
        }
    }

    /// Last quota diagnostics observed, if the session was rate limited.
    pub fn rate_limit(&self) -> Option<RateLimitStatus> {
        self.rate_limit
    }

    /// Page through the timeline and return the accumulated statuses in
    /// fetch order, truncated to the requested count.
    pub async fn run(
        &mut self,
        client: &dyn TimelineService,
        metrics: &IngestMetrics,
        cancel: &CancelToken,
    ) -> Result<Vec<ExternalStatus>> {
        if cancel.is_cancelled() {
            return Err(Cancelled(Stage::Start).into());
        }

        self.check_user(client).await;
        info!(
            username = %self.username,
            requested = self.requested,
            "downloading timeline statuses"
        );

        let page_size = self.requested as u32;
        while self.statuses.len() < self.requested {
            if cancel.is_cancelled() {
                return Err(Cancelled(Stage::Start).into());
            }

            match client
                .user_timeline(&self.username, self.page, page_size)
                .await
            {
                Ok(batch) if batch.is_empty() => {
                    info!(
                        username = %self.username,
                        pages = self.page - 1,
                        "timeline exhausted before requested count"
                    );
                    break;
                }
                Ok(batch) => {
                    metrics.record_page(batch.len());
                    self.statuses.extend(batch);
                    self.page += 1;
                }
                Err(TimelineError::RateLimited(status)) => {
                    metrics.record_quota_hit();
                    self.rate_limit = Some(status);
                    report_rate_limit(&status);
                    if self.retries_left == 0 {
                        break;
                    }
                    self.retries_left -= 1;
                    info!(
                        seconds = status.reset_in_seconds,
                        "sleeping until quota reset, then resuming"
                    );
                    tokio::time::sleep(Duration::from_secs(status.reset_in_seconds)).await;
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        username = %self.username,
                        page = self.page,
                        "timeline fetch failed"
                    );
                    return Err(err.into());
                }
            }
        }

        self.statuses.truncate(self.requested);
        info!(count = self.statuses.len(), "downloaded timeline statuses");
        Ok(std::mem::take(&mut self.statuses))
    }

    /// Advisory existence check: logs the profile when found, logs a
    /// warning otherwise. Never gates pagination.
    async fn check_user(&self, client: &dyn TimelineService) {
        match client.show_user(&self.username).await {
            Ok(profile) => info!(
                username = %self.username,
                name = %profile.name,
                followers = profile.followers_count,
                "user found"
            ),
            Err(err) => warn!(
                username = %self.username,
                error = %err,
                "user lookup failed; attempting pagination anyway"
            ),
        }
    }
}

fn report_rate_limit(status: &RateLimitStatus) {
    warn!(
        limit = status.limit,
        remaining = status.remaining,
        "timeline quota exceeded; resets in {}m {}s",
        status.reset_in_seconds / 60,
        status.reset_in_seconds % 60
    );
}

//! User activity classification.
//!
//! A user's activity status is derived from the age of their most recent
//! post. The sweep recomputes it for every user that is not banned.

use chrono::{DateTime, Duration, Utc};
use inkwell_common::AppResult;
use inkwell_db::{
    entities::user::{self, UserStatus},
    repositories::{PostRepository, UserRepository},
};
use serde::Serialize;

/// Users whose last post is older than this are slow-active.
pub const SLOW_ACTIVE_AFTER_DAYS: i64 = 7;

/// Users whose last post is older than this (or who never posted) are non-active.
pub const NON_ACTIVE_AFTER_DAYS: i64 = 30;

const PAGE_SIZE: u64 = 100;

/// Classify a user by the creation time of their most recent post.
#[must_use]
pub fn classify(now: DateTime<Utc>, last_post_at: Option<DateTime<Utc>>) -> UserStatus {
    let Some(last_post_at) = last_post_at else {
        return UserStatus::NonActive;
    };

    let age = now - last_post_at;
    if age > Duration::days(NON_ACTIVE_AFTER_DAYS) {
        UserStatus::NonActive
    } else if age > Duration::days(SLOW_ACTIVE_AFTER_DAYS) {
        UserStatus::SlowActive
    } else {
        UserStatus::Active
    }
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub scanned: u64,
    /// Users whose status changed.
    pub changed: u64,
    pub unchanged: u64,
    /// Users skipped because a query failed.
    pub failed: u64,
}

/// Activity service for the periodic status sweep.
#[derive(Clone)]
pub struct ActivityService {
    user_repo: UserRepository,
    post_repo: PostRepository,
}

impl ActivityService {
    /// Create a new activity service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, post_repo: PostRepository) -> Self {
        Self {
            user_repo,
            post_repo,
        }
    }

    /// Reclassify every non-banned user.
    ///
    /// A failure on one user is logged and counted; the sweep moves on to
    /// the next. Only a failure to fetch a page of users aborts it.
    pub async fn sweep(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let mut report = SweepReport::default();
        let mut after: Option<String> = None;

        loop {
            let page = self
                .user_repo
                .find_sweepable_page(after.as_deref(), PAGE_SIZE)
                .await?;
            let page_len = page.len() as u64;

            for user in &page {
                report.scanned += 1;
                match self.reclassify(user, now).await {
                    Ok(true) => report.changed += 1,
                    Ok(false) => report.unchanged += 1,
                    Err(e) => {
                        report.failed += 1;
                        tracing::warn!(user_id = %user.id, error = %e, "Failed to reclassify user");
                    }
                }
            }

            match page.last() {
                Some(last) if page_len == PAGE_SIZE => after = Some(last.id.clone()),
                _ => break,
            }
        }

        Ok(report)
    }

    /// Returns whether the status changed.
    async fn reclassify(&self, user: &user::Model, now: DateTime<Utc>) -> AppResult<bool> {
        let last_post_at = self.post_repo.latest_created_at_by_author(&user.id).await?;
        let status = classify(now, last_post_at);

        self.user_repo.set_status(&user.id, status, now).await?;

        Ok(status != user.status)
    }
}

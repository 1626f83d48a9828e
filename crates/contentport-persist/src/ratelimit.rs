//! Chat rate limiting over the key-value store.
//!
//! Two algorithms share one counter layout (`ratelimit:{identifier}:{bucket}`):
//!
//! - **Fixed window**: one counter per `floor(now / window)` bucket.
//! - **Sliding window**: the previous bucket is weighted by how much of it
//!   still overlaps the trailing window, then added to the current bucket.
//!   Rejected requests are not counted.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::keys;
use crate::models::Plan;
use crate::trait_client::{KeyValueStore, KeyValueStoreExt};

const KEY_PREFIX: &str = "ratelimit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Fixed { limit: u32, window: Duration },
    Sliding { limit: u32, window: Duration },
}

impl Window {
    pub fn limit(&self) -> u32 {
        match self {
            Self::Fixed { limit, .. } | Self::Sliding { limit, .. } => *limit,
        }
    }

    fn window_ms(&self) -> i64 {
        match self {
            Self::Fixed { window, .. } | Self::Sliding { window, .. } => window.as_millis() as i64,
        }
    }
}

/// Outcome of a rate limit check. `reset` is the unix millis at which the
/// current bucket ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub success: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset: i64,
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    window: Window,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, window: Window) -> Self {
        Self { store, window }
    }

    /// Pro: 80 per 4 hours, sliding. Free: 5 per day, fixed.
    pub fn for_plan(plan: Plan, store: Arc<dyn KeyValueStore>) -> Self {
        let window = match plan {
            Plan::Pro => Window::Sliding {
                limit: 80,
                window: Duration::from_secs(4 * 60 * 60),
            },
            Plan::Free => Window::Fixed {
                limit: 5,
                window: Duration::from_secs(24 * 60 * 60),
            },
        };
        Self::new(store, window)
    }

    pub fn window(&self) -> Window {
        self.window
    }

    /// Consume one unit for `identifier`
    pub async fn limit(&self, identifier: &str) -> Result<RateLimitDecision> {
        self.limit_at(identifier, chrono::Utc::now().timestamp_millis())
            .await
    }

    pub async fn limit_at(&self, identifier: &str, now_ms: i64) -> Result<RateLimitDecision> {
        let limit = self.window.limit();
        let window_ms = self.window.window_ms();
        let bucket = now_ms.div_euclid(window_ms);
        let reset = (bucket + 1) * window_ms;
        let current_key = keys::rate_limit(KEY_PREFIX, identifier, bucket);

        match self.window {
            Window::Fixed { window, .. } => {
                let used = self.store.incr_by(&current_key, 1, window).await?;
                Ok(RateLimitDecision {
                    success: used <= i64::from(limit),
                    limit,
                    remaining: remaining(limit, used),
                    reset,
                })
            }
            Window::Sliding { window, .. } => {
                let weighted = self.weighted_previous(identifier, bucket, now_ms).await?;
                let current = self.counter(&current_key).await?;

                if weighted + current >= i64::from(limit) {
                    tracing::debug!(identifier, "Rate limit exceeded");
                    return Ok(RateLimitDecision {
                        success: false,
                        limit,
                        remaining: 0,
                        reset,
                    });
                }

                // Counters outlive their bucket so the next one can weight them
                let used = self.store.incr_by(&current_key, 1, window * 2).await?;
                Ok(RateLimitDecision {
                    success: true,
                    limit,
                    remaining: remaining(limit, weighted + used),
                    reset,
                })
            }
        }
    }

    /// Remaining units without consuming one
    pub async fn get_remaining(&self, identifier: &str) -> Result<RateLimitDecision> {
        self.get_remaining_at(identifier, chrono::Utc::now().timestamp_millis())
            .await
    }

    pub async fn get_remaining_at(
        &self,
        identifier: &str,
        now_ms: i64,
    ) -> Result<RateLimitDecision> {
        let limit = self.window.limit();
        let window_ms = self.window.window_ms();
        let bucket = now_ms.div_euclid(window_ms);
        let current = self
            .counter(&keys::rate_limit(KEY_PREFIX, identifier, bucket))
            .await?;

        let used = match self.window {
            Window::Fixed { .. } => current,
            Window::Sliding { .. } => {
                current + self.weighted_previous(identifier, bucket, now_ms).await?
            }
        };

        Ok(RateLimitDecision {
            success: used < i64::from(limit),
            limit,
            remaining: remaining(limit, used),
            reset: (bucket + 1) * window_ms,
        })
    }

    async fn counter(&self, key: &str) -> Result<i64> {
        Ok(self.store.get_json::<i64>(key).await?.unwrap_or(0))
    }

    async fn weighted_previous(&self, identifier: &str, bucket: i64, now_ms: i64) -> Result<i64> {
        let window_ms = self.window.window_ms();
        let previous = self
            .counter(&keys::rate_limit(KEY_PREFIX, identifier, bucket - 1))
            .await?;
        let elapsed = now_ms.rem_euclid(window_ms) as f64 / window_ms as f64;
        Ok((previous as f64 * (1.0 - elapsed)).floor() as i64)
    }
}

fn remaining(limit: u32, used: i64) -> u32 {
    (i64::from(limit) - used).max(0) as u32
}

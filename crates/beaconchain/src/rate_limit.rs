//! Sliding-window throttle for outbound validator data API calls.

use std::{collections::VecDeque, sync::Arc, time::Duration};

use tokio::{
    sync::Mutex,
    time::{sleep, Instant},
};
use tracing::debug;

const WINDOW: Duration = Duration::from_secs(60);

/// Request budget for the validator data API.
#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    pub per_second: u32,
    pub per_minute: usize,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            per_second: 2,
            per_minute: 100,
        }
    }
}

/// Throttles outbound requests under per-second and per-minute budgets.
///
/// [`RateLimiter::acquire`] suspends the caller until one more request fits
/// the budget, then records it. Suspension is cooperative delay, never
/// rejection. Clones share the same window, so a single limiter can be handed
/// to everything that talks to the same data source.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limits: RateLimits,
    window: Arc<Mutex<Window>>,
}

#[derive(Debug, Default)]
struct Window {
    timestamps: VecDeque<Instant>,
    last_request: Option<Instant>,
}

impl RateLimiter {
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            window: Arc::new(Mutex::new(Window::default())),
        }
    }

    /// Waits until it is safe to issue one more request, then records it.
    pub async fn acquire(&self) {
        let mut window = self.window.lock().await;

        let now = Instant::now();
        while window
            .timestamps
            .front()
            .is_some_and(|t| now.duration_since(*t) >= WINDOW)
        {
            window.timestamps.pop_front();
        }

        if window.timestamps.len() >= self.limits.per_minute {
            // oldest timestamp that still counts against the per-minute budget
            let idx = window.timestamps.len() - self.limits.per_minute;
            let oldest = window.timestamps[idx];
            let wait = WINDOW.saturating_sub(now.duration_since(oldest));
            if !wait.is_zero() {
                debug!(?wait, "per-minute rate limit reached, waiting before next request");
                sleep(wait).await;
            }
        }

        let min_gap = Duration::from_secs_f64(1.0 / f64::from(self.limits.per_second));
        if let Some(last) = window.last_request {
            let elapsed = Instant::now().duration_since(last);
            if elapsed < min_gap {
                let wait = min_gap - elapsed;
                debug!(?wait, "per-second rate limit enforced, waiting before next request");
                sleep(wait).await;
            }
        }

        let now = Instant::now();
        window.last_request = Some(now);
        window.timestamps.push_back(now);
    }
}

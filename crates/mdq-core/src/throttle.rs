//! Dispatch-rate throttle: sliding hourly window plus randomized delay.
//!
//! Bounds how fast fetches are issued to avoid upstream blocking. The
//! window is in-memory only and is lost on restart; a frequently
//! restarted process can exceed the hourly cap. Accepted limitation.

use rand::Rng;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(60 * 60);

/// Read-only snapshot for operator-facing display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleStats {
    pub dispatches_this_hour: usize,
    pub max_per_hour: usize,
    pub remaining: usize,
    pub percent_used: f64,
}

/// Sliding-window rate limiter. Owned by the scheduler's run loop; never
/// touched from the listener thread, so no synchronization is needed.
#[derive(Debug)]
pub struct Throttle {
    max_per_hour: usize,
    min_delay: Duration,
    max_delay: Duration,
    window: VecDeque<Instant>,
}

impl Throttle {
    /// `min_delay <= max_delay` is the caller's contract; values are swapped
    /// if violated rather than erroring.
    pub fn new(max_per_hour: usize, min_delay: Duration, max_delay: Duration) -> Self {
        let (min_delay, max_delay) = if min_delay <= max_delay {
            (min_delay, max_delay)
        } else {
            (max_delay, min_delay)
        };
        Self {
            max_per_hour,
            min_delay,
            max_delay,
            window: VecDeque::new(),
        }
    }

    pub fn from_config(cfg: &crate::config::ThrottleConfig) -> Self {
        Self::new(
            cfg.max_per_hour,
            Duration::from_secs_f64(cfg.min_delay_secs.max(0.0)),
            Duration::from_secs_f64(cfg.max_delay_secs.max(0.0)),
        )
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.window.front() {
            if now.duration_since(oldest) >= WINDOW {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }

    /// Block until a dispatch is allowed, then record it.
    ///
    /// Waits out the hourly cap first (sleeping until the oldest recorded
    /// dispatch ages past 60 minutes), then sleeps a uniformly-random delay
    /// in `[min_delay, max_delay]`. Never fails; it only delays.
    pub async fn acquire(&mut self) {
        self.prune(Instant::now());

        while self.max_per_hour > 0 && self.window.len() >= self.max_per_hour {
            // Oldest entry present: window len >= cap >= 1.
            let oldest = self.window[0];
            let wake = oldest + WINDOW;
            let wait = wake.saturating_duration_since(Instant::now());
            tracing::info!(wait_secs = wait.as_secs(), "hourly dispatch cap reached, waiting");
            tokio::time::sleep_until(wake).await;
            self.prune(Instant::now());
        }

        let delay = self.pick_delay();
        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "inter-dispatch delay");
            tokio::time::sleep(delay).await;
        }

        self.window.push_back(Instant::now());
    }

    fn pick_delay(&self) -> Duration {
        if self.max_delay.is_zero() {
            return Duration::ZERO;
        }
        if self.min_delay == self.max_delay {
            return self.min_delay;
        }
        let secs = rand::thread_rng()
            .gen_range(self.min_delay.as_secs_f64()..=self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Current window usage. Prunes first so stale entries never inflate
    /// the reported count.
    pub fn stats(&mut self) -> ThrottleStats {
        self.prune(Instant::now());
        let used = self.window.len();
        let percent = if self.max_per_hour > 0 {
            used as f64 / self.max_per_hour as f64 * 100.0
        } else {
            0.0
        };
        ThrottleStats {
            dispatches_this_hour: used,
            max_per_hour: self.max_per_hour,
            remaining: self.max_per_hour.saturating_sub(used),
            percent_used: percent,
        }
    }

    /// Reconfigure limits mid-run. Lowering `max_per_hour` below the current
    /// window count makes the next `acquire` block until enough entries age
    /// out; that is intended.
    pub fn set_limits(
        &mut self,
        max_per_hour: Option<usize>,
        min_delay: Option<Duration>,
        max_delay: Option<Duration>,
    ) {
        if let Some(m) = max_per_hour {
            self.max_per_hour = m;
        }
        if let Some(d) = min_delay {
            self.min_delay = d;
        }
        if let Some(d) = max_delay {
            self.max_delay = d;
        }
        if self.min_delay > self.max_delay {
            std::mem::swap(&mut self.min_delay, &mut self.max_delay);
        }
    }
}

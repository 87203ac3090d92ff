// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Poll Driver: the single recurring timer behind availability refresh and
//! trigger evaluation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Work performed on every poll tick.
#[async_trait]
pub trait PollTarget: Send + Sync + 'static {
    async fn tick(&self);
}

struct ArmedTimer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns at most one running poll timer.
pub struct PollDriver {
    interval: Duration,
    timer: Mutex<Option<ArmedTimer>>,
}

impl PollDriver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            timer: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Replaces any running timer with a new one for `target`, then runs one
    /// tick immediately instead of waiting a full interval.
    ///
    /// Timer ticks fall one interval apart starting one interval after this
    /// call, however long the immediate tick takes.
    pub async fn arm(&self, target: Arc<dyn PollTarget>) {
        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_timer(interval, target.clone(), cancel.clone()));

        let previous = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(ArmedTimer { cancel, handle });
        if let Some(previous) = previous {
            debug!("cancelling previous poll timer");
            previous.cancel.cancel();
            // Wait out a tick still in flight on the old timer.
            let _ = previous.handle.await;
        }
        info!(interval_secs = self.interval.as_secs(), "poll timer armed");

        target.tick().await;
    }

    /// Stops the running timer, if any, and waits for it to finish.
    pub async fn disarm(&self) {
        let timer = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(timer) = timer {
            timer.cancel.cancel();
            let _ = timer.handle.await;
            info!("poll timer stopped");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|t| !t.cancel.is_cancelled())
    }
}

async fn run_timer(mut interval: Interval, target: Arc<dyn PollTarget>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => target.tick().await,
        }
    }
}

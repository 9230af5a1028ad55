//! Retrying media start
//!
//! The card and the decoder occasionally refuse to open a file that is
//! present. A start therefore stops whatever is playing, then makes a
//! bounded number of connect attempts with a storage re-mount between
//! them. Failures are counted across calls so the caller can escalate
//! when soft recovery keeps failing.

use crate::config::{clip_path, ClipPath, StartTiming};
use crate::traits::{MediaEngine, Platform, Storage};

/// Media start protocol state
#[derive(Debug, Clone)]
pub struct MediaStarter {
    timing: StartTiming,
    /// Failed attempts since the last successful start
    consecutive_failures: u16,
    /// Path of the last successfully started clip
    current: Option<ClipPath>,
}

impl MediaStarter {
    /// Create a new starter
    pub fn new(timing: StartTiming) -> Self {
        Self {
            timing,
            consecutive_failures: 0,
            current: None,
        }
    }

    /// Failed attempts since the last successful start
    pub fn consecutive_failures(&self) -> u16 {
        self.consecutive_failures
    }

    /// Reset the failure counter
    pub fn reset_failures(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Path of the clip most recently started
    pub fn current_path(&self) -> Option<&str> {
        self.current.as_ref().map(|p| p.as_str())
    }

    /// Forget the current path (after an explicit stop)
    pub fn clear_current(&mut self) {
        self.current = None;
    }

    /// Start playback of `path`
    ///
    /// Returns true once the engine accepted the file. A missing file fails
    /// immediately without retries. Volume is preserved across the stop of
    /// any running clip.
    pub fn start<M, S, P>(
        &mut self,
        engine: &mut M,
        storage: &mut S,
        platform: &mut P,
        path: &str,
    ) -> bool
    where
        M: MediaEngine,
        S: Storage,
        P: Platform,
    {
        info!("start -> {=str}", path);

        let Some(target) = clip_path(path) else {
            warn!("  path too long");
            self.record_failure();
            return false;
        };

        if !storage.exists(path) {
            warn!("  file not found");
            self.record_failure();
            return false;
        }

        let volume = engine.volume();
        if engine.is_running() {
            debug!("  engine running, stopping current clip first");
            self.stop_and_settle(engine, platform);
        }
        engine.set_volume(volume);

        let max_attempts = self.timing.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            debug!("  attempt {}/{}", attempt, max_attempts);

            platform.yield_now();
            platform.delay_ms(self.timing.attempt_yield_ms);

            if engine.connect(path) {
                for _ in 0..self.timing.settle_polls {
                    engine.service();
                    platform.delay_ms(self.timing.settle_poll_ms);
                }
                info!("  connect OK");
                self.consecutive_failures = 0;
                self.current = Some(target);
                return true;
            }

            warn!("  connect failed, re-mounting storage");
            self.record_failure();
            self.recover_storage(storage, platform);
        }

        warn!("  all {} connect attempts failed", max_attempts);
        self.current = None;
        false
    }

    /// Stop the engine and wait a bounded time for it to go quiet
    ///
    /// Proceeds even if the engine still reports running at the deadline.
    fn stop_and_settle<M, P>(&self, engine: &mut M, platform: &mut P)
    where
        M: MediaEngine,
        P: Platform,
    {
        engine.stop();

        let poll_ms = self.timing.stop_poll_ms.max(1);
        let polls = self.timing.stop_settle_ms / poll_ms;
        for _ in 0..polls {
            if !engine.is_running() {
                break;
            }
            engine.service();
            platform.delay_ms(poll_ms);
        }

        if engine.is_running() {
            warn!("  engine still running after stop request");
        } else {
            debug!("  stopped");
        }
    }

    fn recover_storage<S, P>(&self, storage: &mut S, platform: &mut P)
    where
        S: Storage,
        P: Platform,
    {
        platform.delay_ms(self.timing.remount_delay_ms);
        if storage.reinit() {
            debug!("  storage re-mounted");
        } else {
            error!("  storage re-mount failed");
        }
        platform.delay_ms(self.timing.retry_delay_ms);
    }

    fn record_failure(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }
}

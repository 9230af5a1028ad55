//! Platform backed by the embassy time driver
//!
//! Delays busy-wait on the time driver so the media start protocol can run
//! from a plain loop. Restart goes through the Cortex-M system control
//! block when the `cortex-m` feature is enabled.

use dhunbox_core::traits::Platform;
use embassy_time::{block_for, Duration, Instant};

/// Embassy time base with system reset
#[derive(Debug, Default)]
pub struct EmbassyPlatform;

impl EmbassyPlatform {
    /// Create the platform
    pub fn new() -> Self {
        Self
    }
}

impl Platform for EmbassyPlatform {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }

    fn delay_ms(&mut self, ms: u32) {
        block_for(Duration::from_millis(ms as u64));
    }

    fn restart(&mut self) {
        error!("restarting device");
        // Give the log transport a moment to drain
        block_for(Duration::from_millis(200));

        #[cfg(feature = "cortex-m")]
        cortex_m::peripheral::SCB::sys_reset();

        #[cfg(not(feature = "cortex-m"))]
        warn!("no reset mechanism available");
    }
}

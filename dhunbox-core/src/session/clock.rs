//! Session clock
//!
//! Tracks the PIR sensor edge, the last time motion was seen, when the
//! current dhun session began, and gates the periodic state check.
//!
//! All timestamps are wrapping milliseconds since boot.

/// Motion edge detector and session timer
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionClock {
    /// Minimum gap between trigger attempts (ms)
    min_trigger_gap_ms: u32,
    /// Minimum gap between periodic checks (ms)
    check_interval_ms: u32,
    /// Sensor level at the previous sample
    last_pir: bool,
    /// Last sample with motion high
    last_motion_ms: u32,
    /// Start of the current dhun session
    session_start_ms: u32,
    /// Last trigger attempt (None = no throttle in effect)
    last_trigger_attempt_ms: Option<u32>,
    /// Last periodic check that ran
    last_check_ms: Option<u32>,
}

impl SessionClock {
    /// Create a new session clock
    pub fn new(min_trigger_gap_ms: u32, check_interval_ms: u32, now_ms: u32) -> Self {
        Self {
            min_trigger_gap_ms,
            check_interval_ms,
            last_pir: false,
            last_motion_ms: now_ms,
            session_start_ms: now_ms,
            last_trigger_attempt_ms: None,
            last_check_ms: None,
        }
    }

    /// Record a motion sample and decide whether it should trigger
    ///
    /// While `playing`, the sample only refreshes the last-motion time.
    /// Otherwise a trigger is worthy on a rising edge, or on any high
    /// sample while `idle` (sensor already high at power-on). Worthy
    /// triggers are throttled by the minimum gap and record the attempt.
    pub fn sample(&mut self, now_ms: u32, motion_high: bool, playing: bool, idle: bool) -> bool {
        if motion_high {
            self.last_motion_ms = now_ms;
        }

        let previous = self.last_pir;
        self.last_pir = motion_high;

        if playing || self.throttled(now_ms) {
            return false;
        }

        let rising_edge = motion_high && !previous;
        if rising_edge || (motion_high && idle) {
            trace!("trigger (rising={}, idle={})", rising_edge, idle);
            self.last_trigger_attempt_ms = Some(now_ms);
            return true;
        }

        false
    }

    /// Check whether a trigger attempt would currently be throttled
    pub fn throttled(&self, now_ms: u32) -> bool {
        match self.last_trigger_attempt_ms {
            Some(last) => now_ms.wrapping_sub(last) < self.min_trigger_gap_ms,
            None => false,
        }
    }

    /// Record a trigger attempt (e.g. a failed start)
    pub fn mark_trigger_attempt(&mut self, now_ms: u32) {
        self.last_trigger_attempt_ms = Some(now_ms);
    }

    /// Lift the trigger throttle
    pub fn clear_trigger_attempt(&mut self) {
        self.last_trigger_attempt_ms = None;
    }

    /// Gate for the periodic state check
    ///
    /// Returns true at most once per check interval.
    pub fn tick_due(&mut self, now_ms: u32) -> bool {
        if let Some(last) = self.last_check_ms {
            if now_ms.wrapping_sub(last) < self.check_interval_ms {
                return false;
            }
        }
        self.last_check_ms = Some(now_ms);
        true
    }

    /// Mark the start of a dhun session
    pub fn start_session(&mut self, now_ms: u32) {
        self.session_start_ms = now_ms;
    }

    /// Time since the current session started
    pub fn session_elapsed_ms(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.session_start_ms)
    }

    /// Time since motion was last seen
    pub fn since_motion_ms(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.last_motion_ms)
    }

    /// Check if no motion has been seen for longer than `timeout_ms`
    pub fn motion_timed_out(&self, now_ms: u32, timeout_ms: u32) -> bool {
        self.since_motion_ms(now_ms) > timeout_ms
    }

    /// Last motion timestamp
    pub fn last_motion_ms(&self) -> u32 {
        self.last_motion_ms
    }

    /// Last trigger attempt timestamp
    pub fn last_trigger_attempt_ms(&self) -> Option<u32> {
        self.last_trigger_attempt_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> SessionClock {
        SessionClock::new(500, 120, 0)
    }

    #[test]
    fn test_rising_edge_triggers() {
        let mut clock = clock();
        assert!(!clock.sample(1000, false, false, false));
        assert!(clock.sample(1100, true, false, false));
        assert_eq!(clock.last_trigger_attempt_ms(), Some(1100));
    }

    #[test]
    fn test_held_high_not_idle_does_not_retrigger() {
        let mut clock = clock();
        assert!(clock.sample(1000, true, false, false));
        // Still high, past the gap, but not idle and no edge
        assert!(!clock.sample(2000, true, false, false));
    }

    #[test]
    fn test_high_while_idle_triggers_without_edge() {
        let mut clock = clock();
        assert!(clock.sample(1000, true, false, true));
        // Past the gap, still high, still idle
        assert!(clock.sample(1600, true, false, true));
    }

    #[test]
    fn test_throttle_within_gap() {
        let mut clock = clock();
        assert!(clock.sample(1000, true, false, true));
        assert!(!clock.sample(1200, true, false, true));
        assert!(!clock.sample(1499, true, false, true));
        assert!(clock.sample(1500, true, false, true));
    }

    #[test]
    fn test_playing_only_updates_motion() {
        let mut clock = clock();
        assert!(!clock.sample(5000, true, true, false));
        assert_eq!(clock.last_motion_ms(), 5000);
        assert_eq!(clock.last_trigger_attempt_ms(), None);
    }

    #[test]
    fn test_edge_seen_while_playing_is_consumed() {
        let mut clock = clock();
        clock.sample(1000, true, true, false);
        // Playback ended with the sensor still high: no fresh edge
        assert!(!clock.sample(2000, true, false, false));
    }

    #[test]
    fn test_clear_trigger_attempt_lifts_throttle() {
        let mut clock = clock();
        clock.mark_trigger_attempt(1000);
        assert!(clock.throttled(1100));
        clock.clear_trigger_attempt();
        assert!(!clock.throttled(1100));
    }

    #[test]
    fn test_tick_gate() {
        let mut clock = clock();
        assert!(clock.tick_due(0));
        assert!(!clock.tick_due(100));
        assert!(clock.tick_due(120));
        assert!(!clock.tick_due(200));
        assert!(clock.tick_due(240));
    }

    #[test]
    fn test_motion_timeout() {
        let mut clock = clock();
        clock.sample(1000, true, true, false);
        assert!(!clock.motion_timed_out(601_000, 600_000));
        assert!(clock.motion_timed_out(601_001, 600_000));
    }

    #[test]
    fn test_timestamps_wrap() {
        let mut clock = SessionClock::new(500, 120, u32::MAX - 100);
        clock.sample(u32::MAX - 100, true, true, false);
        assert_eq!(clock.since_motion_ms(200), 301);
        clock.start_session(u32::MAX - 10);
        assert_eq!(clock.session_elapsed_ms(10), 21);
    }
}

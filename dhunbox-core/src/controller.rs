//! Playback state machine
//!
//! The controller ties the subsystems together:
//! - Samples the motion sensor and starts the greeting
//! - Moves from the greeting into the dhun playlist
//! - Fires hourly chimes, preempting and later resuming playback
//! - Ends sessions after a period without motion
//! - Escalates to a device restart when starts keep failing
//!
//! Everything runs from [`PlaybackStateMachine::poll`] on a single loop.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{clamp_volume, clip_path, BehaviorConfig, DEFAULT_VOLUME};
use crate::media::MediaStarter;
use crate::playlist::Playlist;
use crate::scheduler::{ChimeScheduler, ChimeStep, DndWindow, Preemption, ResumeTarget};
use crate::session::SessionClock;
use crate::state::{Event, Events, PlaybackState};
use crate::traits::{
    MediaEngine, Platform, SettingsStore, Storage, TimeOfDay, WallClock, MAX_VOLUME,
};

/// Hardware collaborators driven by the state machine
pub struct Devices<M, S, C, P> {
    /// Audio decoder
    pub engine: M,
    /// Media card
    pub storage: S,
    /// Real-time clock
    pub clock: C,
    /// Timing and reset
    pub platform: P,
}

/// Outcome of trying to start a random dhun track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum TrackStart {
    Started,
    Failed,
    Empty,
}

/// Central coordinator for motion sessions and chimes
pub struct PlaybackStateMachine<M, S, C, K, P> {
    pub(crate) devices: Devices<M, S, C, P>,
    pub(crate) settings: K,
    pub(crate) config: BehaviorConfig,
    /// Current activity
    pub(crate) state: PlaybackState,
    /// A session (greeting or dhun) owns the engine
    pub(crate) playing: bool,
    pub(crate) starter: MediaStarter,
    pub(crate) session: SessionClock,
    pub(crate) dnd: DndWindow,
    pub(crate) chimes: ChimeScheduler,
    pub(crate) playlist: Playlist,
    /// Playback interrupted by the running chime
    pub(crate) preemption: Option<Preemption>,
    rng: SmallRng,
    /// Restart already requested
    restart_requested: bool,
}

impl<M, S, C, K, P> PlaybackStateMachine<M, S, C, K, P>
where
    M: MediaEngine,
    S: Storage,
    C: WallClock,
    K: SettingsStore,
    P: Platform,
{
    /// Create the state machine and run the startup sequence
    ///
    /// Loads quiet-hour settings and the saved volume, applies the volume
    /// and scans the dhun folder. `seed` feeds track shuffling.
    pub fn new(
        mut devices: Devices<M, S, C, P>,
        mut settings: K,
        config: BehaviorConfig,
        seed: u64,
    ) -> Self {
        let now = devices.platform.now_ms();

        let dnd = settings.load_dnd();
        info!(
            "quiet hours: enabled={} {}-{} window={}s",
            dnd.enabled,
            dnd.start_hour,
            dnd.end_hour,
            dnd.chime_window_s
        );

        let volume = clamp_volume(settings.load_volume(DEFAULT_VOLUME));
        devices.engine.set_volume(volume);
        info!("volume {}", volume);

        let mut playlist = Playlist::new(config.paths.dhun_folder);
        playlist.rescan(&mut devices.storage);

        Self {
            session: SessionClock::new(
                config.min_trigger_gap_ms,
                config.state_check_interval_ms,
                now,
            ),
            starter: MediaStarter::new(config.start),
            dnd: DndWindow::new(dnd),
            chimes: ChimeScheduler::new(config.chime, dnd.chime_window_s),
            devices,
            settings,
            config,
            state: PlaybackState::Idle,
            playing: false,
            playlist,
            preemption: None,
            rng: SmallRng::seed_from_u64(seed),
            restart_requested: false,
        }
    }

    /// Get current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Check if a session owns the engine
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Playback a running chime will resume
    pub fn preemption(&self) -> Option<&Preemption> {
        self.preemption.as_ref()
    }

    /// Failed start attempts since the last success
    pub fn consecutive_failures(&self) -> u16 {
        self.starter.consecutive_failures()
    }

    /// Check if a device restart has been requested
    pub fn restart_requested(&self) -> bool {
        self.restart_requested
    }

    /// Session timing
    pub fn session(&self) -> &SessionClock {
        &self.session
    }

    /// Chime scheduling
    pub fn chimes(&self) -> &ChimeScheduler {
        &self.chimes
    }

    /// Dhun playlist
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Behavior configuration
    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    /// Hardware collaborators
    pub fn devices(&self) -> &Devices<M, S, C, P> {
        &self.devices
    }

    /// Hardware collaborators, mutably
    pub fn devices_mut(&mut self) -> &mut Devices<M, S, C, P> {
        &mut self.devices
    }

    /// Settings store
    pub fn settings(&self) -> &K {
        &self.settings
    }

    /// One pass of the main loop
    ///
    /// Services the engine, samples motion, then runs the periodic check.
    /// Every event from the pass is returned, motion first.
    pub fn poll(&mut self, motion_high: bool) -> Events {
        self.devices.engine.service();

        let mut events = Events::new();
        if let Some(event) = self.sample_motion(motion_high) {
            let _ = events.push(event);
        }
        for event in self.periodic() {
            let _ = events.push(event);
        }

        for event in &events {
            report(event);
        }
        events
    }

    /// Feed one motion sensor reading
    ///
    /// Starts the greeting on a worthy trigger while nothing is playing.
    pub fn sample_motion(&mut self, motion_high: bool) -> Option<Event> {
        let now = self.devices.platform.now_ms();
        let idle = self.state.is_idle();
        if self.session.sample(now, motion_high, self.playing, idle) {
            info!("motion trigger");
            Some(self.start_greeting())
        } else {
            None
        }
    }

    /// Start the greeting clip
    ///
    /// Refused while a chime is running and during quiet hours. Quiet hours
    /// fail open when the clock cannot be read.
    pub fn start_greeting(&mut self) -> Event {
        if self.state.is_chiming() {
            debug!("greeting refused: chime in progress");
            return Event::GreetingDeclined;
        }

        let time = self.devices.clock.now();
        if self.dnd.is_suppressed_at(time) {
            info!("greeting suppressed: quiet hours");
            return Event::GreetingDeclined;
        }

        self.state = PlaybackState::Greeting;
        let greeting = self.config.paths.greeting;
        if self.start_clip(greeting) {
            self.playing = true;
            Event::GreetingStarted
        } else {
            warn!("greeting failed to start");
            self.state = PlaybackState::Idle;
            self.playing = false;
            let now = self.devices.platform.now_ms();
            self.session.mark_trigger_attempt(now);
            Event::GreetingFailed
        }
    }

    /// Begin the dhun part of a session
    pub fn start_dhun_session(&mut self) -> Event {
        self.state = PlaybackState::Dhun;
        let now = self.devices.platform.now_ms();
        self.session.start_session(now);

        match self.start_random_track() {
            TrackStart::Started => {
                self.playing = true;
                info!("dhun session started");
                Event::SessionStarted
            }
            outcome => {
                self.state = PlaybackState::Idle;
                self.playing = false;
                self.session.clear_trigger_attempt();
                if outcome == TrackStart::Empty {
                    Event::PlaylistEmpty
                } else {
                    Event::TrackFailed
                }
            }
        }
    }

    /// Start a random track from the dhun folder
    ///
    /// An empty folder drops back to idle. A failed start leaves the state
    /// alone so the next check retries.
    pub fn start_random_dhun(&mut self) -> bool {
        match self.start_random_track() {
            TrackStart::Started => {
                self.playing = true;
                true
            }
            TrackStart::Empty => {
                self.state = PlaybackState::Idle;
                self.playing = false;
                false
            }
            TrackStart::Failed => false,
        }
    }

    /// Periodic state check, gated to the check interval
    ///
    /// Chimes are evaluated first so they can preempt whatever is playing.
    /// A chime event comes before the state check's event.
    pub fn periodic(&mut self) -> Events {
        let mut events = Events::new();
        let now = self.devices.platform.now_ms();
        if !self.session.tick_due(now) {
            return events;
        }

        if let Some(chime) = self.check_chime() {
            let _ = events.push(chime);
        }
        let running = self.devices.engine.is_running();

        let event = match self.state {
            PlaybackState::Chiming(_) => {
                if running {
                    None
                } else {
                    Some(self.advance_chime())
                }
            }
            PlaybackState::Greeting => {
                if running {
                    None
                } else if self.playing {
                    debug!("greeting finished");
                    Some(self.start_dhun_session())
                } else {
                    self.go_idle();
                    Some(Event::SessionEnded)
                }
            }
            PlaybackState::Dhun => {
                if self.session.motion_timed_out(now, self.config.session_timeout_ms) {
                    info!(
                        "no motion for {} ms, ending session",
                        self.session.since_motion_ms(now)
                    );
                    self.devices.engine.stop();
                    self.starter.clear_current();
                    self.go_idle();
                    Some(Event::SessionTimeout)
                } else if running {
                    None
                } else {
                    Some(self.next_track())
                }
            }
            PlaybackState::Idle => {
                if self.playing && !running {
                    debug!("clearing stale playing flag");
                    self.go_idle();
                    Some(Event::FlagsCleared)
                } else {
                    None
                }
            }
        };

        if let Some(event) = event {
            let _ = events.push(event);
        }
        events
    }

    /// Play the next dhun track, escalating when starts keep failing
    fn next_track(&mut self) -> Event {
        if self.start_random_dhun() {
            return Event::TrackStarted;
        }
        if self.state.is_idle() {
            info!("no tracks, session over");
            self.session.clear_trigger_attempt();
            return Event::PlaylistEmpty;
        }

        let failures = self.starter.consecutive_failures();
        if failures >= self.config.restart_failure_threshold && !self.restart_requested {
            error!("{} consecutive start failures, restarting", failures);
            self.restart_requested = true;
            self.devices.platform.restart();
            return Event::RestartRequested;
        }

        Event::TrackFailed
    }

    /// Start a chime if one is due
    fn check_chime(&mut self) -> Option<Event> {
        let Ok(time) = self.devices.clock.now() else {
            return None;
        };
        if !self.chimes.check_due(&time, self.state.is_chiming()) {
            return None;
        }

        if self.dnd.is_suppressed(time.hour) {
            info!("chime at {} suppressed: quiet hours", time.hour);
            self.chimes.mark_handled(time.hour);
            return Some(Event::ChimeDeclined { hour: time.hour });
        }

        Some(self.begin_chime(&time))
    }

    fn begin_chime(&mut self, time: &TimeOfDay) -> Event {
        let saved_volume = self.devices.engine.volume();
        let ctx = self.chimes.begin(time, saved_volume);
        info!("chime for hour {}, striking {}", time.hour, ctx.hour_number);

        self.preemption = None;
        if self.devices.engine.is_running() {
            let path = self.starter.current_path().and_then(clip_path);
            if let (Some(path), Some(resume)) = (path, self.state.resume_target()) {
                debug!("preempting {=str}", path.as_str());
                self.preemption = Some(Preemption { path, resume });
            }
        }

        self.state = PlaybackState::Chiming(ctx);
        self.playing = true;
        self.devices.engine.set_volume(MAX_VOLUME);

        let bell = self.config.paths.bell;
        if self.start_clip(bell) {
            Event::ChimeStarted {
                hour_number: ctx.hour_number,
            }
        } else {
            warn!("bell failed to start");
            self.end_chime(true)
        }
    }

    /// Move the chime on after a clip finished
    fn advance_chime(&mut self) -> Event {
        let PlaybackState::Chiming(mut ctx) = self.state else {
            return self.end_chime(true);
        };
        let step = ctx.advance();
        self.state = PlaybackState::Chiming(ctx);

        match step {
            ChimeStep::StrikeBell => {
                self.devices.engine.set_volume(MAX_VOLUME);
                let bell = self.config.paths.bell;
                if self.start_clip(bell) {
                    Event::BellStruck
                } else {
                    self.end_chime(true)
                }
            }
            ChimeStep::SpeakNumber => {
                let Some(path) = ctx.number_path(self.config.paths.chime_folder) else {
                    warn!("number clip path too long");
                    return self.end_chime(true);
                };
                if self.start_clip(&path) {
                    Event::NumberSpoken
                } else {
                    self.end_chime(true)
                }
            }
            ChimeStep::Complete => self.end_chime(false),
        }
    }

    /// Restore volume, clear the chime and resume what it interrupted
    fn end_chime(&mut self, aborted: bool) -> Event {
        let volume = match self.state {
            PlaybackState::Chiming(ctx) => ctx.saved_volume,
            _ => self.devices.engine.volume(),
        };
        self.devices.engine.set_volume(volume);
        self.state = PlaybackState::Idle;
        self.playing = false;

        let resumed = self.resume_preempted();
        if aborted {
            warn!("chime aborted");
            Event::ChimeAborted { resumed }
        } else {
            info!("chime complete");
            Event::ChimeCompleted { resumed }
        }
    }

    /// Restart the clip a chime interrupted, at most once
    fn resume_preempted(&mut self) -> Option<ResumeTarget> {
        let Preemption { path, resume } = self.preemption.take()?;

        // A bell that never started leaves the interrupted clip playing
        let still_playing = self.devices.engine.is_running()
            && self.starter.current_path() == Some(path.as_str());

        if still_playing || self.start_clip(&path) {
            info!("resumed {=str}", path.as_str());
            self.state = PlaybackState::from(resume);
            self.playing = resume != ResumeTarget::Idle;
            Some(resume)
        } else {
            warn!("could not resume {=str}", path.as_str());
            None
        }
    }

    fn start_random_track(&mut self) -> TrackStart {
        let count = self.playlist.count();
        if count == 0 {
            warn!("dhun folder is empty");
            return TrackStart::Empty;
        }

        let index = self.rng.random_range(0..count);
        let Some(path) = self.playlist.path_at(index).and_then(clip_path) else {
            return TrackStart::Empty;
        };
        debug!("track {}/{}", index + 1, count);

        if self.start_clip(&path) {
            TrackStart::Started
        } else {
            TrackStart::Failed
        }
    }

    pub(crate) fn start_clip(&mut self, path: &str) -> bool {
        let started = self.starter.start(
            &mut self.devices.engine,
            &mut self.devices.storage,
            &mut self.devices.platform,
            path,
        );
        if started && self.restart_requested {
            debug!("start succeeded, restart latch cleared");
            self.restart_requested = false;
        }
        started
    }

    pub(crate) fn go_idle(&mut self) {
        self.state = PlaybackState::Idle;
        self.playing = false;
        self.session.clear_trigger_attempt();
    }

    /// Path of the clip currently loaded
    pub fn current_path(&self) -> Option<&str> {
        self.starter.current_path()
    }
}

/// Log an event at a level matching what it means
fn report(event: &Event) {
    if event.is_failure() {
        warn!("event: {}", event);
    } else if event.is_chime_event() || event.ends_session() {
        info!("event: {}", event);
    } else {
        debug!("event: {}", event);
    }
}

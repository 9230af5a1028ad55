//! Device control surface
//!
//! Operations offered to the dashboard: volume, quiet hours, manual
//! playback, file management and a status snapshot. Setting changes are
//! applied immediately and persisted through the settings store.

use crate::config::{clamp_volume, validate_hour, validate_window, DndSettings};
use crate::controller::PlaybackStateMachine;
use crate::playlist::Page;
use crate::state::PlaybackState;
use crate::traits::{MediaEngine, Platform, SettingsError, SettingsStore, Storage, WallClock};

/// Control request errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlError {
    /// Hour outside 0-23
    InvalidHour,
    /// Chime window outside 1-60 seconds
    InvalidWindow,
    /// Path is not absolute or too long
    InvalidPath,
    /// No such file
    NotFound,
    /// File exists but playback could not start
    PlaybackFailed,
    /// Storage refused to remove the file
    DeleteFailed,
    /// A chime owns the engine
    Busy,
    /// Value applied but could not be persisted
    Settings(SettingsError),
}

impl From<SettingsError> for ControlError {
    fn from(e: SettingsError) -> Self {
        ControlError::Settings(e)
    }
}

/// Snapshot for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status<'a> {
    /// Volume the listener hears outside chimes
    pub volume: u8,
    /// Engine is producing audio
    pub running: bool,
    /// Clip most recently started
    pub current_path: Option<&'a str>,
    /// Current activity
    pub state: PlaybackState,
    /// Quiet-hour settings
    pub dnd: DndSettings,
    /// Failed start attempts since the last success
    pub consecutive_failures: u16,
    /// Tracks in the dhun folder
    pub tracks: usize,
}

impl<M, S, C, K, P> PlaybackStateMachine<M, S, C, K, P>
where
    M: MediaEngine,
    S: Storage,
    C: WallClock,
    K: SettingsStore,
    P: Platform,
{
    /// Current status snapshot
    pub fn status(&self) -> Status<'_> {
        Status {
            volume: self.volume(),
            running: self.devices.engine.is_running(),
            current_path: self.starter.current_path(),
            state: self.state,
            dnd: *self.dnd.settings(),
            consecutive_failures: self.starter.consecutive_failures(),
            tracks: self.playlist.count(),
        }
    }

    /// Listening volume
    ///
    /// During a chime this is the volume restored afterwards.
    pub fn volume(&self) -> u8 {
        match self.state.chime() {
            Some(ctx) => ctx.saved_volume,
            None => self.devices.engine.volume(),
        }
    }

    /// Set and persist the listening volume (clamped to 0-21)
    ///
    /// A chime keeps playing at full volume; the new level applies once it
    /// ends.
    pub fn set_volume(&mut self, volume: u8) -> Result<u8, ControlError> {
        let volume = clamp_volume(volume);
        match &mut self.state {
            PlaybackState::Chiming(ctx) => ctx.saved_volume = volume,
            _ => self.devices.engine.set_volume(volume),
        }
        info!("volume -> {}", volume);
        self.settings.save_volume(volume)?;
        Ok(volume)
    }

    /// Check if the engine is producing audio
    pub fn is_running(&self) -> bool {
        self.devices.engine.is_running()
    }

    /// Quiet-hour settings
    pub fn dnd_settings(&self) -> DndSettings {
        *self.dnd.settings()
    }

    /// Check if quiet hours are enabled
    pub fn is_dnd_enabled(&self) -> bool {
        self.dnd.settings().enabled
    }

    /// First quiet hour
    pub fn dnd_start_hour(&self) -> u8 {
        self.dnd.settings().start_hour
    }

    /// First hour after the quiet window
    pub fn dnd_end_hour(&self) -> u8 {
        self.dnd.settings().end_hour
    }

    /// Chime window in seconds
    pub fn chime_window_sec(&self) -> u8 {
        self.dnd.settings().chime_window_s
    }

    /// Enable or disable quiet hours
    pub fn set_dnd_enabled(&mut self, enabled: bool) -> Result<(), ControlError> {
        let settings = DndSettings {
            enabled,
            ..*self.dnd.settings()
        };
        self.apply_dnd(settings)
    }

    /// Set the quiet-hour range (hours 0-23, start inclusive, end exclusive)
    pub fn set_dnd_hours(&mut self, start_hour: u8, end_hour: u8) -> Result<(), ControlError> {
        validate_hour(start_hour).map_err(|_| ControlError::InvalidHour)?;
        validate_hour(end_hour).map_err(|_| ControlError::InvalidHour)?;
        let settings = DndSettings {
            start_hour,
            end_hour,
            ..*self.dnd.settings()
        };
        self.apply_dnd(settings)
    }

    /// Set how many seconds after the top of the hour a chime may start
    pub fn set_chime_window_sec(&mut self, window_s: u8) -> Result<(), ControlError> {
        validate_window(window_s).map_err(|_| ControlError::InvalidWindow)?;
        let settings = DndSettings {
            chime_window_s: window_s,
            ..*self.dnd.settings()
        };
        self.apply_dnd(settings)
    }

    fn apply_dnd(&mut self, settings: DndSettings) -> Result<(), ControlError> {
        info!(
            "quiet hours -> enabled={} {}-{} window={}s",
            settings.enabled,
            settings.start_hour,
            settings.end_hour,
            settings.chime_window_s
        );
        self.dnd.set_settings(settings);
        self.chimes.set_window(settings.chime_window_s);
        self.settings.save_dnd(&settings)?;
        Ok(())
    }

    /// Read a stored integer setting
    pub fn setting(&mut self, key: &str, default: i32) -> i32 {
        self.settings.load_int(key, default)
    }

    /// Store an integer setting
    pub fn set_setting(&mut self, key: &str, value: i32) -> Result<(), ControlError> {
        self.settings.save_int(key, value)?;
        Ok(())
    }

    /// Play a file on request
    ///
    /// Not allowed while a chime is running. The clip plays outside any
    /// session, so the machine stays idle.
    pub fn play(&mut self, path: &str) -> Result<(), ControlError> {
        if self.state.is_chiming() {
            return Err(ControlError::Busy);
        }
        if !path.starts_with('/') {
            return Err(ControlError::InvalidPath);
        }
        if !self.devices.storage.exists(path) {
            return Err(ControlError::NotFound);
        }

        info!("manual play {=str}", path);
        self.go_idle();
        if self.start_clip(path) {
            Ok(())
        } else {
            Err(ControlError::PlaybackFailed)
        }
    }

    /// Power control
    ///
    /// Off stops all playback, abandoning any session or chime. On has no
    /// effect; the machine is always listening for motion.
    pub fn power(&mut self, on: bool) {
        if on {
            return;
        }

        if self.state.in_session() {
            info!("power off: ending {=str} session", self.state.name());
        } else {
            info!("power off: stopping playback");
        }
        if let PlaybackState::Chiming(ctx) = self.state {
            self.devices.engine.set_volume(ctx.saved_volume);
        }
        self.preemption = None;
        self.devices.engine.stop();
        self.starter.clear_current();
        self.go_idle();
    }

    /// Delete a file and refresh the playlist
    pub fn delete(&mut self, path: &str) -> Result<(), ControlError> {
        if !path.starts_with('/') {
            return Err(ControlError::InvalidPath);
        }
        if !self.devices.storage.exists(path) {
            return Err(ControlError::NotFound);
        }

        if self.starter.current_path() == Some(path) && self.devices.engine.is_running() {
            debug!("stopping {=str} before delete", path);
            self.devices.engine.stop();
            self.starter.clear_current();
        }

        if !self.devices.storage.remove(path) {
            warn!("could not delete {=str}", path);
            return Err(ControlError::DeleteFailed);
        }

        info!("deleted {=str}", path);
        self.rescan();
        Ok(())
    }

    /// Re-read the dhun folder
    pub fn rescan(&mut self) -> usize {
        self.playlist.rescan(&mut self.devices.storage)
    }

    /// Page through the dhun folder listing
    pub fn files(&self, start: usize, count: usize) -> Page<'_> {
        self.playlist.page(start, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BehaviorConfig, DEFAULT_VOLUME};
    use crate::controller::Devices;
    use crate::mock::{MockClock, MockEngine, MockPlatform, MockSettings, MockStorage};
    use crate::state::Event;
    use crate::traits::MAX_VOLUME;

    type TestMachine =
        PlaybackStateMachine<MockEngine, MockStorage, MockClock, MockSettings, MockPlatform>;

    fn machine() -> TestMachine {
        let devices = Devices {
            engine: MockEngine::new(),
            storage: MockStorage::with_files(&[
                "/jay-swaminarayan.mp3",
                "/dhun/a.mp3",
                "/dhun/b.mp3",
                "/chime/bell.mp3",
                "/chime/4.mp3",
            ]),
            clock: MockClock::at(14, 20, 0),
            platform: MockPlatform::new(),
        };
        PlaybackStateMachine::new(devices, MockSettings::new(), BehaviorConfig::default(), 3)
    }

    #[test]
    fn test_set_volume_clamps_and_persists() {
        let mut m = machine();

        assert_eq!(m.set_volume(40), Ok(MAX_VOLUME));
        assert_eq!(m.devices().engine.volume, MAX_VOLUME);
        assert_eq!(m.settings().record.volume, Some(MAX_VOLUME));

        assert_eq!(m.set_volume(4), Ok(4));
        assert_eq!(m.volume(), 4);
    }

    #[test]
    fn test_volume_change_during_chime_applies_after() {
        let mut m = machine();
        m.devices_mut().clock.set(16, 0, 0);
        m.devices_mut().platform.advance(200);
        assert_eq!(m.periodic().as_slice(), [Event::ChimeStarted { hour_number: 4 }]);

        assert_eq!(m.set_volume(6), Ok(6));
        assert_eq!(m.devices().engine.volume, MAX_VOLUME);
        assert_eq!(m.volume(), 6);

        m.power(false);
        assert_eq!(m.devices().engine.volume, 6);
    }

    #[test]
    fn test_dnd_setters_validate() {
        let mut m = machine();

        assert_eq!(m.set_dnd_hours(24, 6), Err(ControlError::InvalidHour));
        assert_eq!(m.set_dnd_hours(22, 30), Err(ControlError::InvalidHour));
        assert_eq!(m.set_chime_window_sec(0), Err(ControlError::InvalidWindow));
        assert_eq!(m.set_chime_window_sec(61), Err(ControlError::InvalidWindow));
        assert_eq!(m.settings().saves, 0);
        assert_eq!(m.dnd_settings(), DndSettings::default());
    }

    #[test]
    fn test_dnd_setters_persist() {
        let mut m = machine();

        m.set_dnd_hours(21, 7).unwrap();
        m.set_chime_window_sec(30).unwrap();
        m.set_dnd_enabled(false).unwrap();

        let expected = DndSettings {
            enabled: false,
            start_hour: 21,
            end_hour: 7,
            chime_window_s: 30,
        };
        assert_eq!(m.dnd_settings(), expected);
        assert!(!m.is_dnd_enabled());
        assert_eq!((m.dnd_start_hour(), m.dnd_end_hour()), (21, 7));
        assert_eq!(m.chime_window_sec(), 30);
        assert_eq!(m.settings().record.dnd, Some(expected));
        assert_eq!(m.settings().saves, 3);
        assert_eq!(m.chimes().window(), 30);
    }

    #[test]
    fn test_quiet_hours_change_takes_effect() {
        let mut m = machine();
        m.set_dnd_hours(14, 15).unwrap();

        assert_eq!(m.sample_motion(true), Some(Event::GreetingDeclined));

        m.set_dnd_enabled(false).unwrap();
        m.devices_mut().platform.advance(1000);
        assert_eq!(m.sample_motion(true), Some(Event::GreetingStarted));
    }

    #[test]
    fn test_int_settings() {
        let mut m = machine();
        assert_eq!(m.setting("eq_bass", 3), 3);
        m.set_setting("eq_bass", -2).unwrap();
        assert_eq!(m.setting("eq_bass", 3), -2);
    }

    #[test]
    fn test_play_checks_path() {
        let mut m = machine();

        assert_eq!(m.play("dhun/a.mp3"), Err(ControlError::InvalidPath));
        assert_eq!(m.play("/dhun/zzz.mp3"), Err(ControlError::NotFound));

        m.devices_mut().engine.reject_all = true;
        assert_eq!(m.play("/dhun/a.mp3"), Err(ControlError::PlaybackFailed));

        m.devices_mut().engine.reject_all = false;
        assert_eq!(m.play("/dhun/b.mp3"), Ok(()));
        assert_eq!(m.status().current_path, Some("/dhun/b.mp3"));
        assert_eq!(m.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_play_refused_during_chime() {
        let mut m = machine();
        m.devices_mut().clock.set(16, 0, 1);
        m.devices_mut().platform.advance(200);
        m.periodic();

        assert_eq!(m.play("/dhun/a.mp3"), Err(ControlError::Busy));
    }

    #[test]
    fn test_manual_clip_resumed_after_chime() {
        let mut m = machine();
        m.play("/dhun/a.mp3").unwrap();

        m.devices_mut().clock.set(16, 0, 0);
        m.devices_mut().platform.advance(200);
        assert_eq!(m.periodic().as_slice(), [Event::ChimeStarted { hour_number: 4 }]);

        let end = loop {
            m.devices_mut().engine.finish();
            m.devices_mut().platform.advance(200);
            let done = m
                .periodic()
                .into_iter()
                .find(|e| matches!(e, Event::ChimeCompleted { .. }));
            if let Some(e) = done {
                break e;
            }
        };
        assert_eq!(
            end,
            Event::ChimeCompleted {
                resumed: Some(crate::scheduler::ResumeTarget::Idle)
            }
        );
        assert_eq!(m.state(), PlaybackState::Idle);
        assert!(!m.is_playing());
        assert_eq!(m.devices().engine.last_connect(), Some("/dhun/a.mp3"));
    }

    #[test]
    fn test_power_off_stops_session() {
        let mut m = machine();
        assert_eq!(m.sample_motion(true), Some(Event::GreetingStarted));

        m.power(false);
        assert!(!m.is_running());
        assert!(!m.is_playing());
        assert_eq!(m.state(), PlaybackState::Idle);
        assert_eq!(m.status().current_path, None);

        m.power(true);
        assert_eq!(m.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_power_off_during_chime_restores_volume() {
        let mut m = machine();
        m.devices_mut().clock.set(16, 0, 0);
        m.devices_mut().platform.advance(200);
        m.periodic();
        assert_eq!(m.devices().engine.volume, MAX_VOLUME);

        m.power(false);
        assert_eq!(m.devices().engine.volume, DEFAULT_VOLUME);
        assert!(m.preemption().is_none());
        assert_eq!(m.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_delete_rescans() {
        let mut m = machine();
        assert_eq!(m.files(0, 10).total, 2);

        assert_eq!(m.delete("/dhun/a.mp3"), Ok(()));
        let page = m.files(0, 10);
        assert_eq!(page.total, 1);
        assert_eq!(page.tracks[0].as_str(), "/dhun/b.mp3");

        assert_eq!(m.delete("/dhun/a.mp3"), Err(ControlError::NotFound));
        assert_eq!(m.delete("dhun/b.mp3"), Err(ControlError::InvalidPath));
    }

    #[test]
    fn test_delete_stops_playing_file() {
        let mut m = machine();
        m.play("/dhun/a.mp3").unwrap();

        m.delete("/dhun/a.mp3").unwrap();
        assert!(!m.is_running());
        assert_eq!(m.status().current_path, None);
    }

    #[test]
    fn test_rescan_picks_up_new_files() {
        let mut m = machine();
        m.devices_mut().storage.add("/dhun/c.mp3");
        assert_eq!(m.rescan(), 3);
        assert_eq!(m.status().tracks, 3);
    }

    #[test]
    fn test_status_snapshot() {
        let mut m = machine();
        m.sample_motion(true);

        let status = m.status();
        assert_eq!(status.volume, DEFAULT_VOLUME);
        assert!(status.running);
        assert_eq!(status.current_path, Some("/jay-swaminarayan.mp3"));
        assert_eq!(status.state, PlaybackState::Greeting);
        assert_eq!(status.dnd, DndSettings::default());
        assert_eq!(status.consecutive_failures, 0);
        assert_eq!(status.tracks, 2);
    }
}

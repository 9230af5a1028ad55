//! Board-agnostic core logic for the Dhunbox audio appliance
//!
//! This crate contains all playback behavior that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (media engine, storage, clock, settings, platform)
//! - Media start protocol with retries and storage recovery
//! - Motion session timing
//! - Quiet hours and hourly chime scheduling
//! - Dhun playlist scanning
//! - Playback state machine and the dashboard control surface
//! - Configuration and persisted settings types

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod config;
pub mod control;
pub mod controller;
pub mod media;
pub mod playlist;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod traits;

#[cfg(test)]
mod mock;

pub use control::{ControlError, Status};
pub use controller::{Devices, PlaybackStateMachine};
pub use state::{Event, Events, PlaybackState};

//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in dhunbox-core for the appliance's peripherals:
//!
//! - Real-time clock (DS3231 over I2C)
//! - Motion sensor (PIR on a GPIO input)
//! - Settings store (postcard record with CRC)
//! - Platform timing and restart (embassy / Cortex-M, feature-gated)

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod platform;
pub mod rtc;
pub mod sensor;
pub mod settings;

//! DS3231 real-time clock
//!
//! Battery-backed I2C RTC. Time registers are BCD; the hour register may be
//! in 12- or 24-hour mode depending on how the chip was last set. The
//! oscillator-stop flag is raised whenever the chip lost all power, in which
//! case the time is meaningless until set again.

use dhunbox_core::traits::{ClockError, TimeOfDay, WallClock};
use embedded_hal::i2c::I2c;

/// 7-bit bus address
pub const DS3231_ADDR: u8 = 0x68;

const REG_SECONDS: u8 = 0x00;
const REG_STATUS: u8 = 0x0F;

/// Oscillator stop flag (status register)
const STATUS_OSF: u8 = 0x80;

/// 12-hour mode bit (hour register)
const HOUR_12H: u8 = 0x40;
/// PM bit in 12-hour mode
const HOUR_PM: u8 = 0x20;

/// DS3231 errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ds3231Error<E> {
    /// Bus transfer failed
    I2c(E),
    /// Registers hold an impossible time
    InvalidTime,
}

/// DS3231 driver
pub struct Ds3231<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Ds3231<I2C> {
    /// Create a driver on the given bus
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Read the time registers
    pub fn read_time(&mut self) -> Result<TimeOfDay, Ds3231Error<I2C::Error>> {
        let mut raw = [0u8; 3];
        self.i2c
            .write_read(DS3231_ADDR, &[REG_SECONDS], &mut raw)
            .map_err(Ds3231Error::I2c)?;

        let time = TimeOfDay::new(
            decode_hour(raw[2]),
            bcd_to_bin(raw[1] & 0x7F),
            bcd_to_bin(raw[0] & 0x7F),
        );
        if time.is_valid() {
            Ok(time)
        } else {
            Err(Ds3231Error::InvalidTime)
        }
    }

    /// Check if the oscillator stopped since the time was last set
    pub fn lost_power(&mut self) -> Result<bool, Ds3231Error<I2C::Error>> {
        Ok(self.read_status()? & STATUS_OSF != 0)
    }

    /// Set the time (24-hour mode) and clear the oscillator-stop flag
    pub fn set_time(&mut self, time: &TimeOfDay) -> Result<(), Ds3231Error<I2C::Error>> {
        if !time.is_valid() {
            return Err(Ds3231Error::InvalidTime);
        }

        let frame = [
            REG_SECONDS,
            bin_to_bcd(time.second),
            bin_to_bcd(time.minute),
            bin_to_bcd(time.hour),
        ];
        self.i2c
            .write(DS3231_ADDR, &frame)
            .map_err(Ds3231Error::I2c)?;

        let status = self.read_status()?;
        self.i2c
            .write(DS3231_ADDR, &[REG_STATUS, status & !STATUS_OSF])
            .map_err(Ds3231Error::I2c)
    }

    fn read_status(&mut self) -> Result<u8, Ds3231Error<I2C::Error>> {
        let mut status = [0u8; 1];
        self.i2c
            .write_read(DS3231_ADDR, &[REG_STATUS], &mut status)
            .map_err(Ds3231Error::I2c)?;
        Ok(status[0])
    }
}

impl<I2C: I2c> WallClock for Ds3231<I2C> {
    fn now(&mut self) -> Result<TimeOfDay, ClockError> {
        match self.lost_power() {
            Ok(true) => return Err(ClockError::NotSet),
            Ok(false) => {}
            Err(_) => return Err(ClockError::Unavailable),
        }
        self.read_time().map_err(|e| match e {
            Ds3231Error::I2c(_) => ClockError::Unavailable,
            Ds3231Error::InvalidTime => ClockError::NotSet,
        })
    }
}

/// Decode the hour register in either mode to 0-23
fn decode_hour(raw: u8) -> u8 {
    if raw & HOUR_12H != 0 {
        let hour = bcd_to_bin(raw & 0x1F) % 12;
        if raw & HOUR_PM != 0 {
            hour + 12
        } else {
            hour
        }
    } else {
        bcd_to_bin(raw & 0x3F)
    }
}

fn bcd_to_bin(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}

fn bin_to_bcd(bin: u8) -> u8 {
    ((bin / 10) << 4) | (bin % 10)
}

//! PIR motion sensor
//!
//! Reads the sensor's digital output. A pin read error counts as no motion.

use embedded_hal::digital::InputPin;

/// PIR sensor on a GPIO input
pub struct PirSensor<P> {
    pin: P,
    /// If true, motion = pin LOW
    active_low: bool,
}

impl<P: InputPin> PirSensor<P> {
    /// Create a sensor whose output is high on motion
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }

    /// Create a sensor whose output is low on motion
    pub fn new_active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    /// Sample the sensor
    pub fn motion(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(high) => high != self.active_low,
            Err(_) => false,
        }
    }

    /// Release the pin
    pub fn release(self) -> P {
        self.pin
    }
}

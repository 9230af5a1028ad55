//! Platform services trait

/// Time base, delays and reset for the control loop
pub trait Platform {
    /// Milliseconds since boot (wrapping)
    fn now_ms(&self) -> u32;

    /// Block for the given number of milliseconds
    fn delay_ms(&mut self, ms: u32);

    /// Let other cooperative work run
    fn yield_now(&mut self) {}

    /// Reset the device
    ///
    /// Real implementations do not return.
    fn restart(&mut self);
}

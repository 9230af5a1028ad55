//! Motion sessions
//!
//! Debounced motion triggering and elapsed-time bookkeeping.

pub mod clock;

pub use clock::SessionClock;

//! Input sensors

pub mod pir;

pub use pir::PirSensor;

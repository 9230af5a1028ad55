//! Platform services for the control loop

#[cfg(feature = "embassy")]
pub mod embassy;

#[cfg(feature = "embassy")]
pub use self::embassy::EmbassyPlatform;

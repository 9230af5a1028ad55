//! Media start protocol
//!
//! Wraps the engine's connect primitive with stop-settle, retries and
//! storage recovery.

pub mod start;

pub use start::MediaStarter;

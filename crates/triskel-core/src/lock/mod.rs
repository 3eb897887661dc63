//! Time-windowed lock protocol.
//!
//! Two independent gates guard a transmission:
//!
//! - [`KeyGenerator`] derives a key that both ends can compute from the
//!   current time window and a shared salt.
//! - [`FeedbackMonitor`] listens for the 3-6-9 harmonics of the base
//!   frequency and only locks when all of them are present.

mod key;
mod monitor;

pub use key::{
    Clock, DEFAULT_ENTROPY_SALT, DEFAULT_WINDOW_SECS, FixedClock, KeyGenerator, LockKey,
    SystemClock, harmonic_seed,
};
pub use monitor::{
    DEFAULT_LOCK_THRESHOLD, FeedbackMonitor, HarmonicReading, LockReport, LockState, MonitorConfig,
};

//! Progress fan-out throttling.
//!
//! Fetchers may report progress per network chunk; subscribers usually only
//! need a handful of updates per second.

mod throttle;

pub use throttle::ProgressThrottle;

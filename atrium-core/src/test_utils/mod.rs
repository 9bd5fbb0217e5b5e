//! Fixtures for testing code built on atrium.
//!
//! Available behind the `test-utils` feature flag.

mod call_log;
mod detached_host;
mod probe;
mod recording_callback;

pub use call_log::CallLog;
pub use detached_host::{DetachedHost, detached};
pub use probe::ProbeClass;
pub use recording_callback::RecordingCallback;

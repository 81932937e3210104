//! The `normalize` module holds the stateless helpers that reshape values read
//! from a live namespace into something the emulator accepts.
//!
//! - `filter`: decides which queues and topics are exported by name.
//! - `duration`: parses ISO-8601 durations and caps them to emulator limits.
//! - `forward`: strips scheme and host from forwarding targets.

pub mod duration;
pub mod filter;
pub mod forward;

pub use duration::{MAX_DUPLICATE_DETECTION, MAX_TIME_TO_LIVE, cap_duration};
pub use filter::EntityFilter;
pub use forward::normalize_forward_reference;

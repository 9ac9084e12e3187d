//! Feedback processing and preference adjustment.

mod clock;
mod processor;

pub use clock::{Clock, SystemClock};
pub use processor::{FeedbackProcessor, ProcessingStats, DECAY_TIME_CONSTANT_MS};

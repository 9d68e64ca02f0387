#![forbid(unsafe_code)]

pub mod model;
pub mod progress;
pub mod time;

pub use progress::ProgressTracker;
pub use time::Clock;

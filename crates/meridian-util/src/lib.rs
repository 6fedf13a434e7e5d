//! Small helpers shared across the Meridian crates.

mod log_level;

pub use log_level::LogLevel;

//! Conviction Clock Infrastructure
//!
//! Time sources for the lifecycle engine:
//! - [`SystemClock`] - wall-clock time for production
//! - [`FixedClock`] - frozen, manually advanced time for deterministic tests
//!   (round boundaries and signal expiry are all time-driven)

mod fixed;
mod system;

pub use fixed::FixedClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use conviction_ports::Clock;

//! Timer interface.

use super::Result;
use core::time::Duration;

/// Monotonic stopwatch with blocking delays.
///
/// Delays always run to completion; there is no cancellation.
pub trait Timer {
    fn init(&mut self) -> Result<()>;

    fn deinit(&mut self) -> Result<()>;

    /// Record the current time as the start of a measurement.
    fn start(&mut self) -> Result<()>;

    /// Time since `start()`, or zero when no measurement is running.
    fn elapsed(&mut self) -> Result<Duration>;

    /// End the running measurement.
    fn stop(&mut self) -> Result<()>;

    /// Block for `ms` milliseconds.
    fn delay_milli(&mut self, ms: u32) -> Result<()>;

    /// Block for `us` microseconds.
    fn delay_micro(&mut self, us: u32) -> Result<()>;
}

//! Hardware abstraction layer traits.
//!
//! This module defines the three interfaces the TLE94112 driver needs from a
//! platform: digital pins ([`Gpio`]), the SPI cover ([`Spic`]) and a
//! monotonic timer with blocking delays ([`Timer`]). Backends live under
//! [`crate::pal`]; the driver is generic over these traits and never sees a
//! platform type.

pub mod gpio;
pub mod spic;
pub mod timer;

pub use gpio::{Gpio, Level, Logic, PinMode};
pub use spic::{BitOrder, SpiMode, Spic, SpicConfig};
pub use timer::Timer;

use thiserror::Error;

/// Description carried by [`Error::Interface`]: the platform's message with
/// `std`, a fixed text without it.
#[cfg(feature = "std")]
pub type Detail = String;

#[cfg(not(feature = "std"))]
pub type Detail = &'static str;

/// Result of a PAL operation.
///
/// Every PAL call either succeeds or reports that the platform interface
/// failed; there is no retry and no recovery below this boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The underlying platform call failed
    #[error("Interface error: {0}")]
    Interface(Detail),

    /// A write was attempted on a pin configured as an input
    #[error("pin {0} is configured as an input")]
    InputPin(u8),

    /// A handle was used before `init()` or after `deinit()`
    #[error("{0} used while not initialized")]
    NotInitialized(&'static str),
}

#[cfg(feature = "std")]
impl Error {
    /// Wrap a platform error as an interface error.
    pub fn interface(e: impl core::fmt::Display) -> Self {
        Error::Interface(e.to_string())
    }
}

/// Convenience type alias for PAL results.
pub type Result<T> = core::result::Result<T, Error>;

//! Platform implementations of the [`hw_trait`](crate::hw_trait) interfaces.
//!
//! - [`ehal`]: microcontroller families (Arduino, WICED) through
//!   `embedded-hal` 1.0; builds without `std`
//! - [`rpi`]: Raspberry Pi through `rppal` (feature `rpi`, Linux only)
//! - [`host`]: timer for hosted targets
//! - [`sim`]: simulated platform for host builds and tests

pub mod ehal;
#[cfg(feature = "std")]
pub mod host;
#[cfg(feature = "std")]
pub mod sim;

#[cfg(all(feature = "rpi", target_os = "linux"))]
pub mod rpi;

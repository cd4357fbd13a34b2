//! Platform abstraction layer for the Infineon TLE94112 12-channel
//! half-bridge motor driver.
//!
//! [`hw_trait`] defines the GPIO, SPI cover and timer interfaces the driver
//! needs, [`pal`] implements them per platform, and [`tle94112`] is the
//! register-level driver built on top.
//!
//! With the default `std` feature off the crate is `no_std` and does not
//! allocate, so the driver and the `embedded-hal` backend build for
//! microcontroller targets.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod board;
#[cfg(feature = "std")]
pub mod config;
#[cfg(feature = "std")]
pub mod error;
pub mod framework;
pub mod hw_trait;
pub mod pal;
pub mod tle94112;
pub mod tracing;

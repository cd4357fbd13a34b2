//! SPI cover interface.
//!
//! The SPI cover is the channel over which the driver talks to the chip. It
//! moves one byte at a time; chip select is framed by the driver through a
//! [`Gpio`](super::Gpio) handle so that a multi-byte frame stays inside a
//! single chip-select window.

use super::Result;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// SPI mode (clock polarity and phase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum SpiMode {
    /// CPOL=0, CPHA=0
    Mode0,
    /// CPOL=0, CPHA=1
    Mode1,
    /// CPOL=1, CPHA=0
    Mode2,
    /// CPOL=1, CPHA=1
    Mode3,
}

/// Order in which bits are shifted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// Configuration of one SPI channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpicConfig {
    /// Platform port (bus) number
    pub port: u8,
    /// Chip-select pin of the device on this channel
    pub cs_pin: u8,
    /// Bus clock in Hz
    pub clock_hz: u32,
    pub mode: SpiMode,
    pub bit_order: BitOrder,
}

impl SpicConfig {
    /// Bus settings the TLE94112 expects: 1 MHz, mode 1, LSB first.
    pub fn tle94112(port: u8, cs_pin: u8) -> Self {
        Self {
            port,
            cs_pin,
            clock_hz: 1_000_000,
            mode: SpiMode::Mode1,
            bit_order: BitOrder::LsbFirst,
        }
    }
}

/// One SPI channel owned by one driver.
pub trait Spic {
    /// Configure the port and chip-select pin.
    fn init(&mut self) -> Result<()>;

    /// Release the port.
    fn deinit(&mut self) -> Result<()>;

    /// Exchange one byte full-duplex and return the byte clocked in.
    fn transfer(&mut self, send: u8) -> Result<u8>;

    /// Channel configuration.
    fn config(&self) -> &SpicConfig;
}

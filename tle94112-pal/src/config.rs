//! Configuration for tle94112-pal.
//!
//! Board wiring, SPI settings and timing are loaded from a TOML file.
//! Anything missing falls back to the reference board of the framework
//! named in the file (or the one this build targets).
//!
//! ```toml
//! framework = "raspberry-pi"
//!
//! [board]
//! cs_pin = 8
//! en_pin = 25
//!
//! [spi]
//! clock_hz = 500000
//! ```

use crate::board::BoardPins;
use crate::error::{Error, Result};
use crate::framework::Framework;
use crate::hw_trait::{BitOrder, Logic, SpiMode, SpicConfig};
use crate::tle94112::registers::CS_RISE_TIME_MS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Platform family the wiring belongs to
    pub framework: Framework,

    pub board: BoardConfig,

    pub spi: SpiConfig,

    pub timing: TimingConfig,
}

/// Chip-select and enable wiring.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BoardConfig {
    pub cs_pin: u8,

    pub en_pin: u8,

    /// Chip select is active low on every reference board
    #[serde(default = "negative")]
    pub cs_logic: Logic,

    #[serde(default)]
    pub en_logic: Logic,
}

/// SPI channel settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpiConfig {
    pub port: u8,

    pub clock_hz: u32,

    pub mode: SpiMode,

    pub bit_order: BitOrder,
}

/// Timing parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimingConfig {
    /// Delay after each SPI frame (ms)
    pub cs_rise_time_ms: u32,
}

fn negative() -> Logic {
    Logic::Negative
}

// Mirror of Config with every field optional, used to layer a file on top
// of the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    framework: Option<Framework>,
    #[serde(default)]
    board: PartialBoard,
    #[serde(default)]
    spi: PartialSpi,
    #[serde(default)]
    timing: PartialTiming,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialBoard {
    cs_pin: Option<u8>,
    en_pin: Option<u8>,
    cs_logic: Option<Logic>,
    en_logic: Option<Logic>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialSpi {
    port: Option<u8>,
    clock_hz: Option<u32>,
    mode: Option<SpiMode>,
    bit_order: Option<BitOrder>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialTiming {
    cs_rise_time_ms: Option<u32>,
}

impl Config {
    /// Reference board defaults for `framework`, first TLE94112 shield.
    pub fn default_for(framework: Framework) -> Self {
        let pins = BoardPins::for_framework(framework);
        let spi = SpicConfig::tle94112(pins.spi_port, pins.cs1);
        Self {
            framework,
            board: BoardConfig {
                cs_pin: pins.cs1,
                en_pin: pins.en,
                cs_logic: Logic::Negative,
                en_logic: Logic::Positive,
            },
            spi: SpiConfig {
                port: spi.port,
                clock_hz: spi.clock_hz,
                mode: spi.mode,
                bit_order: spi.bit_order,
            },
            timing: TimingConfig {
                cs_rise_time_ms: CS_RISE_TIME_MS,
            },
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Parse configuration, filling gaps from the reference board.
    pub fn from_toml(text: &str) -> Result<Self> {
        let partial: PartialConfig = toml::from_str(text)?;
        let framework = partial.framework.unwrap_or(Framework::ACTIVE);
        let mut config = Self::default_for(framework);

        let b = partial.board;
        config.board.cs_pin = b.cs_pin.unwrap_or(config.board.cs_pin);
        config.board.en_pin = b.en_pin.unwrap_or(config.board.en_pin);
        config.board.cs_logic = b.cs_logic.unwrap_or(config.board.cs_logic);
        config.board.en_logic = b.en_logic.unwrap_or(config.board.en_logic);

        let s = partial.spi;
        config.spi.port = s.port.unwrap_or(config.spi.port);
        config.spi.clock_hz = s.clock_hz.unwrap_or(config.spi.clock_hz);
        config.spi.mode = s.mode.unwrap_or(config.spi.mode);
        config.spi.bit_order = s.bit_order.unwrap_or(config.spi.bit_order);

        config.timing.cs_rise_time_ms = partial
            .timing
            .cs_rise_time_ms
            .unwrap_or(config.timing.cs_rise_time_ms);

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.board.cs_pin == self.board.en_pin {
            return Err(Error::Config(format!(
                "chip select and enable share pin {}",
                self.board.cs_pin
            )));
        }
        if self.spi.clock_hz == 0 {
            return Err(Error::Config("SPI clock must be non-zero".into()));
        }
        Ok(())
    }

    /// SPI channel configuration for the PAL.
    pub fn spic_config(&self) -> SpicConfig {
        SpicConfig {
            port: self.spi.port,
            cs_pin: self.board.cs_pin,
            clock_hz: self.spi.clock_hz,
            mode: self.spi.mode,
            bit_order: self.spi.bit_order,
        }
    }
}

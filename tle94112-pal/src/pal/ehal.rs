//! Microcontroller backend over the `embedded-hal` 1.0 traits.
//!
//! This is how the Arduino and WICED board families plug in: their Rust
//! HALs hand out pins implementing `OutputPin`/`InputPin`, an SPI peripheral
//! implementing `SpiBus` and a `DelayNs` provider. Pin direction, SPI mode
//! and bit order are fixed when the HAL constructs those types, so `init()`
//! here has nothing left that can fail.
//!
//! Builds without `std`; interface errors then carry a fixed description of
//! the HAL error kind instead of a formatted message.

use crate::hw_trait::{Error, Gpio, Level, Logic, Result, Spic, SpicConfig, Timer};
use crate::tracing::prelude::*;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin, StatefulOutputPin};
use embedded_hal::spi::{self, SpiBus};
use core::time::Duration;

#[cfg(feature = "std")]
fn pin_error(pin: u8, e: impl digital::Error) -> Error {
    Error::Interface(format!("pin {}: {:?}", pin, e.kind()))
}

#[cfg(not(feature = "std"))]
fn pin_error(_pin: u8, _e: impl digital::Error) -> Error {
    Error::Interface("GPIO failure")
}

#[cfg(feature = "std")]
fn spi_error(port: u8, e: impl spi::Error) -> Error {
    Error::Interface(format!("SPI port {}: {:?}", port, e.kind()))
}

#[cfg(not(feature = "std"))]
fn spi_error(_port: u8, e: impl spi::Error) -> Error {
    Error::Interface(match e.kind() {
        spi::ErrorKind::Overrun => "SPI overrun",
        spi::ErrorKind::ModeFault => "SPI mode fault",
        spi::ErrorKind::FrameFormat => "SPI frame format error",
        spi::ErrorKind::ChipSelectFault => "SPI chip select fault",
        _ => "SPI failure",
    })
}

/// Output pin.
pub struct EhalGpio<P> {
    pin: P,
    number: u8,
    logic: Logic,
    initialized: bool,
}

impl<P: StatefulOutputPin> EhalGpio<P> {
    pub fn new(pin: P, number: u8, logic: Logic) -> Self {
        Self {
            pin,
            number,
            logic,
            initialized: false,
        }
    }

    /// Give the HAL pin back.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: StatefulOutputPin> Gpio for EhalGpio<P> {
    fn init(&mut self) -> Result<()> {
        debug!(pin = self.number, logic = %self.logic, "GPIO output initialized");
        self.initialized = true;
        Ok(())
    }

    fn deinit(&mut self) -> Result<()> {
        self.initialized = false;
        Ok(())
    }

    fn read(&mut self) -> Result<Level> {
        if !self.initialized {
            return Err(Error::NotInitialized("GPIO"));
        }
        self.pin
            .is_set_high()
            .map(Level::from)
            .map_err(|e| pin_error(self.number, e))
    }

    fn write(&mut self, level: Level) -> Result<()> {
        if !self.initialized {
            return Err(Error::NotInitialized("GPIO"));
        }
        let result = match level {
            Level::High => self.pin.set_high(),
            Level::Low => self.pin.set_low(),
        };
        result.map_err(|e| pin_error(self.number, e))
    }

    fn logic(&self) -> Logic {
        self.logic
    }
}

/// Input pin. Writes are rejected.
pub struct EhalInput<P> {
    pin: P,
    number: u8,
    logic: Logic,
    initialized: bool,
}

impl<P: InputPin> EhalInput<P> {
    pub fn new(pin: P, number: u8, logic: Logic) -> Self {
        Self {
            pin,
            number,
            logic,
            initialized: false,
        }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> Gpio for EhalInput<P> {
    fn init(&mut self) -> Result<()> {
        debug!(pin = self.number, "GPIO input initialized");
        self.initialized = true;
        Ok(())
    }

    fn deinit(&mut self) -> Result<()> {
        self.initialized = false;
        Ok(())
    }

    fn read(&mut self) -> Result<Level> {
        if !self.initialized {
            return Err(Error::NotInitialized("GPIO"));
        }
        self.pin
            .is_high()
            .map(Level::from)
            .map_err(|e| pin_error(self.number, e))
    }

    fn write(&mut self, _level: Level) -> Result<()> {
        Err(Error::InputPin(self.number))
    }

    fn logic(&self) -> Logic {
        self.logic
    }
}

/// SPI cover over an exclusive `SpiBus`.
///
/// The bus must already be configured with the clock, mode and bit order in
/// `config`; chip select stays with the driver.
pub struct EhalSpic<B> {
    bus: B,
    config: SpicConfig,
    send_buffer: [u8; 2],
    receive_buffer: [u8; 2],
    initialized: bool,
}

impl<B: SpiBus> EhalSpic<B> {
    pub fn new(bus: B, config: SpicConfig) -> Self {
        Self {
            bus,
            config,
            send_buffer: [0; 2],
            receive_buffer: [0; 2],
            initialized: false,
        }
    }

    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: SpiBus> Spic for EhalSpic<B> {
    fn init(&mut self) -> Result<()> {
        debug!(
            port = self.config.port,
            cs = self.config.cs_pin,
            clock_hz = self.config.clock_hz,
            mode = %self.config.mode,
            "SPI initialized"
        );
        self.initialized = true;
        Ok(())
    }

    fn deinit(&mut self) -> Result<()> {
        if self.initialized {
            self.bus
                .flush()
                .map_err(|e| spi_error(self.config.port, e))?;
        }
        self.initialized = false;
        Ok(())
    }

    fn transfer(&mut self, send: u8) -> Result<u8> {
        if !self.initialized {
            return Err(Error::NotInitialized("SPI"));
        }
        let port = self.config.port;
        self.send_buffer[0] = send;
        self.bus
            .transfer(&mut self.receive_buffer[..1], &self.send_buffer[..1])
            .map_err(|e| spi_error(port, e))?;
        self.bus.flush().map_err(|e| spi_error(port, e))?;
        trace!("SPI {:02X} -> {:02X}", send, self.receive_buffer[0]);
        Ok(self.receive_buffer[0])
    }

    fn config(&self) -> &SpicConfig {
        &self.config
    }
}

/// Timer over a `DelayNs` provider and a wrapping millisecond counter, such
/// as Arduino's `millis()`.
pub struct EhalTimer<D, C> {
    delay: D,
    millis: C,
    started_at: Option<u32>,
    initialized: bool,
}

impl<D: DelayNs, C: FnMut() -> u32> EhalTimer<D, C> {
    pub fn new(delay: D, millis: C) -> Self {
        Self {
            delay,
            millis,
            started_at: None,
            initialized: false,
        }
    }
}

impl<D: DelayNs, C: FnMut() -> u32> Timer for EhalTimer<D, C> {
    fn init(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn deinit(&mut self) -> Result<()> {
        self.started_at = None;
        self.initialized = false;
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if !self.initialized {
            return Err(Error::NotInitialized("timer"));
        }
        self.started_at = Some((self.millis)());
        Ok(())
    }

    fn elapsed(&mut self) -> Result<Duration> {
        let Some(start) = self.started_at else {
            return Ok(Duration::ZERO);
        };
        let now = (self.millis)();
        Ok(Duration::from_millis(now.wrapping_sub(start).into()))
    }

    fn stop(&mut self) -> Result<()> {
        self.started_at = None;
        Ok(())
    }

    fn delay_milli(&mut self, ms: u32) -> Result<()> {
        if !self.initialized {
            return Err(Error::NotInitialized("timer"));
        }
        self.delay.delay_ms(ms);
        Ok(())
    }

    fn delay_micro(&mut self, us: u32) -> Result<()> {
        if !self.initialized {
            return Err(Error::NotInitialized("timer"));
        }
        self.delay.delay_us(us);
        Ok(())
    }
}

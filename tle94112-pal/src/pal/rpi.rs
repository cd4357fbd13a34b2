//! Raspberry Pi backend over `rppal`.
//!
//! Pins are addressed by BCM number. The SPI port maps to `/dev/spidevN.M`;
//! the hardware chip-select line of the port is not used for framing, since
//! the driver drives chip select as a plain GPIO across each 16-bit frame.

use crate::hw_trait::{
    BitOrder, Error, Gpio, Level, Logic, PinMode, Result, SpiMode, Spic, SpicConfig,
};
use crate::tracing::prelude::*;
use rppal::gpio::{self, Bias, IoPin, Mode};
use rppal::spi::{self, Bus, SlaveSelect, Spi};

/// GPIO pin on the Raspberry Pi header.
pub struct RpiGpio {
    number: u8,
    mode: PinMode,
    logic: Logic,
    pin: Option<IoPin>,
}

impl RpiGpio {
    pub fn new(number: u8, mode: PinMode, logic: Logic) -> Self {
        Self {
            number,
            mode,
            logic,
            pin: None,
        }
    }

    fn pin(&mut self) -> Result<&mut IoPin> {
        self.pin.as_mut().ok_or(Error::NotInitialized("GPIO"))
    }
}

impl Gpio for RpiGpio {
    fn init(&mut self) -> Result<()> {
        let pin = gpio::Gpio::new()
            .and_then(|g| g.get(self.number))
            .map_err(Error::interface)?;

        let mut pin = match self.mode {
            PinMode::Output => pin.into_io(Mode::Output),
            _ => pin.into_io(Mode::Input),
        };
        match self.mode {
            PinMode::InputPullUp => pin.set_bias(Bias::PullUp),
            PinMode::InputPullDown => pin.set_bias(Bias::PullDown),
            _ => {}
        }

        debug!(pin = self.number, mode = %self.mode, "GPIO initialized");
        self.pin = Some(pin);
        Ok(())
    }

    fn deinit(&mut self) -> Result<()> {
        // Dropping the pin restores its previous mode.
        self.pin = None;
        Ok(())
    }

    fn read(&mut self) -> Result<Level> {
        let level = self.pin()?.read();
        Ok(Level::from(level == gpio::Level::High))
    }

    fn write(&mut self, level: Level) -> Result<()> {
        if !self.mode.is_output() {
            return Err(Error::InputPin(self.number));
        }
        let pin = self.pin()?;
        match level {
            Level::High => pin.set_high(),
            Level::Low => pin.set_low(),
        }
        Ok(())
    }

    fn logic(&self) -> Logic {
        self.logic
    }
}

/// SPI channel on `/dev/spidev`.
pub struct RpiSpic {
    config: SpicConfig,
    spi: Option<Spi>,
    send_buffer: [u8; 2],
    receive_buffer: [u8; 2],
}

impl RpiSpic {
    pub fn new(config: SpicConfig) -> Self {
        Self {
            config,
            spi: None,
            send_buffer: [0; 2],
            receive_buffer: [0; 2],
        }
    }
}

fn bus(port: u8) -> Result<Bus> {
    Ok(match port {
        0 => Bus::Spi0,
        1 => Bus::Spi1,
        2 => Bus::Spi2,
        3 => Bus::Spi3,
        4 => Bus::Spi4,
        5 => Bus::Spi5,
        6 => Bus::Spi6,
        _ => return Err(Error::Interface(format!("no SPI bus {}", port))),
    })
}

// CE1 sits on BCM 7; everything else opens CE0.
fn slave_select(cs_pin: u8) -> SlaveSelect {
    match cs_pin {
        7 => SlaveSelect::Ss1,
        _ => SlaveSelect::Ss0,
    }
}

// The BCM283x SPI block only shifts MSB first, so LSB-first bytes are
// mirrored on the way out and on the way in.
fn to_wire(order: BitOrder, byte: u8) -> u8 {
    match order {
        BitOrder::MsbFirst => byte,
        BitOrder::LsbFirst => byte.reverse_bits(),
    }
}

fn mode(mode: SpiMode) -> spi::Mode {
    match mode {
        SpiMode::Mode0 => spi::Mode::Mode0,
        SpiMode::Mode1 => spi::Mode::Mode1,
        SpiMode::Mode2 => spi::Mode::Mode2,
        SpiMode::Mode3 => spi::Mode::Mode3,
    }
}

impl Spic for RpiSpic {
    fn init(&mut self) -> Result<()> {
        let spi = Spi::new(
            bus(self.config.port)?,
            slave_select(self.config.cs_pin),
            self.config.clock_hz,
            mode(self.config.mode),
        )
        .map_err(Error::interface)?;
        debug!(
            port = self.config.port,
            cs = self.config.cs_pin,
            clock_hz = self.config.clock_hz,
            "SPI initialized"
        );
        self.spi = Some(spi);
        Ok(())
    }

    fn deinit(&mut self) -> Result<()> {
        self.spi = None;
        Ok(())
    }

    fn transfer(&mut self, send: u8) -> Result<u8> {
        let order = self.config.bit_order;
        let spi = self.spi.as_mut().ok_or(Error::NotInitialized("SPI"))?;

        self.send_buffer[0] = to_wire(order, send);
        spi.transfer(&mut self.receive_buffer[..1], &self.send_buffer[..1])
            .map_err(Error::interface)?;
        let received = to_wire(order, self.receive_buffer[0]);

        trace!("SPI {:02X} -> {:02X}", send, received);
        Ok(received)
    }

    fn config(&self) -> &SpicConfig {
        &self.config
    }
}

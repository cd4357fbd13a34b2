//! Simulated platform for host builds and tests.
//!
//! Pins are loopback registers, the SPI port answers with scripted bytes
//! (0x00 once the script runs dry) and time is a virtual clock that only
//! advances on delays. Every handle created from one [`SimPlatform`] appends
//! to the same event log, so the order of pin writes, byte transfers and
//! delays across handles can be checked afterwards.

use crate::hw_trait::{Error, Gpio, Level, Logic, PinMode, Result, Spic, SpicConfig, Timer};
use crate::tracing::prelude::*;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// Something a simulated handle did to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    PinMode { pin: u8, mode: PinMode },
    PinWrite { pin: u8, level: Level },
    PinRelease { pin: u8 },
    SpiOpen { port: u8, cs_pin: u8 },
    SpiClose { port: u8 },
    Transfer { port: u8, sent: u8, received: u8 },
    Delay(Duration),
}

#[derive(Debug, Default)]
struct SimState {
    setup_fails: bool,
    spi_setup_fails: bool,
    levels: HashMap<u8, Level>,
    responses: VecDeque<u8>,
    clock: Duration,
    events: Vec<SimEvent>,
}

/// Factory and inspection point for simulated handles.
#[derive(Debug, Clone, Default)]
pub struct SimPlatform {
    state: Arc<Mutex<SimState>>,
}

impl SimPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `init()` fail as if platform setup failed.
    pub fn fail_setup(&self, fail: bool) {
        self.state.lock().setup_fails = fail;
    }

    /// Make only SPI `init()` fail, so that bring-up fails partway.
    pub fn fail_spi_setup(&self, fail: bool) {
        self.state.lock().spi_setup_fails = fail;
    }

    pub fn gpio(&self, pin: u8, mode: PinMode, logic: Logic) -> SimGpio {
        SimGpio {
            platform: self.clone(),
            pin,
            mode,
            logic,
            initialized: false,
        }
    }

    pub fn spic(&self, config: SpicConfig) -> SimSpic {
        SimSpic {
            platform: self.clone(),
            config,
            initialized: false,
        }
    }

    pub fn timer(&self) -> SimTimer {
        SimTimer {
            platform: self.clone(),
            started_at: None,
            initialized: false,
        }
    }

    /// Queue bytes the SPI port clocks in on the next transfers.
    pub fn queue_response(&self, bytes: &[u8]) {
        self.state.lock().responses.extend(bytes.iter().copied());
    }

    /// Drive an input pin from outside.
    pub fn set_level(&self, pin: u8, level: Level) {
        self.state.lock().levels.insert(pin, level);
    }

    /// Current level of a pin; unconfigured pins read low.
    pub fn level(&self, pin: u8) -> Level {
        self.state.lock().levels.get(&pin).copied().unwrap_or(Level::Low)
    }

    /// Virtual time since the platform was created.
    pub fn now(&self) -> Duration {
        self.state.lock().clock
    }

    pub fn events(&self) -> Vec<SimEvent> {
        self.state.lock().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    /// `(sent, received)` pairs of every byte transfer so far.
    pub fn transfers(&self) -> Vec<(u8, u8)> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                SimEvent::Transfer { sent, received, .. } => Some((*sent, *received)),
                _ => None,
            })
            .collect()
    }

    fn setup(&self) -> Result<()> {
        if self.state.lock().setup_fails {
            return Err(Error::Interface("platform setup failed".into()));
        }
        Ok(())
    }

    fn record(&self, event: SimEvent) {
        self.state.lock().events.push(event);
    }
}

/// Loopback pin.
#[derive(Debug)]
pub struct SimGpio {
    platform: SimPlatform,
    pin: u8,
    mode: PinMode,
    logic: Logic,
    initialized: bool,
}

impl SimGpio {
    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl Gpio for SimGpio {
    fn init(&mut self) -> Result<()> {
        self.platform.setup()?;
        debug!(pin = self.pin, mode = %self.mode, "Simulated GPIO initialized");
        self.platform.record(SimEvent::PinMode {
            pin: self.pin,
            mode: self.mode,
        });
        let idle = match self.mode {
            PinMode::InputPullUp => Some(Level::High),
            PinMode::InputPullDown => Some(Level::Low),
            _ => None,
        };
        if let Some(level) = idle {
            self.platform.set_level(self.pin, level);
        }
        self.initialized = true;
        Ok(())
    }

    fn deinit(&mut self) -> Result<()> {
        if self.initialized {
            self.platform.record(SimEvent::PinRelease { pin: self.pin });
        }
        self.initialized = false;
        Ok(())
    }

    fn read(&mut self) -> Result<Level> {
        if !self.initialized {
            return Err(Error::NotInitialized("GPIO"));
        }
        Ok(self.platform.level(self.pin))
    }

    fn write(&mut self, level: Level) -> Result<()> {
        if !self.initialized {
            return Err(Error::NotInitialized("GPIO"));
        }
        if !self.mode.is_output() {
            return Err(Error::InputPin(self.pin));
        }
        self.platform.set_level(self.pin, level);
        self.platform.record(SimEvent::PinWrite {
            pin: self.pin,
            level,
        });
        Ok(())
    }

    fn logic(&self) -> Logic {
        self.logic
    }
}

/// SPI port answering with scripted bytes.
#[derive(Debug)]
pub struct SimSpic {
    platform: SimPlatform,
    config: SpicConfig,
    initialized: bool,
}

impl Spic for SimSpic {
    fn init(&mut self) -> Result<()> {
        self.platform.setup()?;
        if self.platform.state.lock().spi_setup_fails {
            return Err(Error::Interface("SPI port unavailable".into()));
        }
        debug!(port = self.config.port, cs = self.config.cs_pin, "Simulated SPI initialized");
        self.platform.record(SimEvent::SpiOpen {
            port: self.config.port,
            cs_pin: self.config.cs_pin,
        });
        self.initialized = true;
        Ok(())
    }

    fn deinit(&mut self) -> Result<()> {
        if self.initialized {
            self.platform.record(SimEvent::SpiClose {
                port: self.config.port,
            });
        }
        self.initialized = false;
        Ok(())
    }

    fn transfer(&mut self, send: u8) -> Result<u8> {
        if !self.initialized {
            return Err(Error::NotInitialized("SPI"));
        }
        let mut state = self.platform.state.lock();
        let received = state.responses.pop_front().unwrap_or(0x00);
        state.events.push(SimEvent::Transfer {
            port: self.config.port,
            sent: send,
            received,
        });
        trace!("SPI {:02X} -> {:02X}", send, received);
        Ok(received)
    }

    fn config(&self) -> &SpicConfig {
        &self.config
    }
}

/// Timer over the platform's virtual clock.
#[derive(Debug)]
pub struct SimTimer {
    platform: SimPlatform,
    started_at: Option<Duration>,
    initialized: bool,
}

impl SimTimer {
    fn advance(&mut self, by: Duration) -> Result<()> {
        if !self.initialized {
            return Err(Error::NotInitialized("timer"));
        }
        let mut state = self.platform.state.lock();
        state.clock += by;
        state.events.push(SimEvent::Delay(by));
        Ok(())
    }
}

impl Timer for SimTimer {
    fn init(&mut self) -> Result<()> {
        self.platform.setup()?;
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
        self.started_at = Some(self.platform.now());
        Ok(())
    }

    fn elapsed(&mut self) -> Result<Duration> {
        Ok(self
            .started_at
            .map(|t| self.platform.now() - t)
            .unwrap_or(Duration::ZERO))
    }

    fn stop(&mut self) -> Result<()> {
        self.started_at = None;
        Ok(())
    }

    fn delay_milli(&mut self, ms: u32) -> Result<()> {
        self.advance(Duration::from_millis(ms.into()))
    }

    fn delay_micro(&mut self, us: u32) -> Result<()> {
        self.advance(Duration::from_micros(us.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Logic::Positive, Level::High, Level::Low ; "positive logic")]
    #[test_case(Logic::Negative, Level::Low, Level::High ; "negative logic")]
    fn enable_disable_follow_polarity(logic: Logic, on: Level, off: Level) {
        let platform = SimPlatform::new();
        let mut gpio = platform.gpio(8, PinMode::Output, logic);
        gpio.init().unwrap();

        gpio.enable().unwrap();
        assert_eq!(platform.level(8), on);
        gpio.disable().unwrap();
        assert_eq!(platform.level(8), off);
    }

    #[test_case(Level::High)]
    #[test_case(Level::Low)]
    fn read_returns_written_level(level: Level) {
        let platform = SimPlatform::new();
        let mut gpio = platform.gpio(3, PinMode::Output, Logic::Positive);
        gpio.init().unwrap();

        gpio.write(level).unwrap();
        assert_eq!(gpio.read().unwrap(), level);
    }

    #[test]
    fn failed_setup_touches_no_pin() {
        let platform = SimPlatform::new();
        platform.fail_setup(true);
        let mut gpio = platform.gpio(10, PinMode::Output, Logic::Positive);

        assert!(matches!(gpio.init(), Err(Error::Interface(_))));
        assert!(gpio.write(Level::High).is_err());
        assert!(platform.events().is_empty());
    }

    #[test]
    fn input_pin_rejects_write() {
        let platform = SimPlatform::new();
        let mut gpio = platform.gpio(4, PinMode::InputPullUp, Logic::Positive);
        gpio.init().unwrap();

        assert_eq!(gpio.read().unwrap(), Level::High);
        platform.set_level(4, Level::Low);
        assert_eq!(gpio.read().unwrap(), Level::Low);
        assert_eq!(gpio.write(Level::High), Err(Error::InputPin(4)));
    }

    #[test]
    fn transfer_consumes_scripted_responses() {
        let platform = SimPlatform::new();
        let mut spic = platform.spic(SpicConfig::tle94112(0, 10));
        assert_eq!(spic.transfer(0x01), Err(Error::NotInitialized("SPI")));

        spic.init().unwrap();
        platform.queue_response(&[0xAB]);
        assert_eq!(spic.transfer(0x01).unwrap(), 0xAB);
        assert_eq!(spic.transfer(0x02).unwrap(), 0x00);
        assert_eq!(platform.transfers(), vec![(0x01, 0xAB), (0x02, 0x00)]);

        spic.deinit().unwrap();
        assert_eq!(platform.events().last(), Some(&SimEvent::SpiClose { port: 0 }));
    }

    #[test]
    fn elapsed_tracks_virtual_delays() {
        let platform = SimPlatform::new();
        let mut timer = platform.timer();
        timer.init().unwrap();

        timer.start().unwrap();
        assert_eq!(timer.elapsed().unwrap(), Duration::ZERO);

        timer.delay_milli(5).unwrap();
        timer.delay_micro(250).unwrap();
        assert_eq!(timer.elapsed().unwrap(), Duration::from_micros(5_250));

        timer.stop().unwrap();
        assert_eq!(timer.elapsed().unwrap(), Duration::ZERO);
    }
}

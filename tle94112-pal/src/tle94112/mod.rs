//! TLE94112 register access.
//!
//! The driver owns its PAL handles: one SPI cover, a chip-select pin
//! (negative logic, so `enable()` pulls it low), an enable pin and a timer
//! for the chip-select rise time. Every register access is one 16-bit frame
//! inside a single chip-select window.

pub mod registers;

use crate::hw_trait::{Gpio, Result, Spic, Timer};
use crate::tracing::prelude::*;
use strum::{EnumCount, IntoEnumIterator};

pub use registers::{commands, CtrlReg, DiagFlags, StatusReg};

/// TLE94112 driver
pub struct Tle94112<S, CS, EN, T> {
    spic: S,
    cs: CS,
    en: EN,
    timer: T,
    cs_rise_time_ms: u32,
    ctrl_shadow: [u8; CtrlReg::COUNT],
}

impl<S: Spic, CS: Gpio, EN: Gpio, T: Timer> Tle94112<S, CS, EN, T> {
    pub fn new(spic: S, cs: CS, en: EN, timer: T) -> Self {
        Self {
            spic,
            cs,
            en,
            timer,
            cs_rise_time_ms: registers::CS_RISE_TIME_MS,
            ctrl_shadow: [0; CtrlReg::COUNT],
        }
    }

    /// Override the delay after each frame.
    pub fn with_cs_rise_time(mut self, ms: u32) -> Self {
        self.cs_rise_time_ms = ms;
        self
    }

    /// Bring up the interfaces, enable the chip and reset its registers.
    pub fn begin(&mut self) -> Result<()> {
        self.init_interfaces()?;
        self.reset_registers()
    }

    /// Initialize every PAL handle, park chip select and enable the chip.
    ///
    /// Stops at the first handle that fails and releases the ones already
    /// initialized; nothing is driven after that.
    pub fn init_interfaces(&mut self) -> Result<()> {
        let config = self.spic.config();
        debug!(
            port = config.port,
            cs = config.cs_pin,
            "Initializing TLE94112 interfaces"
        );
        if let Err(e) = self.bring_up() {
            warn!("TLE94112 bring-up failed: {}", e);
            // deinit() of a handle that never came up is a no-op
            let _ = self.release_interfaces();
            return Err(e);
        }
        Ok(())
    }

    fn bring_up(&mut self) -> Result<()> {
        self.en.init()?;
        self.cs.init()?;
        self.timer.init()?;
        self.spic.init()?;

        self.cs.disable()?;
        self.en.enable()?;
        Ok(())
    }

    /// Zero every control register and clear the diagnosis registers.
    pub fn reset_registers(&mut self) -> Result<()> {
        for reg in CtrlReg::iter() {
            self.write_reg(reg, 0xFF, 0, 0x00)?;
        }
        self.clear_errors()?;
        debug!("TLE94112 registers reset");
        Ok(())
    }

    /// Disable the chip and release the interfaces.
    ///
    /// Every handle is released even when an earlier step fails; the first
    /// error is returned.
    pub fn end(&mut self) -> Result<()> {
        let disabled = self.en.disable();
        let released = self.release_interfaces();
        disabled.and(released)?;
        debug!("TLE94112 interfaces released");
        Ok(())
    }

    fn release_interfaces(&mut self) -> Result<()> {
        let results = [
            self.spic.deinit(),
            self.timer.deinit(),
            self.cs.deinit(),
            self.en.deinit(),
        ];
        results.into_iter().collect()
    }

    /// Write `data` into the bits of `reg` selected by `mask`, shifted left
    /// by `shift`. Bits outside `mask` keep their last written value.
    pub fn write_reg(&mut self, reg: CtrlReg, mask: u8, shift: u8, data: u8) -> Result<()> {
        let shifted = data.checked_shl(shift.into()).unwrap_or(0);
        let value = (self.ctrl_shadow[reg.index()] & !mask) | (shifted & mask);

        trace!("Writing {} = 0x{:02X}", reg, value);
        self.frame(reg.address() | commands::WRITE, value)?;
        self.ctrl_shadow[reg.index()] = value;
        Ok(())
    }

    /// Read a control register back from the chip.
    pub fn read_reg(&mut self, reg: CtrlReg, mask: u8, shift: u8) -> Result<u8> {
        let received = self.frame(reg.address(), registers::READ_DUMMY)?;
        Ok(extract(received, mask, shift))
    }

    /// Last value written to `reg`.
    pub fn shadow(&self, reg: CtrlReg) -> u8 {
        self.ctrl_shadow[reg.index()]
    }

    /// Load the shadow of `reg` from the chip, so that a masked write keeps
    /// bits set before this driver took over.
    pub fn sync_shadow(&mut self, reg: CtrlReg) -> Result<u8> {
        let value = self.read_reg(reg, 0xFF, 0)?;
        self.ctrl_shadow[reg.index()] = value;
        trace!("Synced {} = 0x{:02X}", reg, value);
        Ok(value)
    }

    /// Read a whole status register.
    pub fn read_status_reg(&mut self, reg: StatusReg) -> Result<u8> {
        self.read_status_reg_masked(reg, 0xFF, 0)
    }

    /// Read the field of a status register selected by `mask`, shifted
    /// down by `shift`.
    pub fn read_status_reg_masked(&mut self, reg: StatusReg, mask: u8, shift: u8) -> Result<u8> {
        let received = self.frame(reg.address(), registers::READ_DUMMY)?;
        trace!("Read {} = 0x{:02X}", reg, received);
        Ok(extract(received, mask, shift))
    }

    pub fn clear_status_reg(&mut self, reg: StatusReg) -> Result<()> {
        trace!("Clearing {}", reg);
        self.frame(reg.address() | commands::CLEAR, 0x00)?;
        Ok(())
    }

    /// Global diagnosis from SYS_DIAG1.
    pub fn sys_diagnosis(&mut self) -> Result<DiagFlags> {
        let raw = self.read_status_reg(StatusReg::SysDiag1)?;
        Ok(DiagFlags::from_sys_diag1(raw))
    }

    /// Clear SYS_DIAG1 and the half-bridge overcurrent and open-load
    /// registers.
    pub fn clear_errors(&mut self) -> Result<()> {
        for reg in StatusReg::DIAGNOSIS {
            self.clear_status_reg(reg)?;
        }
        Ok(())
    }

    /// Hand the PAL handles back.
    pub fn release(self) -> (S, CS, EN, T) {
        (self.spic, self.cs, self.en, self.timer)
    }

    // One 16-bit frame. Chip select is released even when a transfer fails.
    fn frame(&mut self, address: u8, data: u8) -> Result<u8> {
        self.cs.enable()?;
        let exchanged = self
            .spic
            .transfer(address)
            .and_then(|_| self.spic.transfer(data));
        let released = self.cs.disable();

        let received = exchanged?;
        released?;
        self.timer.delay_milli(self.cs_rise_time_ms)?;
        Ok(received)
    }
}

fn extract(value: u8, mask: u8, shift: u8) -> u8 {
    (value & mask).checked_shr(shift.into()).unwrap_or(0)
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::hw_trait::{Error, Level, Logic, PinMode, SpicConfig};
    use crate::pal::sim::{SimEvent, SimGpio, SimPlatform, SimSpic, SimTimer};
    use std::time::Duration;

    const CS: u8 = 10;
    const EN: u8 = 8;

    type SimDriver = Tle94112<SimSpic, SimGpio, SimGpio, SimTimer>;

    fn driver(platform: &SimPlatform) -> SimDriver {
        Tle94112::new(
            platform.spic(SpicConfig::tle94112(0, CS)),
            platform.gpio(CS, PinMode::Output, Logic::Negative),
            platform.gpio(EN, PinMode::Output, Logic::Positive),
            platform.timer(),
        )
    }

    fn started(platform: &SimPlatform) -> SimDriver {
        let mut driver = driver(platform);
        driver.init_interfaces().unwrap();
        platform.clear_events();
        driver
    }

    fn frame_events(address: u8, data: u8, received: u8) -> Vec<SimEvent> {
        vec![
            SimEvent::PinWrite { pin: CS, level: Level::Low },
            SimEvent::Transfer { port: 0, sent: address, received: 0x00 },
            SimEvent::Transfer { port: 0, sent: data, received },
            SimEvent::PinWrite { pin: CS, level: Level::High },
            SimEvent::Delay(Duration::from_millis(2)),
        ]
    }

    #[test]
    fn write_reg_sends_one_framed_write() {
        let platform = SimPlatform::new();
        let mut driver = started(&platform);

        driver.write_reg(CtrlReg::HbAct1Ctrl, 0xFF, 0, 0x5A).unwrap();

        assert_eq!(platform.transfers().len(), 2);
        assert_eq!(platform.events(), frame_events(0x03 | 0x80, 0x5A, 0x00));
    }

    #[test]
    fn write_reg_preserves_bits_outside_mask() {
        let platform = SimPlatform::new();
        let mut driver = started(&platform);

        driver.write_reg(CtrlReg::HbMode2Ctrl, 0x03, 0, 0b11).unwrap();
        driver.write_reg(CtrlReg::HbMode2Ctrl, 0x0C, 2, 0b10).unwrap();
        assert_eq!(driver.shadow(CtrlReg::HbMode2Ctrl), 0b1011);

        driver.write_reg(CtrlReg::HbMode2Ctrl, 0x03, 0, 0b00).unwrap();
        assert_eq!(driver.shadow(CtrlReg::HbMode2Ctrl), 0b1000);

        let sent: Vec<u8> = platform.transfers().iter().map(|(s, _)| *s).collect();
        assert_eq!(sent, vec![0x93, 0b0011, 0x93, 0b1011, 0x93, 0b1000]);
    }

    #[test]
    fn data_outside_mask_is_dropped() {
        let platform = SimPlatform::new();
        let mut driver = started(&platform);

        driver.write_reg(CtrlReg::FwCtrl, 0x0F, 0, 0xFF).unwrap();
        assert_eq!(driver.shadow(CtrlReg::FwCtrl), 0x0F);
        driver.write_reg(CtrlReg::FwCtrl, 0xF0, 8, 0xFF).unwrap();
        assert_eq!(driver.shadow(CtrlReg::FwCtrl), 0x0F);
    }

    #[test]
    fn failed_write_leaves_shadow_unchanged() {
        let platform = SimPlatform::new();
        let mut driver = started(&platform);
        driver.write_reg(CtrlReg::FwCtrl, 0xFF, 0, 0x0F).unwrap();
        driver.end().unwrap();

        assert!(driver.write_reg(CtrlReg::FwCtrl, 0xFF, 0, 0x3C).is_err());
        assert_eq!(driver.shadow(CtrlReg::FwCtrl), 0x0F);
    }

    #[test]
    fn synced_shadow_keeps_bits_set_on_the_chip() {
        let platform = SimPlatform::new();
        let mut driver = started(&platform);
        platform.queue_response(&[0x00, 0xF0]);

        assert_eq!(driver.sync_shadow(CtrlReg::HbAct1Ctrl).unwrap(), 0xF0);
        assert_eq!(platform.transfers(), vec![(0x03, 0x00), (0xFF, 0xF0)]);

        driver.write_reg(CtrlReg::HbAct1Ctrl, 0x03, 0, 0x01).unwrap();
        assert_eq!(driver.shadow(CtrlReg::HbAct1Ctrl), 0xF1);
        assert_eq!(platform.transfers().last(), Some(&(0xF1, 0x00)));
    }

    #[test]
    fn read_status_reg_returns_second_byte() {
        let platform = SimPlatform::new();
        let mut driver = started(&platform);
        platform.queue_response(&[0x00, 0xA4]);

        assert_eq!(driver.read_status_reg(StatusReg::SysDiag2).unwrap(), 0xA4);
        assert_eq!(platform.events(), frame_events(0x5B, 0xFF, 0xA4));
    }

    #[test]
    fn read_status_reg_masked_extracts_field() {
        let platform = SimPlatform::new();
        let mut driver = started(&platform);
        platform.queue_response(&[0x00, 0b1011_0100]);

        let field = driver
            .read_status_reg_masked(StatusReg::SysDiag5, 0x30, 4)
            .unwrap();
        assert_eq!(field, 0b11);
    }

    #[test]
    fn clear_status_reg_sends_clear_and_zero() {
        let platform = SimPlatform::new();
        let mut driver = started(&platform);

        driver.clear_status_reg(StatusReg::SysDiag1).unwrap();

        assert_eq!(platform.transfers(), vec![(0x1B | 0x80, 0x00), (0x00, 0x00)]);
        assert_eq!(platform.events(), frame_events(0x9B, 0x00, 0x00));
    }

    #[test]
    fn sys_diagnosis_decodes_sys_diag1() {
        let platform = SimPlatform::new();
        let mut driver = started(&platform);
        platform.queue_response(&[0x00, 0x08 | 0x20]);

        assert_eq!(driver.sys_diagnosis().unwrap(), DiagFlags::UNDER_VOLTAGE);
    }

    #[test]
    fn begin_enables_and_resets_the_chip() {
        let platform = SimPlatform::new();
        let mut driver = driver(&platform);

        driver.begin().unwrap();

        assert_eq!(platform.level(EN), Level::High);
        assert_eq!(platform.level(CS), Level::High);

        let transfers = platform.transfers();
        assert_eq!(transfers.len(), 2 * (CtrlReg::COUNT + StatusReg::DIAGNOSIS.len()));
        let writes: Vec<u8> = transfers.iter().step_by(2).map(|(s, _)| *s).collect();
        let expected: Vec<u8> = CtrlReg::iter()
            .map(|r| r.address() | 0x80)
            .chain(StatusReg::DIAGNOSIS.iter().map(|r| r.address() | 0x80))
            .collect();
        assert_eq!(writes, expected);
        assert!(transfers.iter().skip(1).step_by(2).all(|(s, _)| *s == 0x00));
    }

    #[test]
    fn begin_stops_when_platform_setup_fails() {
        let platform = SimPlatform::new();
        platform.fail_setup(true);
        let mut driver = driver(&platform);

        let err = driver.begin().unwrap_err();
        assert!(matches!(err, Error::Interface(_)));
        assert!(platform.events().is_empty());
    }

    #[test]
    fn failed_bring_up_releases_initialized_handles() {
        let platform = SimPlatform::new();
        platform.fail_spi_setup(true);
        let mut driver = driver(&platform);

        assert!(matches!(driver.init_interfaces(), Err(Error::Interface(_))));
        assert_eq!(
            platform.events(),
            vec![
                SimEvent::PinMode { pin: EN, mode: PinMode::Output },
                SimEvent::PinMode { pin: CS, mode: PinMode::Output },
                SimEvent::PinRelease { pin: CS },
                SimEvent::PinRelease { pin: EN },
            ]
        );

        platform.fail_spi_setup(false);
        driver.init_interfaces().unwrap();
        assert_eq!(platform.level(EN), Level::High);
    }

    #[test]
    fn end_releases_every_handle_after_a_failure() {
        let platform = SimPlatform::new();
        let (spic, cs, mut en, timer) = started(&platform).release();
        en.deinit().unwrap();
        platform.clear_events();

        let mut driver = Tle94112::new(spic, cs, en, timer);
        assert_eq!(driver.end(), Err(Error::NotInitialized("GPIO")));
        assert_eq!(
            platform.events(),
            vec![SimEvent::SpiClose { port: 0 }, SimEvent::PinRelease { pin: CS }]
        );
    }

    #[test]
    fn end_disables_the_chip() {
        let platform = SimPlatform::new();
        let mut driver = started(&platform);

        driver.end().unwrap();
        assert_eq!(platform.level(EN), Level::Low);
        assert!(driver.write_reg(CtrlReg::FwCtrl, 0xFF, 0, 1).is_err());
    }

    #[test]
    fn cs_rise_time_is_configurable() {
        let platform = SimPlatform::new();
        let mut driver = driver(&platform).with_cs_rise_time(5);
        driver.init_interfaces().unwrap();
        let before = platform.now();

        driver.clear_status_reg(StatusReg::SysDiag3).unwrap();
        assert_eq!(platform.now() - before, Duration::from_millis(5));
    }
}

//! TLE94112 register map.
//!
//! Every SPI frame is 16 bits: an address byte followed by a data byte,
//! shifted LSB first. Bit 7 of the address byte selects write (control
//! registers) or clear (status registers).

use bitflags::bitflags;
use strum::{Display, EnumCount, EnumIter, EnumString};

/// Address byte command bits
pub mod commands {
    /// Write to a control register
    pub const WRITE: u8 = 0x80;
    /// Clear a status register
    pub const CLEAR: u8 = 0x80;
}

/// Data byte sent while reading
pub const READ_DUMMY: u8 = 0xFF;

/// Chip-select rise time after each frame (ms)
pub const CS_RISE_TIME_MS: u32 = 2;

/// Control registers, in shadow-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, EnumCount)]
#[strum(ascii_case_insensitive)]
pub enum CtrlReg {
    #[strum(serialize = "HB_ACT_1_CTRL")]
    HbAct1Ctrl,
    #[strum(serialize = "HB_ACT_2_CTRL")]
    HbAct2Ctrl,
    #[strum(serialize = "HB_ACT_3_CTRL")]
    HbAct3Ctrl,
    #[strum(serialize = "HB_MODE_1_CTRL")]
    HbMode1Ctrl,
    #[strum(serialize = "HB_MODE_2_CTRL")]
    HbMode2Ctrl,
    #[strum(serialize = "HB_MODE_3_CTRL")]
    HbMode3Ctrl,
    #[strum(serialize = "PWM_CH_FREQ_CTRL")]
    PwmChFreqCtrl,
    #[strum(serialize = "PWM1_DC_CTRL")]
    Pwm1DcCtrl,
    #[strum(serialize = "PWM2_DC_CTRL")]
    Pwm2DcCtrl,
    #[strum(serialize = "PWM3_DC_CTRL")]
    Pwm3DcCtrl,
    #[strum(serialize = "FW_OL_CTRL")]
    FwOlCtrl,
    #[strum(serialize = "FW_CTRL")]
    FwCtrl,
}

impl CtrlReg {
    pub const fn address(self) -> u8 {
        match self {
            CtrlReg::HbAct1Ctrl => 0x03,
            CtrlReg::HbAct2Ctrl => 0x43,
            CtrlReg::HbAct3Ctrl => 0x23,
            CtrlReg::HbMode1Ctrl => 0x63,
            CtrlReg::HbMode2Ctrl => 0x13,
            CtrlReg::HbMode3Ctrl => 0x53,
            CtrlReg::PwmChFreqCtrl => 0x33,
            CtrlReg::Pwm1DcCtrl => 0x73,
            CtrlReg::Pwm2DcCtrl => 0x0B,
            CtrlReg::Pwm3DcCtrl => 0x4B,
            CtrlReg::FwOlCtrl => 0x2B,
            CtrlReg::FwCtrl => 0x6B,
        }
    }

    /// Position in the shadow table.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Status and diagnosis registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, EnumCount)]
#[strum(ascii_case_insensitive)]
pub enum StatusReg {
    #[strum(serialize = "SYS_DIAG1")]
    SysDiag1,
    /// Overcurrent, half-bridges 1-4
    #[strum(serialize = "SYS_DIAG2")]
    SysDiag2,
    /// Overcurrent, half-bridges 5-8
    #[strum(serialize = "SYS_DIAG3")]
    SysDiag3,
    /// Overcurrent, half-bridges 9-12
    #[strum(serialize = "SYS_DIAG4")]
    SysDiag4,
    /// Open load, half-bridges 1-4
    #[strum(serialize = "SYS_DIAG5")]
    SysDiag5,
    /// Open load, half-bridges 5-8
    #[strum(serialize = "SYS_DIAG6")]
    SysDiag6,
    /// Open load, half-bridges 9-12
    #[strum(serialize = "SYS_DIAG7")]
    SysDiag7,
    #[strum(serialize = "CONFIG_CTRL")]
    ConfigCtrl,
}

impl StatusReg {
    pub const fn address(self) -> u8 {
        match self {
            StatusReg::SysDiag1 => 0x1B,
            StatusReg::SysDiag2 => 0x5B,
            StatusReg::SysDiag3 => 0x3B,
            StatusReg::SysDiag4 => 0x7B,
            StatusReg::SysDiag5 => 0x07,
            StatusReg::SysDiag6 => 0x47,
            StatusReg::SysDiag7 => 0x27,
            StatusReg::ConfigCtrl => 0x67,
        }
    }

    /// Diagnosis registers cleared by `clear_errors()`.
    pub const DIAGNOSIS: [StatusReg; 7] = [
        StatusReg::SysDiag1,
        StatusReg::SysDiag2,
        StatusReg::SysDiag3,
        StatusReg::SysDiag4,
        StatusReg::SysDiag5,
        StatusReg::SysDiag6,
        StatusReg::SysDiag7,
    ];
}

bitflags! {
    /// Global diagnosis flags in SYS_DIAG1, with power-on reset made active
    /// high.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DiagFlags: u8 {
        const SPI_ERROR = 0x80;
        const LOAD_ERROR = 0x40;
        const UNDER_VOLTAGE = 0x20;
        const OVER_VOLTAGE = 0x10;
        const POWER_ON_RESET = 0x08;
        const TEMP_SHUTDOWN = 0x04;
        const TEMP_WARNING = 0x02;
    }
}

/// SYS_DIAG1 bits the chip reports active low.
pub const STATUS_INV_MASK: u8 = DiagFlags::POWER_ON_RESET.bits();

impl DiagFlags {
    /// Decode a raw SYS_DIAG1 value.
    pub fn from_sys_diag1(raw: u8) -> Self {
        DiagFlags::from_bits_truncate(raw ^ STATUS_INV_MASK)
    }

    /// Human-readable names of the set flags, most severe first.
    pub fn describe(self) -> impl Iterator<Item = &'static str> {
        DIAG_DESCRIPTIONS
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, text)| *text)
    }
}

static DIAG_DESCRIPTIONS: [(DiagFlags, &str); 7] = [
    (DiagFlags::SPI_ERROR, "SPI error"),
    (DiagFlags::LOAD_ERROR, "Load error"),
    (DiagFlags::UNDER_VOLTAGE, "VS undervoltage"),
    (DiagFlags::OVER_VOLTAGE, "VS overvoltage"),
    (DiagFlags::POWER_ON_RESET, "Power-on reset"),
    (DiagFlags::TEMP_SHUTDOWN, "Thermal shutdown"),
    (DiagFlags::TEMP_WARNING, "Temperature warning"),
];

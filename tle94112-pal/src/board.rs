//! Pin assignments of the reference boards.
//!
//! One TLE94112 shield per board by default; a second shield needs its
//! chip-select jumper moved (R7 removed, R8 fitted on the Arduino shield).

use crate::framework::Framework;

/// Arduino Uno header.
pub mod arduino {
    /// Chip select of the first shield
    pub const PIN_CS1: u8 = 10;
    /// Chip select of the second shield
    pub const PIN_CS2: u8 = 9;
    pub const PIN_EN: u8 = 8;
    pub const SPI_PORT: u8 = 0;
}

/// Raspberry Pi 40-pin header, BCM numbering.
pub mod raspberry_pi {
    /// CE0
    pub const PIN_CS1: u8 = 8;
    /// CE1
    pub const PIN_CS2: u8 = 7;
    pub const PIN_EN: u8 = 25;
    pub const SPI_PORT: u8 = 0;
}

/// CYW943907 evaluation board, Arduino-compatible header numbering.
pub mod wiced {
    pub const PIN_CS1: u8 = 10;
    pub const PIN_CS2: u8 = 9;
    pub const PIN_EN: u8 = 8;
    pub const SPI_PORT: u8 = 1;
}

/// Chip-select, enable and SPI port for one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardPins {
    pub cs1: u8,
    pub cs2: u8,
    pub en: u8,
    pub spi_port: u8,
}

impl BoardPins {
    /// Reference pins for `framework`. The simulated platform mirrors the
    /// Arduino shield.
    pub fn for_framework(framework: Framework) -> Self {
        match framework {
            Framework::Arduino | Framework::Simulated => Self {
                cs1: arduino::PIN_CS1,
                cs2: arduino::PIN_CS2,
                en: arduino::PIN_EN,
                spi_port: arduino::SPI_PORT,
            },
            Framework::RaspberryPi => Self {
                cs1: raspberry_pi::PIN_CS1,
                cs2: raspberry_pi::PIN_CS2,
                en: raspberry_pi::PIN_EN,
                spi_port: raspberry_pi::SPI_PORT,
            },
            Framework::Wiced => Self {
                cs1: wiced::PIN_CS1,
                cs2: wiced::PIN_CS2,
                en: wiced::PIN_EN,
                spi_port: wiced::SPI_PORT,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arduino_shield_pins() {
        let pins = BoardPins::for_framework(Framework::Arduino);
        assert_eq!((pins.cs1, pins.cs2, pins.en), (10, 9, 8));
    }

    #[test]
    fn raspberry_pi_uses_hardware_chip_enables() {
        let pins = BoardPins::for_framework(Framework::RaspberryPi);
        assert_eq!((pins.cs1, pins.cs2), (8, 7));
    }
}

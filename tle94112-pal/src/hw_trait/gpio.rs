//! GPIO interface.

use super::Result;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Raw electrical level of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// The opposite level.
    pub fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level == Level::High
    }
}

/// Direction mode a pin is configured for at `init()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum PinMode {
    Input,
    InputPullUp,
    InputPullDown,
    Output,
}

impl PinMode {
    pub fn is_output(self) -> bool {
        self == PinMode::Output
    }
}

/// Which electrical level means "enabled".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Logic {
    /// Active high
    #[default]
    Positive,
    /// Active low
    Negative,
}

impl Logic {
    /// Level written by `enable()`.
    pub fn active_level(self) -> Level {
        match self {
            Logic::Positive => Level::High,
            Logic::Negative => Level::Low,
        }
    }

    /// Level written by `disable()`.
    pub fn inactive_level(self) -> Level {
        self.active_level().inverted()
    }
}

/// A single digital pin owned by one driver.
///
/// Implementations only provide the raw operations; the polarity mapping of
/// `enable()`/`disable()` is shared by all platforms.
pub trait Gpio {
    /// Configure the pin direction. Fails with an interface error when the
    /// platform cannot be set up, in which case the pin is left untouched.
    fn init(&mut self) -> Result<()>;

    /// Release the pin.
    fn deinit(&mut self) -> Result<()>;

    /// Read the raw level.
    fn read(&mut self) -> Result<Level>;

    /// Drive the raw level.
    fn write(&mut self, level: Level) -> Result<()>;

    /// Configured polarity.
    fn logic(&self) -> Logic;

    /// Drive the pin to its active level.
    fn enable(&mut self) -> Result<()> {
        let level = self.logic().active_level();
        self.write(level)
    }

    /// Drive the pin to its inactive level.
    fn disable(&mut self) -> Result<()> {
        let level = self.logic().inactive_level();
        self.write(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Logic::Positive, Level::High, Level::Low ; "positive logic")]
    #[test_case(Logic::Negative, Level::Low, Level::High ; "negative logic")]
    fn polarity_mapping(logic: Logic, active: Level, inactive: Level) {
        assert_eq!(logic.active_level(), active);
        assert_eq!(logic.inactive_level(), inactive);
    }

    #[test]
    fn level_parses_case_insensitive() {
        assert_eq!("high".parse::<Level>().unwrap(), Level::High);
        assert_eq!("LOW".parse::<Level>().unwrap(), Level::Low);
        assert_eq!(Level::from(true), Level::High);
        assert!(!bool::from(Level::Low));
    }
}

//! Compile-time platform selection.
//!
//! The platform family is chosen with a Cargo feature (`rpi`, `arduino`,
//! `wiced`). Without one, the crate targets the simulated host platform.
//! Features are additive, so when several are enabled the first of
//! rpi, arduino, wiced wins.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Platform family a build targets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    Arduino,
    RaspberryPi,
    Wiced,
    Simulated,
}

impl Framework {
    /// The family selected by this build's features.
    #[cfg(feature = "rpi")]
    pub const ACTIVE: Framework = Framework::RaspberryPi;

    #[cfg(all(feature = "arduino", not(feature = "rpi")))]
    pub const ACTIVE: Framework = Framework::Arduino;

    #[cfg(all(feature = "wiced", not(any(feature = "rpi", feature = "arduino"))))]
    pub const ACTIVE: Framework = Framework::Wiced;

    #[cfg(not(any(feature = "rpi", feature = "arduino", feature = "wiced")))]
    pub const ACTIVE: Framework = Framework::Simulated;
}

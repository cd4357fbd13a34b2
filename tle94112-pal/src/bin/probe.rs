//! tle94112-probe: read and write TLE94112 registers from the command line.
//!
//! The `sim` backend runs against the simulated platform and logs every SPI
//! frame at debug level (`-vv`), which is handy for checking register
//! encodings without a board attached.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use strum::IntoEnumIterator;
use tle94112_pal::config::Config;
use tle94112_pal::framework::Framework;
use tle94112_pal::hw_trait::{Gpio, PinMode, Spic, Timer};
use tle94112_pal::pal::sim::SimPlatform;
use tle94112_pal::tle94112::{CtrlReg, StatusReg, Tle94112};
use tle94112_pal::tracing::{self, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "tle94112-probe", version, about = "Poke a TLE94112 motor driver over SPI")]
struct Cli {
    /// Platform backend
    #[arg(long, value_enum, default_value_t = Backend::default())]
    backend: Backend,

    /// Board configuration (TOML); defaults to the reference board
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    Sim,
    /// Raspberry Pi (needs a build with the `rpi` feature)
    Rpi,
}

impl Default for Backend {
    #[cfg(all(feature = "rpi", target_os = "linux"))]
    fn default() -> Self {
        Backend::Rpi
    }

    #[cfg(not(all(feature = "rpi", target_os = "linux")))]
    fn default() -> Self {
        Backend::Sim
    }
}

impl Backend {
    fn framework(self) -> Framework {
        match self {
            Backend::Sim => Framework::Simulated,
            Backend::Rpi => Framework::RaspberryPi,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dump every status register and decode SYS_DIAG1
    Status,

    /// Clear the diagnosis registers
    Clear,

    /// Write a field of a control register
    Write {
        /// Register name, e.g. HB_ACT_1_CTRL
        register: CtrlReg,

        /// Field value (decimal, 0x.. or 0b..)
        #[arg(value_parser = parse_byte)]
        value: u8,

        /// Bits of the register to change
        #[arg(long, value_parser = parse_byte, default_value = "0xFF")]
        mask: u8,

        /// Left shift applied to the value
        #[arg(long, default_value_t = 0)]
        shift: u8,
    },

    /// Read a control register back from the chip
    Read {
        register: CtrlReg,
    },
}

fn parse_byte(s: &str) -> std::result::Result<u8, String> {
    let s = s.trim();
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        u8::from_str_radix(bin, 2)
    } else {
        s.parse()
    };
    parsed.map_err(|e| format!("invalid byte '{}': {}", s, e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing::init_journald_or_stderr(tracing::verbosity_level(cli.verbose));

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::default_for(cli.backend.framework()),
    };
    if config.framework != cli.backend.framework() {
        warn!(
            "Configuration is for {} but running on the {} backend",
            config.framework,
            cli.backend.framework()
        );
    }
    debug!("Configuration: {:?}", config);

    match cli.backend {
        Backend::Sim => probe_sim(&config, &cli.command),
        Backend::Rpi => probe_rpi(&config, &cli.command),
    }
}

fn probe_sim(config: &Config, command: &Command) -> Result<()> {
    let platform = SimPlatform::new();
    let mut driver = Tle94112::new(
        platform.spic(config.spic_config()),
        platform.gpio(config.board.cs_pin, PinMode::Output, config.board.cs_logic),
        platform.gpio(config.board.en_pin, PinMode::Output, config.board.en_logic),
        platform.timer(),
    )
    .with_cs_rise_time(config.timing.cs_rise_time_ms);

    let result = run(&mut driver, command);
    for (sent, received) in platform.transfers() {
        debug!("SPI 0x{:02X} -> 0x{:02X}", sent, received);
    }
    info!("Simulated time elapsed: {:?}", platform.now());
    result
}

#[cfg(all(feature = "rpi", target_os = "linux"))]
fn probe_rpi(config: &Config, command: &Command) -> Result<()> {
    use tle94112_pal::pal::host::HostTimer;
    use tle94112_pal::pal::rpi::{RpiGpio, RpiSpic};

    let mut driver = Tle94112::new(
        RpiSpic::new(config.spic_config()),
        RpiGpio::new(config.board.cs_pin, PinMode::Output, config.board.cs_logic),
        RpiGpio::new(config.board.en_pin, PinMode::Output, config.board.en_logic),
        HostTimer::new(),
    )
    .with_cs_rise_time(config.timing.cs_rise_time_ms);

    run(&mut driver, command)
}

#[cfg(not(all(feature = "rpi", target_os = "linux")))]
fn probe_rpi(_config: &Config, _command: &Command) -> Result<()> {
    bail!("tle94112-probe was built without Raspberry Pi support (feature `rpi`)")
}

// Commands skip the register reset done by begin(), so
// latched diagnosis bits are still visible.
fn run<S, CS, EN, T>(driver: &mut Tle94112<S, CS, EN, T>, command: &Command) -> Result<()>
where
    S: Spic,
    CS: Gpio,
    EN: Gpio,
    T: Timer,
{
    driver
        .init_interfaces()
        .context("initializing TLE94112 interfaces")?;

    let outcome = execute(driver, command);
    let ended = driver.end().context("releasing TLE94112 interfaces");
    outcome?;
    ended?;
    Ok(())
}

fn execute<S, CS, EN, T>(driver: &mut Tle94112<S, CS, EN, T>, command: &Command) -> Result<()>
where
    S: Spic,
    CS: Gpio,
    EN: Gpio,
    T: Timer,
{
    match command {
        Command::Status => {
            for reg in StatusReg::iter() {
                let value = driver.read_status_reg(reg)?;
                println!("{:<12} 0x{:02X}  {:08b}", reg.to_string(), value, value);
            }
            let flags = driver.sys_diagnosis()?;
            if flags.is_empty() {
                println!("No global errors");
            } else {
                let names: Vec<&str> = flags.describe().collect();
                println!("Global errors: {}", names.join(", "));
            }
        }
        Command::Clear => {
            driver.clear_errors()?;
            println!("Diagnosis registers cleared");
        }
        Command::Write {
            register,
            value,
            mask,
            shift,
        } => {
            if *shift > 7 {
                bail!("shift {} moves every bit out of the register", shift);
            }
            // A fresh driver knows nothing of the chip's current contents.
            if *mask != 0xFF {
                driver.sync_shadow(*register)?;
            }
            driver.write_reg(*register, *mask, *shift, *value)?;
            println!("{} = 0x{:02X}", register, driver.shadow(*register));
        }
        Command::Read { register } => {
            let value = driver.read_reg(*register, 0xFF, 0)?;
            println!("{} = 0x{:02X}", register, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use tle94112_pal::pal::sim::{SimGpio, SimSpic, SimTimer};

    #[test_case("0x1F", 0x1F)]
    #[test_case("0b101", 5)]
    #[test_case("200", 200)]
    #[test_case(" 0XFF ", 0xFF)]
    fn parses_bytes(input: &str, expected: u8) {
        assert_eq!(parse_byte(input).unwrap(), expected);
    }

    #[test]
    fn rejects_out_of_range_bytes() {
        assert!(parse_byte("0x100").is_err());
        assert!(parse_byte("256").is_err());
        assert!(parse_byte("zz").is_err());
    }

    #[test]
    fn cli_parses_write_command() {
        let cli = Cli::try_parse_from([
            "tle94112-probe",
            "--backend",
            "sim",
            "write",
            "hb_mode_1_ctrl",
            "0b10",
            "--mask",
            "0x0C",
            "--shift",
            "2",
        ])
        .unwrap();
        match cli.command {
            Command::Write {
                register,
                value,
                mask,
                shift,
            } => {
                assert_eq!(register, CtrlReg::HbMode1Ctrl);
                assert_eq!((value, mask, shift), (2, 0x0C, 2));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    fn sim_driver(platform: &SimPlatform) -> Tle94112<SimSpic, SimGpio, SimGpio, SimTimer> {
        let config = Config::default_for(Framework::Simulated);
        Tle94112::new(
            platform.spic(config.spic_config()),
            platform.gpio(config.board.cs_pin, PinMode::Output, config.board.cs_logic),
            platform.gpio(config.board.en_pin, PinMode::Output, config.board.en_logic),
            platform.timer(),
        )
    }

    #[test]
    fn masked_write_keeps_other_bits_of_the_chip() {
        let platform = SimPlatform::new();
        let mut driver = sim_driver(&platform);
        driver.init_interfaces().unwrap();
        platform.clear_events();
        platform.queue_response(&[0x00, 0xF0]);

        let write = Command::Write {
            register: CtrlReg::HbAct1Ctrl,
            value: 0x01,
            mask: 0x03,
            shift: 0,
        };
        execute(&mut driver, &write).unwrap();

        let sent: Vec<u8> = platform.transfers().iter().map(|(s, _)| *s).collect();
        assert_eq!(sent, vec![0x03, 0xFF, 0x83, 0xF1]);
    }

    #[test]
    fn full_write_skips_the_read_back() {
        let platform = SimPlatform::new();
        let mut driver = sim_driver(&platform);
        driver.init_interfaces().unwrap();
        platform.clear_events();

        let write = Command::Write {
            register: CtrlReg::FwCtrl,
            value: 0x3C,
            mask: 0xFF,
            shift: 0,
        };
        execute(&mut driver, &write).unwrap();

        assert_eq!(platform.transfers(), vec![(0xEB, 0x00), (0x3C, 0x00)]);
    }

    #[test]
    fn status_runs_against_the_simulator() {
        let config = Config::default_for(Framework::Simulated);
        assert!(probe_sim(&config, &Command::Status).is_ok());
    }
}

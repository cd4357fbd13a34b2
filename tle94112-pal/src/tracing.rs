//! Logging setup.
//!
//! Binaries call one of the init_* functions once at startup to install a
//! subscriber. Library code only emits events and uses
//! `use crate::tracing::prelude::*` for the `trace!()` .. `error!()` macros,
//! which are available without `std`; installing a subscriber is not.

pub mod prelude {
    #[allow(unused_imports)]
    pub use tracing::{debug, error, info, trace, warn};
}

#[cfg(feature = "std")]
pub use subscriber::{init_journald_or_stderr, verbosity_level};

#[cfg(feature = "std")]
mod subscriber {
    use super::prelude::*;
    use std::{env, io};
    use time::OffsetDateTime;
    use tracing_subscriber::{
        filter::{EnvFilter, LevelFilter},
        fmt::{format::Writer, time::FormatTime},
        prelude::*,
    };

    /// Initialize logging at `default_level`.
    ///
    /// Under systemd the journal is used; otherwise events go to stderr so
    /// that command output on stdout stays clean. RUST_LOG overrides the
    /// level.
    pub fn init_journald_or_stderr(default_level: LevelFilter) {
        if env::var("JOURNAL_STREAM").is_ok() {
            if let Ok(layer) = tracing_journald::layer() {
                tracing_subscriber::registry()
                    .with(env_filter(default_level))
                    .with(layer)
                    .init();
            } else {
                use_stderr(default_level);
                error!("Failed to initialize journald logging, using stderr.");
            }
        } else {
            use_stderr(default_level);
        }
    }

    /// Map a `-v` count to a level, starting from WARN.
    pub fn verbosity_level(count: u8) -> LevelFilter {
        match count {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    fn env_filter(default_level: LevelFilter) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(default_level.into())
            .with_env_var("RUST_LOG")
            .from_env_lossy()
    }

    fn use_stderr(default_level: LevelFilter) {
        tracing_subscriber::registry()
            .with(env_filter(default_level))
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_timer(LocalTimer),
            )
            .init();
    }

    // Local time to the nearest millisecond; frames are a few ms apart.
    struct LocalTimer;

    impl FormatTime for LocalTimer {
        fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
            let now = OffsetDateTime::now_local().unwrap_or(OffsetDateTime::now_utc());
            let stamp = now
                .format(time::macros::format_description!(
                    "[hour]:[minute]:[second].[subsecond digits:3]"
                ))
                .map_err(|_| std::fmt::Error)?;
            write!(w, "{}", stamp)
        }
    }

}

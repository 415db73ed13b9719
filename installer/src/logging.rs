//! Diagnostic logging setup for the binary.
//!
//! Library code logs through the `log` facade with `debug!` and `trace!`.
//! The binary installs a `tracing-subscriber` formatter on stderr, which
//! also captures `log` records, so `-v` and `-vv` make them visible.
//! `RUST_LOG` wins when it is set.

use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Log target prefix of this crate.
const CRATE_TARGET: &str = "piam_anc_installer";

/// Error returned when a global subscriber is already installed.
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Map the `-v` count to a level for this crate's records.
#[must_use]
pub const fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Filter directive used when `RUST_LOG` is unset.
///
/// Other crates stay at `warn` regardless of verbosity.
#[must_use]
pub fn filter_directive(verbosity: u8) -> String {
    format!("warn,{CRATE_TARGET}={}", level_for_verbosity(verbosity))
}

/// Install the stderr subscriber at the level implied by `verbosity`.
///
/// # Errors
///
/// Returns an [`InitError`] if a global subscriber or `log` logger is
/// already installed.
pub fn init(verbosity: u8) -> Result<(), InitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
}

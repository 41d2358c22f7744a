// stylepipe/src/logger.rs
//! Logging setup for the stylepipe CLI.
//!
//! Log lines go to stderr as `[LEVEL target] message`, so stdout stays clean
//! for CSS and JSON output.

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Initializes the global logger. Safe to call more than once.
///
/// `level` forces the level for the stylepipe crates; with `None`, `RUST_LOG`
/// decides and falls back to `warn`.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));

    if let Some(level) = level {
        builder.filter_module("stylepipe", level);
        builder.filter_module("stylepipe_core", level);
    }

    builder.format(|buf, record| {
        writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args())
    });

    // A second init (tests, repeated calls) keeps the first logger.
    let _ = builder.try_init();
}

/// Maps the global CLI flags onto a forced level.
pub fn level_from_flags(quiet: bool, debug: bool, disable_debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Error)
    } else if debug && !disable_debug {
        Some(LevelFilter::Debug)
    } else if disable_debug {
        Some(LevelFilter::Info)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_debug() {
        assert_eq!(level_from_flags(true, true, false), Some(LevelFilter::Error));
    }

    #[test]
    fn disable_debug_caps_debug() {
        assert_eq!(level_from_flags(false, true, true), Some(LevelFilter::Info));
        assert_eq!(level_from_flags(false, true, false), Some(LevelFilter::Debug));
        assert_eq!(level_from_flags(false, false, false), None);
    }
}

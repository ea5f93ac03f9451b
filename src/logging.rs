//! Stderr logger for the `broadside` binary.
//!
//! `BROADSIDE_LOG` sets the level for records from this crate; records from
//! dependencies (tokio, ...) are capped at `warn` so they do not drown the
//! game log at `debug`.

use std::env;
use std::sync::OnceLock;

use log::{Level, LevelFilter, Log, Metadata, Record};

const CRATE_TARGET: &str = "broadside";

/// Logger that filters by target: crate records at the configured level,
/// everything else at no more than `warn`.
#[derive(Debug, Clone, Copy)]
pub struct BroadsideLogger {
    level: LevelFilter,
}

impl BroadsideLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Level from `BROADSIDE_LOG`; `info` if unset or unparsable.
    pub fn from_env() -> Self {
        let level = env::var("BROADSIDE_LOG")
            .ok()
            .and_then(|lvl| lvl.parse().ok())
            .unwrap_or(LevelFilter::Info);
        Self::new(level)
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    fn limit_for(&self, target: &str) -> LevelFilter {
        let ours = target == CRATE_TARGET
            || target
                .strip_prefix(CRATE_TARGET)
                .is_some_and(|rest| rest.starts_with("::"));
        if ours {
            self.level
        } else {
            self.level.min(LevelFilter::Warn)
        }
    }
}

impl Log for BroadsideLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.limit_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Error | Level::Warn => {
                eprintln!("{:<5} [{}] {}", record.level(), record.target(), record.args())
            }
            _ => eprintln!("{:<5} {}", record.level(), record.args()),
        }
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<BroadsideLogger> = OnceLock::new();

/// Install [`BroadsideLogger::from_env`] as the global logger. Later calls
/// are ignored.
pub fn init_logging() {
    let logger = LOGGER.get_or_init(BroadsideLogger::from_env);
    let _ = log::set_logger(logger).map(|()| log::set_max_level(logger.level()));
}

use crate::errors::Error;
use log::{Level, LevelFilter, Metadata, Record};
use std::io::{stdout, Write};

/// Prints info lines as-is so table listings read cleanly, everything
/// else with its level.
pub struct CliLogger;

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        match record.level() {
            Level::Error | Level::Warn => eprintln!("[{}] {}", record.level(), record.args()),
            Level::Info => println!("{}", record.args()),
            level => println!("[{}] {}: {}", level, record.target(), record.args()),
        }
    }

    fn flush(&self) {
        let _ = stdout().flush();
    }
}

static LOGGER: CliLogger = CliLogger;

pub fn init(level: LevelFilter) -> Result<(), Error> {
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(level))
        .map_err(|_| Error::Logger("Failed to set logger."))
}

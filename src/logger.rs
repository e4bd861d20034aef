use colored::Colorize;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

// Uses 'log' to allow for logging
// Compiler stages log under their own target, everything else is capped
// at warnings
// Logging is done by logging the level, target and the given arguments
struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level()
            <= match metadata.target() {
                "lexer" | "parser" | "backend" => Level::Trace,
                target if target.starts_with("bcc") => Level::Trace,
                _ => Level::Warn,
            }
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let output = format!(
                "{} - {} - {}",
                record.level(),
                record.target(),
                record.args()
            );

            match record.level() {
                Level::Error => eprintln!("{}", output.red()),
                Level::Warn => eprintln!("{}", output.purple()),
                Level::Info => eprintln!("{}", output.blue()),
                _ => eprintln!("{}", output),
            }
        }
    }

    fn flush(&self) {}
}

/// Maps the number of `-v` flags to the most detailed level shown.
pub fn level_filter(verbosity: u64) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

// Initializes 'log' with the custom logger
pub fn init(verbosity: u64) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level_filter(verbosity)))
}
static LOGGER: SimpleLogger = SimpleLogger;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(level_filter(0), LevelFilter::Warn);
        assert_eq!(level_filter(1), LevelFilter::Info);
        assert_eq!(level_filter(2), LevelFilter::Debug);
        assert_eq!(level_filter(7), LevelFilter::Trace);
    }
}

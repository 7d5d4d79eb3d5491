// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use snafu::{ResultExt, Snafu};
use std::{
    fmt::Arguments,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, OnceLock,
    },
};

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Records every message to a file and echoes the severe enough ones to the
/// console, errors going to standard error.
pub struct Logger {
    displaying: LevelFilter,
    file: Mutex<BufWriter<File>>,

    /// Set once a write to the log file has failed and been reported.
    file_failed: AtomicBool,
}

impl Logger {
    /// Creates a new logger, returns an error on I/O errors in creating/opening
    /// the given file path for writing.
    pub fn new(file_path: impl AsRef<Path>, displaying: LevelFilter) -> io::Result<Self> {
        Ok(Self {
            displaying,
            file: Mutex::new(BufWriter::new(File::create(file_path)?)),
            file_failed: AtomicBool::new(false),
        })
    }

    /// Whether writing the log file has failed at least once.
    #[inline]
    #[must_use]
    pub fn file_failed(&self) -> bool {
        self.file_failed.load(Ordering::Relaxed)
    }

    /// Reports the first failed file write on standard error, later failures
    /// are only counted as already reported.
    fn check(&self, result: io::Result<()>) {
        if let Err(e) = result {
            if !self.file_failed.swap(true, Ordering::Relaxed) {
                eprintln!("   [Err] log file write failed, file logging may be incomplete: {e}");
            }
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    /// The file is written and flushed directly so that in the case of a
    /// panic it already has the relevant contents.
    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = line(record.level(), record.target(), record.args());

        if let Ok(mut file) = self.file.lock() {
            let result = writeln!(file, "{line}").and_then(|()| file.flush());
            self.check(result);
        }

        if record.level() > self.displaying {
            return;
        }

        match record.level() {
            Level::Error => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let result = file.flush();
            self.check(result);
        }
    }
}

/// Formats a single log line, padded so messages line up across severities.
fn line(level: Level, target: &str, args: &Arguments) -> String {
    let tag = match level {
        Level::Error => "   [Err]",
        Level::Warn => "  [Warn]",
        Level::Info => "  [Info]",
        Level::Debug => " [Debug]",
        Level::Trace => " [Trace]",
    };

    format!("{tag} {target}: {args}")
}

#[derive(Debug, Snafu)]
pub enum InitError {
    #[snafu(display("could not create log file \"{path}\": {source}"))]
    Create { path: String, source: io::Error },

    #[snafu(display("a logger is already installed: {source}"))]
    Install { source: SetLoggerError },
}

/// Installs the logger, writing everything down to debug to `path` and
/// displaying `displaying` and more severe messages on the console.
pub fn init(path: impl AsRef<Path>, displaying: LevelFilter) -> Result<(), InitError> {
    let path = path.as_ref();

    let logger = match LOGGER.get() {
        Some(logger) => logger,
        None => {
            let logger = Logger::new(path, displaying).context(CreateSnafu {
                path: path.display().to_string(),
            })?;
            LOGGER.get_or_init(|| logger)
        }
    };

    log::set_logger(logger).context(InstallSnafu)?;
    log::set_max_level(LevelFilter::Debug);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_align() {
        let err = line(Level::Error, "SJH", &format_args!("bad"));
        let info = line(Level::Info, "SJH", &format_args!("CPI: 42.57"));

        assert_eq!(err, "   [Err] SJH: bad");
        assert_eq!(info, "  [Info] SJH: CPI: 42.57");
        assert_eq!(err.find(']'), info.find(']'));
    }

    #[test]
    fn records_everything_to_file() {
        let path = std::env::temp_dir().join("shelby-logger-test.log");
        let logger = Logger::new(&path, LevelFilter::Error).unwrap();
        log::set_max_level(LevelFilter::Debug);

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("SJH")
                .args(format_args!("Capability shooter: false"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Trace)
                .target("SJH")
                .args(format_args!("too chatty"))
                .build(),
        );
        logger.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "  [Info] SJH: Capability shooter: false\n");
        assert!(!logger.file_failed());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn file_failures_are_recorded() {
        let logger = Logger::new("/dev/full", LevelFilter::Off).unwrap();
        log::set_max_level(LevelFilter::Debug);

        for _ in 0..2 {
            logger.log(
                &Record::builder()
                    .level(Level::Warn)
                    .target("SJH")
                    .args(format_args!("disk is full"))
                    .build(),
            );
        }

        assert!(logger.file_failed());
    }
}

//! Various helper-utilities

use crate::{cli::Opts, config::Config};
use anyhow::Result;
use clap::crate_name;
use flexi_logger::{
    style,
    AdaptiveFormat,
    Age,
    Cleanup,
    Criterion,
    DeferredNow,
    Duplicate,
    FileSpec,
    Level,
    Logger,
    LoggerHandle,
    Naming,
    Record,
    WriteMode,
};
use serde::{de, Deserialize};
use std::{
    env,
    fmt::Display,
    io::{self, Write},
    panic,
    path::PathBuf,
};

/// Shorter way of testing if the user wants color for the output of `--help`
pub(crate) fn wants_color() -> bool {
    env::var_os("NO_COLOR").is_none()
}

// ============================== Logging ============================= [[[

/// Log level string from `LTWM_LOG`, else from the number of `-v` flags
fn log_spec(verbose: u8) -> String {
    env::var("LTWM_LOG").unwrap_or_else(|_| {
        String::from(match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        })
    })
}

/// Where log files go when file logging is enabled
fn log_dir(config: &Config) -> PathBuf {
    config
        .global
        .log_dir
        .clone()
        .unwrap_or_else(|| env::temp_dir().join(crate_name!()))
}

/// Terminal format: colored level and module
fn format_terminal(w: &mut dyn Write, _now: &mut DeferredNow, record: &Record) -> io::Result<()> {
    let level = record.level();
    write!(
        w,
        "{:<5} [{}:{}]: {}",
        style(level, level),
        style(Level::Trace, record.module_path().unwrap_or("<unnamed>")),
        record.line().unwrap_or(0),
        record.args()
    )
}

/// File format: timestamped, with escape sequences removed from the message
fn format_file(w: &mut dyn Write, now: &mut DeferredNow, record: &Record) -> io::Result<()> {
    let message = strip_ansi_escapes::strip(record.args().to_string().as_bytes())?;
    write!(
        w,
        "[{}] {:<5} [{}:{}]: {}",
        now.now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.module_path().unwrap_or("<unnamed>"),
        record.line().unwrap_or(0),
        String::from_utf8_lossy(&message)
    )
}

/// Start the logger. The returned handle must be kept alive for buffered
/// records to be flushed
pub(crate) fn initialize_logging(config: &Config, args: &Opts) -> Result<LoggerHandle> {
    if cfg!(debug_assertions) {
        better_panic::install();
        panic::set_hook(Box::new(|info| {
            better_panic::Settings::auto().create_panic_handler()(info);
        }));
    }

    let mut logger = Logger::try_with_str(log_spec(args.verbose))?
        .write_mode(WriteMode::BufferAndFlush)
        .adaptive_format_for_stderr(AdaptiveFormat::Custom(format_file, format_terminal))
        .set_palette(String::from("9;11;14;5;13"));

    let dir = config.global.log_to_file.then(|| log_dir(config));
    if let Some(dir) = &dir {
        logger = logger
            .log_to_file(FileSpec::default().basename(crate_name!()).directory(dir))
            .format_for_files(format_file)
            .duplicate_to_stderr(Duplicate::All)
            .rotate(
                Criterion::AgeOrSize(Age::Day, 50_000_000),
                Naming::Numbers,
                Cleanup::KeepLogFiles(2),
            );
    }

    let handle = logger.start()?;
    if let Some(dir) = dir {
        log::info!("logging to {}", dir.display());
    }

    Ok(handle)
}

// ]]] === Logging ===

/// [`Deserialize`] something that has a shell variable
#[allow(single_use_lifetimes)]
pub(crate) fn deserialize_shellexpand<'de, D>(d: D) -> Result<Option<PathBuf>, D::Error>
where
    D: de::Deserializer<'de>,
{
    let value = PathBuf::deserialize(d)?;

    let value = PathBuf::from(
        shellexpand::full(&value.to_string_lossy())
            .map_err(|e| {
                de::Error::invalid_value(
                    de::Unexpected::Str(value.to_string_lossy().as_ref()),
                    &e.to_string().as_str(),
                )
            })?
            .to_string(),
    );

    Ok(Some(value))
}

// ============================= LogError =============================

/// Log a failure instead of propagating it. Used for requests whose failure
/// shouldn't abort the transition that issued them
pub(crate) trait LogError<T> {
    /// Log the error at `warn` and convert into an [`Option`]
    fn log_err(self) -> Option<T>;
}

impl<T, E: Display> LogError<T> for Result<T, E> {
    fn log_err(self) -> Option<T> {
        match self {
            Ok(t) => Some(t),
            Err(e) => {
                log::warn!("{:#}", e);
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{log_dir, LogError};
    use crate::config::Config;
    use std::{env, path::PathBuf};

    #[test]
    fn failures_become_none() {
        assert_eq!(Ok::<_, &str>(3).log_err(), Some(3));
        assert_eq!(Err::<u8, _>("no such window").log_err(), None);
    }

    #[test]
    fn log_dir_defaults_to_temp() {
        let mut config = Config::default();
        assert_eq!(log_dir(&config), env::temp_dir().join("ltwm"));

        config.global.log_dir = Some(PathBuf::from("/var/log/ltwm"));
        assert_eq!(log_dir(&config), PathBuf::from("/var/log/ltwm"));
    }
}

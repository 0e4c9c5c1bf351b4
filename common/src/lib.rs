//! Process setup shared by the binaries: `.env` loading and logging.
//!
//! Logging goes to two places at once: the console at `info` (overridable with
//! `RUST_LOG`) and a size-rotated file that also keeps `debug` output from this
//! workspace's crates.
mod rotate;

pub use rotate::RotatingFile;

use env_logger::fmt::Formatter;
use env_logger::{Builder, Env, Logger, Target, WriteStyle};
use log::{LevelFilter, Log, Metadata, Record};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_LOG_DIR: &str = "logs";
const LOG_FILE_NAME: &str = "mail_worker.log";
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;
const LOG_BACKUPS: usize = 5;
const WORKSPACE_CRATES: [&str; 3] = ["bot", "hotmail007", "common"];

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open log file: {0}")]
    LogFile(#[from] io::Error),

    #[error("Logger already installed: {0}")]
    SetLogger(#[from] log::SetLoggerError),
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub dir: PathBuf,
    pub max_bytes: u64,
    pub backups: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            max_bytes: MAX_LOG_BYTES,
            backups: LOG_BACKUPS,
        }
    }
}

impl LogConfig {
    /// Reads `LOG_DIR`, falling back to `./logs`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = env::var("LOG_DIR") {
            config.dir = PathBuf::from(dir);
        }
        config
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE_NAME)
    }
}

/// Handle to the installed logger. Dropping it flushes both outputs.
pub struct Logging {
    _private: (),
}

impl Logging {
    /// Installs the console and file loggers as the `log` backend.
    /// Can only succeed once per process.
    pub fn init(config: &LogConfig) -> Result<Self, Error> {
        let console = console_logger();
        let file = file_logger(config)?;

        log::set_max_level(console.filter().max(file.filter()));
        log::set_boxed_logger(Box::new(Tee { console, file }))?;

        Ok(Self { _private: () })
    }

    pub fn flush(&self) {
        log::logger().flush();
    }
}

impl Drop for Logging {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Loads `.env` if present and installs logging.
///
/// # Examples
///
/// ```no_run
/// let _logging = common::setup_env().unwrap();
/// log::info!("The logger is now initialized and environment variables are loaded");
/// ```
pub fn setup_env() -> Result<Logging, Error> {
    dotenvy::dotenv().ok();
    Logging::init(&LogConfig::from_env())
}

struct Tee {
    console: Logger,
    file: Logger,
}

impl Log for Tee {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata) || self.file.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        self.console.log(record);
        self.file.log(record);
    }

    fn flush(&self) {
        self.console.flush();
        self.file.flush();
    }
}

fn console_logger() -> Logger {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{} - {} - {style}{}{style:#} - {}",
                buf.timestamp_seconds(),
                record.target(),
                record.level(),
                record.args()
            )
        })
        .build()
}

fn file_logger(config: &LogConfig) -> io::Result<Logger> {
    let file = RotatingFile::open(config.file_path(), config.max_bytes, config.backups)?;

    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Info);
    for name in WORKSPACE_CRATES {
        builder.filter_module(name, LevelFilter::Debug);
    }

    Ok(builder
        .target(Target::Pipe(Box::new(file)))
        .write_style(WriteStyle::Never)
        .format(plain_line)
        .build())
}

fn plain_line(buf: &mut Formatter, record: &Record) -> io::Result<()> {
    writeln!(
        buf,
        "{} - {} - {} - {}",
        buf.timestamp_seconds(),
        record.target(),
        record.level(),
        record.args()
    )
}

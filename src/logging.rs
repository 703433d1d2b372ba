//! Console and rotating-file logging

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use flate2::write::GzEncoder;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::error::AppError;

/// Install the global subscriber: stderr at `console_level` (or `RUST_LOG`
/// when present, or DEBUG when `debug` is set), plus the log file at
/// `write_level`.
pub(crate) fn init_logging(config: &LoggingConfig, debug: bool) -> Result<(), AppError> {
    let console_level = parse_level(&config.console_level)?;
    let write_level = parse_level(&config.write_level)?;
    let max_size = parse_size(&config.rotation)?;
    let format = parse_format(&config.format)?;
    let compression = parse_compression(&config.compression)?;

    let file_writer = SharedRollingWriter::new(
        &config.logs_folder,
        &config.sink,
        config.max_files,
        max_size,
        compression,
    )
    .map_err(|e| AppError::Logging {
        path: config.logs_folder.join(&config.sink),
        source: e,
    })?;

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let console_filter = build_console_filter(console_level, debug, rust_log.as_deref());

    let installed = tracing_subscriber::registry()
        .with(fmt_layer(format, file_writer, false, true).with_filter(write_level))
        .with(fmt_layer(format, io::stderr, true, false).with_filter(console_filter))
        .try_init();
    if let Err(e) = installed {
        eprintln!("Warning: logging already initialized: {e}");
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogFormat {
    Full,
    Compact,
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogCompression {
    None,
    Gzip,
}

fn fmt_layer<S, W>(
    format: LogFormat,
    writer: W,
    ansi: bool,
    target: bool,
) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(target);
    match format {
        LogFormat::Full => layer.boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
    }
}

/// `--debug` wins over `RUST_LOG`, which wins over the configured level.
fn build_console_filter(level: LevelFilter, debug: bool, rust_log: Option<&str>) -> EnvFilter {
    if debug {
        return EnvFilter::builder()
            .with_default_directive(LevelFilter::DEBUG.into())
            .parse_lossy("");
    }
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(rust_log.unwrap_or_default())
}

/// "info", "DEBUG", "off", ... Also accepts "success" as an alias of INFO.
pub(crate) fn parse_level(raw: &str) -> Result<LevelFilter, AppError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("success") {
        return Ok(LevelFilter::INFO);
    }
    if trimmed.is_empty() {
        return Err(AppError::InvalidLogLevel {
            input: raw.to_string(),
        });
    }
    LevelFilter::from_str(trimmed).map_err(|_| AppError::InvalidLogLevel {
        input: raw.to_string(),
    })
}

pub(crate) fn parse_format(raw: &str) -> Result<LogFormat, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "full" => Ok(LogFormat::Full),
        "compact" => Ok(LogFormat::Compact),
        "pretty" => Ok(LogFormat::Pretty),
        _ => Err(AppError::InvalidLogFormat {
            input: raw.to_string(),
        }),
    }
}

pub(crate) fn parse_compression(raw: &str) -> Result<LogCompression, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "none" => Ok(LogCompression::None),
        "gz" | "gzip" => Ok(LogCompression::Gzip),
        _ => Err(AppError::InvalidCompression {
            input: raw.to_string(),
        }),
    }
}

/// "10 MB", "512kb", "1 GB", "4096". Units are powers of 1024.
pub(crate) fn parse_size(raw: &str) -> Result<u64, AppError> {
    let invalid = || AppError::InvalidRotation {
        input: raw.to_string(),
    };
    let trimmed = raw.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let number: u64 = number.parse().map_err(|_| invalid())?;
    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "kb" | "k" => 1024,
        "mb" | "m" => 1024 * 1024,
        "gb" | "g" => 1024 * 1024 * 1024,
        _ => return Err(invalid()),
    };
    let size = number.checked_mul(multiplier).ok_or_else(invalid)?;
    if size == 0 {
        return Err(invalid());
    }
    Ok(size)
}

/// Log file that rolls over to `name.1`, `name.2`, ... past `max_size` bytes.
/// With gzip compression the backups are `name.1.gz`, `name.2.gz`, ...
struct RollingFile {
    path: PathBuf,
    max_files: usize,
    max_size: u64,
    compression: LogCompression,
    file: Option<File>,
    written: u64,
}

impl RollingFile {
    fn open(
        folder: &Path,
        name: &str,
        max_files: usize,
        max_size: u64,
        compression: LogCompression,
    ) -> io::Result<Self> {
        fs::create_dir_all(folder)?;
        let mut rolling = Self {
            path: folder.join(name),
            max_files: max_files.max(1),
            max_size,
            compression,
            file: None,
            written: 0,
        };
        rolling.reopen()?;
        if rolling.written > rolling.max_size {
            rolling.roll()?;
        }
        Ok(rolling)
    }

    fn reopen(&mut self) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.written = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn backup(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        if self.compression == LogCompression::Gzip {
            name.push(".gz");
        }
        PathBuf::from(name)
    }

    fn roll(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }

        // The live file may have been deleted from under us.
        let keep = self.max_files - 1;
        if keep == 0 {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
        } else {
            let oldest = self.backup(keep);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for idx in (1..keep).rev() {
                let from = self.backup(idx);
                if from.exists() {
                    fs::rename(&from, self.backup(idx + 1))?;
                }
            }
            if self.path.exists() {
                match self.compression {
                    LogCompression::None => fs::rename(&self.path, self.backup(1))?,
                    LogCompression::Gzip => {
                        gzip_into(&self.path, &self.backup(1))?;
                        fs::remove_file(&self.path)?;
                    }
                }
            }
        }

        self.reopen()
    }
}

fn gzip_into(from: &Path, to: &Path) -> io::Result<()> {
    let mut input = File::open(from)?;
    let mut encoder = GzEncoder::new(File::create(to)?, flate2::Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;
    Ok(())
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_size {
            self.roll()?;
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::other("log file unavailable"))?;
        let n = file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

#[derive(Clone)]
struct SharedRollingWriter {
    inner: Arc<Mutex<RollingFile>>,
}

impl SharedRollingWriter {
    fn new(
        folder: &Path,
        name: &str,
        max_files: usize,
        max_size: u64,
        compression: LogCompression,
    ) -> io::Result<Self> {
        let file = RollingFile::open(folder, name, max_files, max_size, compression)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(file)),
        })
    }
}

impl<'a> MakeWriter<'a> for SharedRollingWriter {
    type Writer = SharedRollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for SharedRollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?
            .flush()
    }
}

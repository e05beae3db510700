//! Size-capped rotating log file used as the `tracing` sink.
//!
//! When a write would push the active file past `max_bytes`, `app.log` is
//! renamed to `app.log.1`, older backups shift up by one, and anything beyond
//! `backups` is deleted. A `max_bytes` of zero disables rotation.

use pickmenu_config::LoggingConfig;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Why the log sink could not be set up.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("invalid log level '{level}': {source}")]
    Filter {
        level: String,
        #[source]
        source: ParseError,
    },

    #[error("could not open log file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The active log file and its rotation policy.
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: File,
    written: u64,
}

impl RotatingFile {
    /// Opens `path` for appending, creating parent directories as needed.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let written = file.metadata()?.len();
        Ok(RotatingFile {
            path,
            max_bytes,
            backups,
            file,
            written,
        })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.backups == 0 {
            self.file = File::create(&self.path)?;
        } else {
            let oldest = self.backup_path(self.backups);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..self.backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
            self.file = open_append(&self.path)?;
        }
        self.written = 0;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.max_bytes > 0
            && self.written > 0
            && self.written + buf.len() as u64 > self.max_bytes
        {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// A writer handed to the `fmt` layer for each event.
///
/// Every write takes the lock, writes the whole buffer and flushes, so lines
/// from one event are never split across a rotation.
pub struct RotatingFileGuard {
    file: Arc<Mutex<RotatingFile>>,
}

impl RotatingFileGuard {
    pub fn new(file: Arc<Mutex<RotatingFile>>) -> Self {
        Self { file }
    }
}

fn poisoned() -> io::Error {
    io::Error::other("log file mutex was poisoned")
}

impl Write for RotatingFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock().map_err(|_| poisoned())?;
        let written = file.write(buf)?;
        file.flush()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.lock().map_err(|_| poisoned())?.flush()
    }
}

/// Builds the subscriber for one run. It is not installed globally; the
/// caller scopes it with `tracing::subscriber::with_default`.
///
/// The filter is parsed before the file is opened, so a bad level leaves no
/// log file behind.
pub fn file_subscriber(
    config: &LoggingConfig,
) -> Result<impl tracing::Subscriber + Send + Sync + 'static, SinkError> {
    let filter = EnvFilter::try_new(&config.level).map_err(|source| SinkError::Filter {
        level: config.level.clone(),
        source,
    })?;
    let file = RotatingFile::open(&config.file, config.max_bytes, config.backups).map_err(
        |source| SinkError::Open {
            path: config.file.clone(),
            source,
        },
    )?;
    let shared = Arc::new(Mutex::new(file));

    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(move || RotatingFileGuard::new(shared.clone()))
        .finish())
}

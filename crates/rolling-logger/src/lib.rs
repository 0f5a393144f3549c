//! Rolling File Logger
//!
//! Writes formatted log lines to `<dir>/<app_name>.log`, rotating the file to
//! `<app_name>.log.1` once it passes a size cap, and keeps the most recent
//! lines in a circular buffer so the UI can show them without touching disk.
//!
//! `log` records emitted by other crates are bridged into the same subscriber.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::MakeWriter;

/// Size at which the active log file is rotated
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Number of recent lines kept in memory
pub const DEFAULT_BUFFER_LINES: usize = 500;

static LOGGER: OnceLock<RollingLogger> = OnceLock::new();

struct RollingFile {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
}

impl RollingFile {
    fn open(path: PathBuf, max_bytes: u64) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            file,
            written,
            max_bytes,
        })
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".1");
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        fs::rename(&self.path, self.backup_path())?;
        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }

    fn write_chunk(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        Ok(())
    }
}

struct LineBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LineBuffer {
    fn push(&mut self, chunk: &str) {
        for line in chunk.lines().filter(|l| !l.trim().is_empty()) {
            if self.lines.len() == self.capacity {
                self.lines.pop_front();
            }
            self.lines.push_back(line.to_string());
        }
    }
}

/// Shared handle to the log file and its in-memory tail
#[derive(Clone)]
pub struct RollingLogger {
    file: Arc<Mutex<RollingFile>>,
    buffer: Arc<Mutex<LineBuffer>>,
}

impl RollingLogger {
    pub fn new(log_dir: impl AsRef<Path>, app_name: &str) -> Result<Self, String> {
        Self::with_limits(log_dir, app_name, DEFAULT_MAX_BYTES, DEFAULT_BUFFER_LINES)
    }

    pub fn with_limits(
        log_dir: impl AsRef<Path>,
        app_name: &str,
        max_bytes: u64,
        buffer_lines: usize,
    ) -> Result<Self, String> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)
            .map_err(|e| format!("Failed to create log dir {}: {}", log_dir.display(), e))?;

        let path = log_dir.join(format!("{}.log", app_name));
        let file = RollingFile::open(path, max_bytes)
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        Ok(Self {
            file: Arc::new(Mutex::new(file)),
            buffer: Arc::new(Mutex::new(LineBuffer {
                lines: VecDeque::with_capacity(buffer_lines),
                capacity: buffer_lines.max(1),
            })),
        })
    }

    /// Path of the active log file
    pub fn log_path(&self) -> Option<PathBuf> {
        self.file.lock().ok().map(|f| f.path.clone())
    }

    /// Most recent lines, oldest first
    pub fn recent(&self) -> Vec<String> {
        match self.buffer.lock() {
            Ok(buffer) => buffer.lines.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Per-event writer handed out to the tracing fmt layer
pub struct LogWriter {
    logger: RollingLogger,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        {
            let mut file = self
                .logger
                .file
                .lock()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
            file.write_chunk(buf)?;
        }

        if let Ok(mut buffer) = self.logger.buffer.lock() {
            buffer.push(&String::from_utf8_lossy(buf));
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self
            .logger
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        file.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingLogger {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            logger: self.clone(),
        }
    }
}

/// Install the global subscriber writing to `<log_dir>/<app_name>.log`
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    let logger = RollingLogger::new(&log_dir, app_name)?;

    tracing_subscriber::fmt()
        .with_writer(logger.clone())
        .with_ansi(false)
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))?;

    // Skip formatting of debug/trace records coming through the log bridge
    log::set_max_level(log::LevelFilter::Info);

    LOGGER
        .set(logger)
        .map_err(|_| "Logger already initialized".to_string())?;

    tracing::info!(
        target: "rolling_logger",
        "{} logging started at {}",
        app_name,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    Ok(())
}

fn ensure_initialized() -> Result<(), String> {
    if LOGGER.get().is_some() {
        Ok(())
    } else {
        Err("Logger not initialized".to_string())
    }
}

pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Recent lines from the global logger (empty before `init_logger`)
pub fn recent_logs() -> Vec<String> {
    LOGGER.get().map(|l| l.recent()).unwrap_or_default()
}

//! Rolling File Logger
//!
//! Writes formatted `tracing` output (and bridged `log` records) to a
//! size-rotated file set in a log directory:
//! `<app>.log` is the live file, `<app>.1.log` .. `<app>.N.log` are older.
//! The most recent lines are also kept in an in-memory circular buffer.

use std::collections::VecDeque;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;
pub const DEFAULT_MAX_FILES: usize = 5;
pub const DEFAULT_BUFFER_LINES: usize = 500;

static LOGGER: OnceLock<RollingWriter> = OnceLock::new();

/// Logger errors
#[derive(Debug)]
pub enum LoggerError {
    Io(io::Error),
    AlreadyInitialized,
    NotInitialized,
}

impl fmt::Display for LoggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerError::Io(e) => write!(f, "Log I/O error: {}", e),
            LoggerError::AlreadyInitialized => write!(f, "Logger already initialized"),
            LoggerError::NotInitialized => write!(f, "Logger not initialized"),
        }
    }
}

impl std::error::Error for LoggerError {}

impl From<io::Error> for LoggerError {
    fn from(e: io::Error) -> Self {
        LoggerError::Io(e)
    }
}

/// Rotation and buffer limits
#[derive(Debug, Clone, Copy)]
pub struct LoggerOptions {
    /// Rotate once the live file would grow past this size
    pub max_file_bytes: u64,
    /// Number of rotated files kept next to the live one
    pub max_files: usize,
    /// Lines kept in the in-memory ring
    pub buffer_lines: usize,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_files: DEFAULT_MAX_FILES,
            buffer_lines: DEFAULT_BUFFER_LINES,
        }
    }
}

struct RollingState {
    dir: PathBuf,
    app_name: String,
    options: LoggerOptions,
    file: File,
    written: u64,
    recent: VecDeque<String>,
    partial: String,
}

impl RollingState {
    fn path_for(&self, index: usize) -> PathBuf {
        rotated_path(&self.dir, &self.app_name, index)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let oldest = self.path_for(self.options.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (0..self.options.max_files).rev() {
            let from = self.path_for(index);
            if from.exists() {
                fs::rename(&from, self.path_for(index + 1))?;
            }
        }

        self.file = open_live(&self.path_for(0), true)?;
        self.written = 0;
        Ok(())
    }

    fn remember(&mut self, buf: &[u8]) {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            if self.recent.len() == self.options.buffer_lines {
                self.recent.pop_front();
            }
            self.recent.push_back(line.trim_end().to_string());
        }
    }
}

/// Cloneable writer handle over the rotated file set
#[derive(Clone)]
pub struct RollingWriter {
    state: Arc<Mutex<RollingState>>,
}

impl RollingWriter {
    /// Open (or append to) `<dir>/<app_name>.log`
    pub fn open(dir: &Path, app_name: &str, options: LoggerOptions) -> Result<Self, LoggerError> {
        fs::create_dir_all(dir)?;
        let live = rotated_path(dir, app_name, 0);
        let file = open_live(&live, false)?;
        let written = file.metadata()?.len();

        Ok(Self {
            state: Arc::new(Mutex::new(RollingState {
                dir: dir.to_path_buf(),
                app_name: app_name.to_string(),
                options,
                file,
                written,
                recent: VecDeque::with_capacity(options.buffer_lines),
                partial: String::new(),
            })),
        })
    }

    /// Most recent complete lines, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        match self.state.lock() {
            Ok(state) => state.recent.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Path of the live log file
    pub fn live_path(&self) -> Option<PathBuf> {
        self.state.lock().ok().map(|state| state.path_for(0))
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("log writer poisoned"))?;

        let incoming = buf.len() as u64;
        if state.written > 0 && state.written + incoming > state.options.max_file_bytes {
            state.rotate()?;
        }
        state.file.write_all(buf)?;
        state.written += incoming;
        state.remember(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("log writer poisoned"))?;
        state.file.flush()
    }
}

fn rotated_path(dir: &Path, app_name: &str, index: usize) -> PathBuf {
    if index == 0 {
        dir.join(format!("{}.log", app_name))
    } else {
        dir.join(format!("{}.{}.log", app_name, index))
    }
}

fn open_live(path: &Path, truncate: bool) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true);
    if truncate {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    options.open(path)
}

/// Local wall-clock timestamps
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Initialize the global logger with default limits
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), LoggerError> {
    init_logger_with(log_dir, app_name, LoggerOptions::default())
}

/// Initialize the global logger
///
/// Installs a `tracing` fmt subscriber (which also bridges the `log` facade)
/// writing into the rolling file set. Fails if a global subscriber is already set.
pub fn init_logger_with(log_dir: PathBuf, app_name: &str, options: LoggerOptions) -> Result<(), LoggerError> {
    if LOGGER.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }

    let writer = RollingWriter::open(&log_dir, app_name, options)?;
    let sink = writer.clone();

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(true)
        .with_timer(LocalTime)
        .with_writer(move || sink.clone())
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    LOGGER
        .set(writer)
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    info(&format!("{} logger started in {}", app_name, log_dir.display()))
}

fn ensure_init() -> Result<&'static RollingWriter, LoggerError> {
    installed(&LOGGER)
}

fn installed(cell: &OnceLock<RollingWriter>) -> Result<&RollingWriter, LoggerError> {
    cell.get().ok_or(LoggerError::NotInitialized)
}

pub fn info(msg: &str) -> Result<(), LoggerError> {
    ensure_init()?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), LoggerError> {
    ensure_init()?;
    tracing::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), LoggerError> {
    ensure_init()?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Recent lines from the global logger (empty before init)
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(|w| w.recent_lines()).unwrap_or_default()
}

/// Live log file of the global logger
pub fn log_path() -> Option<PathBuf> {
    LOGGER.get().and_then(|w| w.live_path())
}

//! wine-builds logging
//!
//! Leveled, timestamped log lines. When the CLI calls [`init_logger`] the lines
//! also go to a log file that starts with a system information header.

use chrono::Local;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::Command;
use std::sync::OnceLock;

use crate::glibc::{HostProbe, LddProbe};
use crate::runtime_wrap::is_flatpak;

static LOGGER: OnceLock<Mutex<WbLogger>> = OnceLock::new();

// ============================================================================
// System Information Detection
// ============================================================================

#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub app_version: String,
    pub distro: String,
    pub distro_version: String,
    pub kernel: String,
    pub glibc_version: String,
    pub sandbox: String,
}

impl SystemInfo {
    pub fn detect() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            distro: detect_os_release("NAME=").unwrap_or_else(|| "Unknown".to_string()),
            distro_version: detect_os_release("VERSION_ID=").unwrap_or_default(),
            kernel: detect_kernel(),
            glibc_version: detect_glibc(),
            sandbox: if is_flatpak() { "Flatpak" } else { "None" }.to_string(),
        }
    }

    pub fn to_log_header(&self) -> String {
        format!(
r#"================================================================================
wine-builds Log - {}
================================================================================
Application:   wine-builds v{}
System Info:
  Distro:      {} {}
  Kernel:      {}
  GLIBC:       {}
  Sandbox:     {}
================================================================================
"#,
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.app_version,
            self.distro,
            self.distro_version,
            self.kernel,
            self.glibc_version,
            self.sandbox
        )
    }
}

fn detect_os_release(key: &str) -> Option<String> {
    let file = File::open("/etc/os-release").ok()?;
    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .find(|line| line.starts_with(key))
        .map(|line| line.trim_start_matches(key).trim_matches('"').to_string())
}

fn detect_kernel() -> String {
    if let Ok(output) = Command::new("uname").arg("-r").output() {
        if output.status.success() {
            return String::from_utf8_lossy(&output.stdout).trim().to_string();
        }
    }
    "Unknown".to_string()
}

// Goes straight to the probe: the logger is not available yet while the header is built.
fn detect_glibc() -> String {
    LddProbe::default()
        .glibc_version()
        .map(|v| v.to_string())
        .unwrap_or_else(|_| "Unknown".to_string())
}

// ============================================================================
// Log Levels
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Info,
    Action, // CLI commands
    Warning,
    Error,
}

impl LogLevel {
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Info => "[INFO]",
            LogLevel::Action => "[ACTION]",
            LogLevel::Warning => "[WARNING]",
            LogLevel::Error => "[ERROR]",
        }
    }
}

pub fn format_line(level: LogLevel, message: &str) -> String {
    let timestamp = Local::now().format("%H:%M:%S");
    format!("[{}] {} {}", timestamp, level.prefix(), message)
}

// ============================================================================
// Logger
// ============================================================================

pub struct WbLogger {
    log_file: Option<File>,
}

impl WbLogger {
    pub fn new(log_dir: Option<PathBuf>) -> Self {
        let log_file = log_dir.and_then(|dir| {
            fs::create_dir_all(&dir).ok()?;
            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(format!("wine-builds_{}.log", timestamp)))
                .ok()
        });

        let mut logger = Self { log_file };

        if logger.log_file.is_some() {
            let header = SystemInfo::detect().to_log_header();
            logger.write_file(&header);
        }

        logger
    }

    fn write_file(&mut self, msg: &str) {
        if let Some(ref mut file) = self.log_file {
            let _ = writeln!(file, "{}", msg);
            let _ = file.flush();
        }
    }

    pub fn log(&mut self, level: LogLevel, message: &str) {
        let formatted = format_line(level, message);
        self.write_file(&formatted);
        // stdout is reserved for command output
        eprintln!("{}", formatted);
    }
}

// ============================================================================
// Global Logger Access
// ============================================================================

/// Initialize the global logger (call once at startup).
///
/// `to_file` enables the log file under `<app dir>/logs`.
pub fn init_logger(to_file: bool) {
    LOGGER.get_or_init(|| {
        let dir = to_file.then(|| crate::wb_path!("logs"));
        Mutex::new(WbLogger::new(dir))
    });
}

fn log(level: LogLevel, message: &str) {
    match LOGGER.get() {
        Some(logger) => logger.lock().log(level, message),
        None => eprintln!("{}", format_line(level, message)),
    }
}

// ============================================================================
// Convenience Logging Functions
// ============================================================================

pub fn log_info(message: &str) {
    log(LogLevel::Info, message);
}

pub fn log_action(message: &str) {
    log(LogLevel::Action, message);
}

pub fn log_warning(message: &str) {
    log(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log(LogLevel::Error, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        let line = format_line(LogLevel::Warning, "rate limited");
        assert!(line.ends_with("[WARNING] rate limited"));
        assert!(line.starts_with('['));
    }

    #[test]
    fn test_logger_without_file() {
        let mut logger = WbLogger::new(None);
        assert!(logger.log_file.is_none());
        logger.log(LogLevel::Info, "no file");
    }
}

//! File logging for embedders
//!
//! The core only logs through the `log` facade; an embedding application
//! that wants a log file installs [`FileLogger`] once at startup.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};

/// Writes `[timestamp] [LEVEL] message` lines to one file
pub struct FileLogger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl FileLogger {
    /// Open (and truncate) `file_path`, creating parent directories as needed
    pub fn new(file_path: &Path, level: LevelFilter) -> io::Result<Self> {
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(file_path)?;

        Ok(FileLogger {
            file: Mutex::new(file),
            level,
        })
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(
                file,
                "[{}] [{}] {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.args()
            );
            let _ = file.flush();
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// `<local data dir>/UserCss/usercss_core.log`
pub fn default_log_file_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let data_dir = dirs::data_local_dir().ok_or("Could not determine local data directory")?;
    Ok(data_dir.join("UserCss").join("usercss_core.log"))
}

/// Install a [`FileLogger`] writing to `file_path` at `Info` level, overwriting previous logs
pub fn init_logger(file_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let logger = FileLogger::new(file_path, LevelFilter::Info)?;
    log::set_boxed_logger(Box::new(logger)).map(|()| log::set_max_level(LevelFilter::Info))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use tempfile::TempDir;

    fn write(logger: &FileLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .args(format_args!("{}", message))
                .level(level)
                .target("usercss_core")
                .build(),
        );
    }

    #[test]
    fn test_writes_formatted_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("core.log");
        let logger = FileLogger::new(&path, LevelFilter::Debug).unwrap();

        write(&logger, Level::Warn, "Legacy scoping syntax");
        logger.flush();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("] [WARN] Legacy scoping syntax"));
        assert!(content.starts_with('['));
    }

    #[test]
    fn test_filters_below_level() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("core.log");
        let logger = FileLogger::new(&path, LevelFilter::Info).unwrap();

        write(&logger, Level::Debug, "noise");
        write(&logger, Level::Error, "Style parse failed");

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("noise"));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_truncates_previous_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("core.log");
        fs::write(&path, "old run\n").unwrap();

        let logger = FileLogger::new(&path, LevelFilter::Info).unwrap();
        write(&logger, Level::Info, "new run");

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("old run"));
        assert!(content.contains("new run"));
    }

    #[test]
    fn test_default_path_layout() {
        if let Ok(path) = default_log_file_path() {
            assert!(path.ends_with(Path::new("UserCss").join("usercss_core.log")));
        }
    }
}

//! Logging setup for the binary and the demos.
//!
//! The library itself only talks to the `log` facade; this module wires the facade to a
//! `simplelog` terminal logger and, optionally, to a timestamped log file.
use chrono::Local;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::{Path, PathBuf};

/// `log_2025-01-31_12-00-00.txt` inside `dir`
pub fn log_file_name(dir: &Path) -> PathBuf {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    dir.join(format!("log_{}.txt", date_and_time))
}

/// Installs the global logger. Messages go to the terminal, and to a file in `log_dir`
/// when one is given. Returns the path of the log file if it was created.
/// A second call is harmless: the logger already installed stays in place.
pub fn init_logger(level: LevelFilter, log_dir: Option<&Path>) -> Option<PathBuf> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));

    let mut file_path = None;
    if let Some(dir) = log_dir {
        let name = log_file_name(dir);
        if let Ok(file) = File::create(&name) {
            loggers.push(WriteLogger::new(level, Config::default(), file));
            file_path = Some(name);
        }
    }

    let _ = CombinedLogger::init(loggers);
    file_path
}

/// `off`, `error`, `warn`, `info`, `debug` or `trace`, any case
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    level.trim().parse::<LevelFilter>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" WARN "), Some(LevelFilter::Warn));
        assert_eq!(parse_level("off"), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_log_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let name = log_file_name(dir.path());
        assert_eq!(name.parent(), Some(dir.path()));
        let file_name = name.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("log_"));
        assert!(file_name.ends_with(".txt"));
    }

    #[test]
    fn test_init_logger_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = init_logger(LevelFilter::Info, Some(dir.path()));
        let path = path.unwrap();
        assert!(path.exists());
    }
}

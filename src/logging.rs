//! Log setup
//!
//! The terminal belongs to the dashboard, so tracing output goes to a file in
//! the data directory. The filter is read from `WEATHERDASH_LOG` and defaults
//! to `info`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "WEATHERDASH_LOG";

const LOG_FILE: &str = "weatherdash.log";
const DEFAULT_FILTER: &str = "info";

/// Platform data directory used for the log file
pub fn default_log_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "weatherdash").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Builds the filter from directives, falling back to the default on absence or error
pub fn build_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber writing to `<dir>/weatherdash.log`.
///
/// Returns the log file path.
pub fn init(dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let directives = std::env::var(LOG_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(directives.as_deref()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_build_filter_defaults_to_info() {
        assert_eq!(build_filter(None).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_build_filter_uses_directives() {
        assert_eq!(
            build_filter(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
    }

    #[test]
    fn test_default_log_dir_uses_project_name() {
        if let Some(dir) = default_log_dir() {
            assert!(dir.to_string_lossy().contains("weatherdash"));
        }
    }
}

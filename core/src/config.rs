// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::path::{Path, PathBuf};

use jiff::tz::TimeZone;
use taskbridge_caldav::CalDavConfig;

use crate::error::SyncError;

/// The name of the TaskBridge application.
pub const APP_NAME: &str = "taskbridge";

/// File name of the snapshot database inside the state directory.
pub const DB_FILE_NAME: &str = "taskbridge.db";

/// Configuration for the synchronization engine.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Names of the lists and calendars to keep in sync.
    #[serde(default)]
    pub sync: Vec<String>,

    /// Only log what would change.
    #[serde(default)]
    pub dry_run: bool,

    /// Directory for storing application state.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,

    /// IANA name of the time zone local dates are interpreted in. Defaults to
    /// the system time zone.
    #[serde(default)]
    pub timezone: Option<String>,

    /// The `CalDAV` server to synchronize with.
    pub caldav: CalDavConfig,
}

impl Config {
    /// Normalize the configuration.
    pub fn normalize(&mut self) -> Result<(), Box<dyn Error>> {
        match &self.state_dir {
            Some(a) => {
                self.state_dir = Some(
                    expand_path(a)
                        .map_err(|e| format!("Failed to expand state directory path: {e}"))?,
                );
            }

            None => match get_state_dir() {
                Ok(a) => self.state_dir = Some(a.join(APP_NAME)),
                Err(e) => tracing::warn!(err = %e, "failed to get state directory"),
            },
        }

        self.sync.retain(|name| !name.trim().is_empty());
        Ok(())
    }

    /// The time zone local dates are interpreted in.
    pub fn timezone(&self) -> Result<TimeZone, SyncError> {
        match &self.timezone {
            Some(name) => TimeZone::get(name)
                .map_err(|e| SyncError::Config(format!("unknown time zone {name:?}: {e}"))),
            None => Ok(TimeZone::system()),
        }
    }

    /// Path of the snapshot database, or `None` to keep it in memory.
    pub fn db_path(&self) -> Option<PathBuf> {
        self.state_dir.as_ref().map(|dir| dir.join(DB_FILE_NAME))
    }
}

/// Handle tilde (~) and environment variables in the path
pub fn expand_path(path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let path = path.to_str().ok_or("Invalid path")?;

    let home_prefixes: &[&str] = if cfg!(unix) {
        &["~/", "$HOME/", "${HOME}/"]
    } else {
        &[r"~\", "~/", r"%UserProfile%\", r"%UserProfile%/"]
    };
    if let Some(rest) = strip_any_prefix(path, home_prefixes) {
        return Ok(get_home_dir()?.join(rest));
    }

    let config_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_CONFIG_HOME/", "${XDG_CONFIG_HOME}/"]
    } else {
        &[r"%LOCALAPPDATA%\", "%LOCALAPPDATA%/"]
    };
    if let Some(rest) = strip_any_prefix(path, config_prefixes) {
        return Ok(get_config_dir()?.join(rest));
    }

    Ok(path.into())
}

fn strip_any_prefix<'a>(path: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|p| path.strip_prefix(p))
}

fn get_home_dir() -> Result<PathBuf, Box<dyn Error>> {
    dirs::home_dir().ok_or("User-specific home directory not found".into())
}

/// The user configuration directory, `$XDG_CONFIG_HOME` on unix.
pub fn get_config_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(windows)]
    let config_dir = dirs::config_dir();
    config_dir.ok_or("User-specific config directory not found".into())
}

fn get_state_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let state_dir = xdg::BaseDirectories::new().get_state_home();
    #[cfg(windows)]
    let state_dir = dirs::data_dir();
    state_dir.ok_or("User-specific state directory not found".into())
}

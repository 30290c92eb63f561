//! Where the rotator keeps its files.
//!
//! Unix: `~/.config/rotator/` for `config.toml` and `~/.local/share/rotator/`
//! for logs and the roster store. Windows uses the platform directories.
//! `ROTATOR_HOME` overrides both and puts everything in one directory.

use std::path::PathBuf;

const APP_DIR: &str = "rotator";
pub const HOME_ENV: &str = "ROTATOR_HOME";

fn home_override() -> Option<PathBuf> {
    std::env::var_os(HOME_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn under_home(parts: &[&str]) -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.extend(parts);
    path.join(APP_DIR)
}

pub fn data_dir() -> PathBuf {
    if let Some(home) = home_override() {
        return home;
    }
    if cfg!(windows) {
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| under_home(&[]))
    } else {
        under_home(&[".local", "share"])
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(home) = home_override() {
        return home;
    }
    if cfg!(windows) {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| under_home(&[]))
    } else {
        under_home(&[".config"])
    }
}

// planlector platform paths for Linux
// Config: ~/.config/planlector
// Data:   ~/.local/share/planlector

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Uses `$XDG_CONFIG_HOME/planlector` if set, otherwise `~/.config/planlector`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("planlector"),
        _ => home_dir().join(".config").join("planlector"),
    }
}

/// Uses `$XDG_DATA_HOME/planlector` if set, otherwise `~/.local/share/planlector`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("planlector"),
        _ => home_dir().join(".local").join("share").join("planlector"),
    }
}

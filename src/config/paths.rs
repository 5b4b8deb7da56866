use directories::ProjectDirs;
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "interpreter.json";

pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "Sievers").map(|d| d.config_dir().to_path_buf())
}

pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "Sievers").map(|d| d.data_dir().to_path_buf())
}

/// `<config dir>/interpreter.json`
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE))
}

/// Default root of the script repository.
pub fn scripts_dir() -> Option<PathBuf> {
    data_dir().map(|d| d.join("scripts"))
}

// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod config;

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

pub use self::config::{Config, LogConfig, LogValue};

/// Environment variable naming a configuration file.
pub const CONFIG_PATH_ENV: &str = "ARCHIVE_LIBRARY_CONFIG";

/// Where the configuration file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigPath {
    Cli(PathBuf),
    Env(PathBuf),
    Project(PathBuf),
}

impl ConfigPath {
    pub fn as_path(&self) -> &Path {
        match self {
            ConfigPath::Cli(path) | ConfigPath::Env(path) | ConfigPath::Project(path) => path,
        }
    }
}

/// Looks for a configuration file given on the command line, then in
/// [`CONFIG_PATH_ENV`], then in the platform configuration directory.
pub fn find_config_path(config: Option<&PathBuf>) -> Option<ConfigPath> {
    if let Some(path) = config {
        return Some(ConfigPath::Cli(path.to_owned()));
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(ConfigPath::Env(PathBuf::from(path)));
    }
    if let Some(dirs) = ProjectDirs::from("org", "ArchiveLibrary", "archive-library") {
        let path = dirs.config_dir().join("config.toml");
        if path.exists() {
            return Some(ConfigPath::Project(path));
        }
    }
    None
}

// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};

use crate::archive::ArchiveAddress;
use crate::db::IndexBackend;

/// Where the library keeps its data and how long it waits on archives.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, smart_default::SmartDefault)]
#[serde(default)]
pub struct LibraryConfig {
    /// Library root. Holds the archive storage root and the index.
    #[default(default_root())]
    pub root: PathBuf,
    /// Directory under `root` holding one storage directory per archive,
    /// named by the archive's key.
    #[default(String::from("Archives"))]
    pub storage_dir: String,
    /// Directory under `root` holding the index database.
    #[default(String::from("Library"))]
    pub index_dir: String,
    /// Upper bound on every wait for an archive to become ready.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[default(Duration::from_secs(30))]
    pub ready_timeout: Duration,
    pub index_backend: IndexBackend,
}

fn default_root() -> PathBuf {
    ProjectDirs::from("org", "ArchiveLibrary", "archive-library")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".archive-library"))
}

impl LibraryConfig {
    /// Config rooted at `root`, defaults otherwise.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.root.join(&self.storage_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_dir)
    }

    /// Storage directory of the archive at `address`.
    pub fn archive_path(&self, address: &ArchiveAddress) -> PathBuf {
        archive_path(&self.storage_path(), address)
    }
}

pub(super) fn archive_path(storage_root: &Path, address: &ArchiveAddress) -> PathBuf {
    storage_root.join(address.to_hex())
}

// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::PathBuf;

use archive_library::{ArchiveRecord, LibraryConfig, db::IndexBackend, library::ArchiveIndex};
use assert_cmd::{Command, cargo::cargo_bin_cmd};
use tempfile::TempDir;

pub fn tool() -> Command {
    let mut cmd = cargo_bin_cmd!("archive-library");
    cmd.env_remove("ARCHIVE_LIBRARY_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// Writes a config rooting the library in a fresh temporary directory.
pub fn create_tmp_config() -> (PathBuf, TempDir) {
    let temp_dir = tempfile::tempdir().expect("couldn't create temp dir");

    let config = format!(
        r#"
[library]
root = "{}"
ready_timeout = 5
"#,
        temp_dir.path().display()
    );

    let config_file = temp_dir.path().join("config.toml");
    std::fs::write(&config_file, config).expect("couldn't write config");
    (config_file, temp_dir)
}

/// Fills the on-disk index of the library rooted in `root`.
pub fn seed_index(root: &TempDir, records: &[ArchiveRecord]) {
    let config = LibraryConfig::with_root(root.path());
    let index = ArchiveIndex::open(IndexBackend::ParityDb, &config.index_path())
        .expect("couldn't open index");
    for record in records {
        index.put(&record.url, record).expect("couldn't write record");
    }
}

pub fn record(url: &str, owner: bool, title: Option<&str>) -> ArchiveRecord {
    ArchiveRecord {
        directory: PathBuf::from("/tmp/archives").join(url.len().to_string()),
        url: url.into(),
        owner,
        title: title.map(Into::into),
        description: None,
    }
}

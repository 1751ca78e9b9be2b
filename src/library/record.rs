// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::archive::ArchiveHandle;

/// Entry of the persisted archive index, keyed by [`ArchiveRecord::url`].
///
/// The canonical address is deliberately absent: it is re-resolved from the
/// URL on every load so that renamed or redirected names heal themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    /// Storage directory handed to the engine.
    pub directory: PathBuf,
    pub url: String,
    /// Whether this process holds the write capability.
    pub owner: bool,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ArchiveRecord {
    /// Builds a record from the metadata `handle` reports about itself.
    pub async fn capture<H: ArchiveHandle + ?Sized>(
        handle: &H,
        storage_root: &Path,
    ) -> anyhow::Result<Self> {
        let info = handle.info().await?;
        Ok(Self {
            directory: storage_root.join(info.address.to_hex()),
            url: info.url,
            owner: info.is_owner,
            title: info.title,
            description: info.description,
        })
    }
}

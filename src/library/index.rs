// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{path::Path, sync::Arc};

use anyhow::Context as _;
use tracing::warn;

use super::ArchiveRecord;
use crate::db::{IndexBackend, IndexStore, IndexStoreExt, db_engine::open_index_store};

/// Durable mapping from archive URL to [`ArchiveRecord`].
#[derive(Clone)]
pub struct ArchiveIndex {
    store: Arc<dyn IndexStore>,
}

impl ArchiveIndex {
    pub fn new(store: Arc<dyn IndexStore>) -> Self {
        Self { store }
    }

    /// Opens (or creates) the index stored in `path`.
    pub fn open(backend: IndexBackend, path: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create index directory {}", path.display()))?;
        Ok(Self::new(open_index_store(backend, path)?))
    }

    /// Every record in the index. Entries that no longer deserialize are
    /// skipped.
    pub fn list(&self) -> anyhow::Result<Vec<ArchiveRecord>> {
        let mut records: Vec<ArchiveRecord> = vec![];
        for (url, bytes) in self.store.entries()? {
            match serde_json::from_slice(&bytes) {
                Ok(record) => records.push(record),
                Err(e) => warn!(%url, "skipping malformed index entry: {e}"),
            }
        }
        records.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(records)
    }

    pub fn get(&self, url: &str) -> anyhow::Result<Option<ArchiveRecord>> {
        self.store.read_obj(url)
    }

    /// Inserts or replaces the record stored under `url`.
    pub fn put(&self, url: &str, record: &ArchiveRecord) -> anyhow::Result<()> {
        self.store.write_obj(url, record)
    }

    pub fn delete(&self, url: &str) -> anyhow::Result<()> {
        self.store.delete(url)
    }
}

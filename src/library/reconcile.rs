// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Startup reconciliation of the index against the archives on disk.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use futures::future::join_all;
use itertools::Itertools as _;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{ArchiveIndex, ArchiveRecord, HandleCache, LibraryConfig, capture_entry, wait_ready};
use crate::archive::{ArchiveAddress, ArchiveEngine, ArchiveHandle as _, NameResolver};

/// What startup did with every record and storage directory it looked at.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Addresses of indexed archives that were opened.
    pub loaded: Vec<ArchiveAddress>,
    /// Owned archives found on disk and added to the index.
    pub registered: Vec<ArchiveAddress>,
    /// Archives found on disk that are not owned, closed again.
    pub discarded: Vec<ArchiveAddress>,
    /// Items that failed and were skipped. Failed records are pruned from the index.
    pub failures: Vec<ReconcileFailure>,
}

#[derive(Debug)]
pub struct ReconcileFailure {
    pub item: ReconcileItem,
    pub reason: anyhow::Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileItem {
    /// An index record, by URL.
    Record { url: String },
    /// A storage directory found while scanning for owned archives.
    Candidate { path: PathBuf },
}

enum Salvage {
    Registered(ArchiveAddress),
    Discarded(ArchiveAddress),
}

pub(super) struct Reconciler<'a, E: ArchiveEngine> {
    pub engine: &'a E,
    pub resolver: &'a dyn NameResolver,
    pub cache: &'a HandleCache<E::Handle>,
    pub index: &'a ArchiveIndex,
    pub config: &'a LibraryConfig,
}

impl<E: ArchiveEngine> Reconciler<'_, E> {
    /// Scans the storage root for archives this process owns and registers
    /// them. Used when the index is empty.
    pub async fn scan_owned(&self) -> anyhow::Result<ReconcileReport> {
        let storage_root = self.config.storage_path();
        tokio::fs::create_dir_all(&storage_root)
            .await
            .with_context(|| format!("failed to create {}", storage_root.display()))?;

        let candidates = WalkDir::new(&storage_root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.into_path())
            .collect_vec();
        info!("Scanning {} storage directories for owned archives", candidates.len());

        let storage_root = &storage_root;
        let outcomes = join_all(candidates.into_iter().map(|path| async move {
            let outcome = self.salvage(&path, storage_root).await;
            (path, outcome)
        }))
        .await;

        let mut report = ReconcileReport::default();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(Salvage::Registered(address)) => report.registered.push(address),
                Ok(Salvage::Discarded(address)) => report.discarded.push(address),
                Err(reason) => {
                    warn!("Skipping storage directory {}: {reason:#}", path.display());
                    report.failures.push(ReconcileFailure {
                        item: ReconcileItem::Candidate { path },
                        reason,
                    });
                }
            }
        }
        Ok(report)
    }

    async fn salvage(&self, path: &Path, storage_root: &Path) -> anyhow::Result<Salvage> {
        let address: ArchiveAddress = path
            .file_name()
            .and_then(|name| name.to_str())
            .context("storage directory name is not valid UTF-8")?
            .parse()?;
        let handle = self.engine.open(&address, path).await?;
        if let Err(e) = wait_ready(&*handle, self.config.ready_timeout).await {
            if let Err(close) = handle.close().await {
                debug!(%address, "failed to close archive: {close:#}");
            }
            return Err(e.into());
        }

        if !handle.writable() {
            debug!(%address, "discarding archive that is not owned");
            handle.close().await?;
            return Ok(Salvage::Discarded(address));
        }

        self.cache.put(address, Arc::clone(&handle));
        let record = capture_entry(self.index, &*handle, storage_root).await?;
        info!("Registered owned archive {}", record.url);
        Ok(Salvage::Registered(address))
    }

    /// Opens every indexed archive. Records that fail to resolve, open or
    /// become ready are removed from the index.
    pub async fn load_records(&self, records: Vec<ArchiveRecord>) -> ReconcileReport {
        info!("Loading {} archives from the index", records.len());
        let outcomes = join_all(records.into_iter().map(|record| async move {
            let outcome = self.load(&record).await;
            if outcome.is_err()
                && let Err(e) = self.index.delete(&record.url)
            {
                warn!("Failed to prune {} from the index: {e:#}", record.url);
            }
            (record, outcome)
        }))
        .await;

        let mut report = ReconcileReport::default();
        for (record, outcome) in outcomes {
            match outcome {
                Ok(address) => report.loaded.push(address),
                Err(reason) => {
                    warn!("Pruned {} from the index: {reason:#}", record.url);
                    report.failures.push(ReconcileFailure {
                        item: ReconcileItem::Record { url: record.url },
                        reason,
                    });
                }
            }
        }
        report
    }

    async fn load(&self, record: &ArchiveRecord) -> anyhow::Result<ArchiveAddress> {
        let address = self.resolver.resolve(&record.url).await?;
        let handle = self
            .cache
            .get_or_open(
                &address,
                |address| self.engine.is_open(address),
                || self.engine.open(&address, &record.directory),
            )
            .await?;
        if let Err(e) = wait_ready(&*handle, self.config.ready_timeout).await {
            self.cache.remove(&address);
            if self.engine.is_open(&address)
                && let Err(close) = self.engine.close(&address).await
            {
                debug!(%address, "failed to close archive: {close:#}");
            }
            return Err(e.into());
        }
        Ok(address)
    }
}

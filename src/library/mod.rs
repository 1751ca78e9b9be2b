// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The archive library: a persisted index of the archives the user cares
//! about, kept consistent with a cache of live handles to them.

mod cache;
mod config;
mod errors;
mod index;
mod reconcile;
mod record;

use std::{
    path::Path,
    sync::{Arc, OnceLock},
    time::Duration,
};

use anyhow::Context as _;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub use cache::{HandleCache, OpenArchive};
pub use config::LibraryConfig;
pub use errors::Error;
pub use index::ArchiveIndex;
pub use reconcile::{ReconcileFailure, ReconcileItem, ReconcileReport};
pub use record::ArchiveRecord;

use crate::archive::{
    ArchiveAddress, ArchiveEngine, ArchiveHandle, ArchiveManifest, NameResolver, manifest_for_fork,
};
use crate::migration::{LibraryMigration, VersionedMigration};
use reconcile::Reconciler;

/// Initialization progress of an [`ArchiveLibrary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryState {
    Unstarted,
    MigrationInProgress,
    IndexLoading,
    OwnershipScan,
    RecordReconciliation,
    Ready,
    Failed(String),
}

/// Registry of archives backed by an [`ArchiveEngine`].
///
/// Call [`ArchiveLibrary::init`] once before anything else. Operations issued
/// before `init` starts fail with [`Error::NotInitialized`]; operations issued
/// while it runs wait for it to finish.
pub struct ArchiveLibrary<E: ArchiveEngine> {
    config: LibraryConfig,
    engine: Arc<E>,
    resolver: Arc<dyn NameResolver>,
    migration: Arc<dyn LibraryMigration<E>>,
    cache: HandleCache<E::Handle>,
    index: OnceLock<ArchiveIndex>,
    state: watch::Sender<LibraryState>,
    pending_writes: PendingWrites,
}

impl<E: ArchiveEngine> ArchiveLibrary<E> {
    pub fn new(config: LibraryConfig, engine: Arc<E>, resolver: Arc<dyn NameResolver>) -> Self {
        Self {
            config,
            engine,
            resolver,
            migration: Arc::new(VersionedMigration::<E>::current()),
            cache: HandleCache::new(),
            index: OnceLock::new(),
            state: watch::Sender::new(LibraryState::Unstarted),
            pending_writes: PendingWrites::default(),
        }
    }

    /// Replaces the migration run at the start of [`ArchiveLibrary::init`].
    pub fn with_migration(mut self, migration: Arc<dyn LibraryMigration<E>>) -> Self {
        self.migration = migration;
        self
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn state(&self) -> LibraryState {
        self.state.borrow().clone()
    }

    /// Migrates the library root, opens the index and reconciles it with
    /// the archives on disk.
    ///
    /// Only a failing migration or an index that cannot be opened fail the
    /// whole initialization. Individual archives that fail are reported in
    /// the returned [`ReconcileReport`].
    pub async fn init(&self) -> Result<ReconcileReport, Error> {
        let started = self.state.send_if_modified(|state| match state {
            LibraryState::Unstarted => {
                *state = LibraryState::MigrationInProgress;
                true
            }
            _ => false,
        });
        if !started {
            return Err(Error::AlreadyInitialized);
        }

        match self.run_init().await {
            Ok(report) => {
                info!(
                    "Archive library ready: {} loaded, {} registered, {} skipped",
                    report.loaded.len(),
                    report.registered.len(),
                    report.failures.len()
                );
                self.state.send_replace(LibraryState::Ready);
                Ok(report)
            }
            Err(e) => {
                self.state.send_replace(LibraryState::Failed(format!("{e:#}")));
                Err(e.into())
            }
        }
    }

    async fn run_init(&self) -> anyhow::Result<ReconcileReport> {
        let root = &self.config.root;
        tokio::fs::create_dir_all(root)
            .await
            .with_context(|| format!("failed to create library root {}", root.display()))?;

        info!("Running library migrations in {}", root.display());
        self.migration
            .run(root, &self.engine)
            .await
            .context("library migration failed")?;

        self.state.send_replace(LibraryState::IndexLoading);
        let (backend, path) = (self.config.index_backend, self.config.index_path());
        let index = tokio::task::spawn_blocking(move || ArchiveIndex::open(backend, &path))
            .await
            .context("index loading task panicked")??;
        let index = self.index.get_or_init(|| index);
        let records = index.list()?;

        let reconciler = Reconciler {
            engine: &*self.engine,
            resolver: &*self.resolver,
            cache: &self.cache,
            index,
            config: &self.config,
        };
        if records.is_empty() {
            self.state.send_replace(LibraryState::OwnershipScan);
            reconciler.scan_owned().await
        } else {
            self.state.send_replace(LibraryState::RecordReconciliation);
            Ok(reconciler.load_records(records).await)
        }
    }

    /// Waits for initialization and returns the index.
    async fn ready_index(&self) -> Result<&ArchiveIndex, Error> {
        let mut state = self.state.subscribe();
        let state = state
            .wait_for(|state| {
                matches!(
                    state,
                    LibraryState::Unstarted | LibraryState::Ready | LibraryState::Failed(_)
                )
            })
            .await
            .map_err(|_| Error::NotInitialized)?
            .clone();
        match state {
            LibraryState::Ready => self.index.get().ok_or(Error::NotInitialized),
            LibraryState::Failed(reason) => Err(Error::InitFailed(reason)),
            _ => Err(Error::NotInitialized),
        }
    }

    /// Every record in the index.
    pub async fn list_library(&self) -> Result<Vec<ArchiveRecord>, Error> {
        Ok(self.ready_index().await?.list()?)
    }

    /// Returns the live handle for `url`, opening a temporary one if needed.
    /// Temporary handles are not added to the index.
    pub async fn get_archive(&self, url: &str) -> Result<Arc<E::Handle>, Error> {
        self.ready_index().await?;
        let address = self.resolver.resolve(url).await?;
        self.open_cached(&address).await
    }

    async fn open_cached(&self, address: &ArchiveAddress) -> Result<Arc<E::Handle>, Error> {
        let open = || async {
            let storage_root = self.config.storage_path();
            tokio::fs::create_dir_all(&storage_root)
                .await
                .with_context(|| format!("failed to create {}", storage_root.display()))?;
            debug!(%address, "opening archive");
            let handle = self
                .engine
                .open(address, &config::archive_path(&storage_root, address))
                .await?;
            Ok::<_, Error>(handle)
        };
        self.cache
            .get_or_open(address, |address| self.engine.is_open(address), open)
            .await
    }

    /// Creates a new owned archive and adds it to the library. Returns its
    /// URL.
    ///
    /// The index write happens in the background; use
    /// [`ArchiveLibrary::settled`] to wait for it.
    pub async fn create_archive(&self, manifest: ArchiveManifest) -> Result<String, Error> {
        self.ready_index().await?;
        let storage_root = self.config.storage_path();
        tokio::fs::create_dir_all(&storage_root)
            .await
            .with_context(|| format!("failed to create {}", storage_root.display()))?;

        let handle = self.engine.create(&storage_root, manifest).await?;
        let url = self.adopt(handle).await?;
        info!("Created archive {url}");
        Ok(url)
    }

    /// Creates a new owned archive derived from the archive at `source_url`.
    ///
    /// The fork keeps the source's `web_root`, `fallback_page` and `links`
    /// unless `options` overrides them. No other field of the source's
    /// manifest is carried over.
    pub async fn fork_archive(
        &self,
        source_url: &str,
        options: ArchiveManifest,
    ) -> Result<String, Error> {
        self.ready_index().await?;
        let address = self.resolver.resolve(source_url).await?;
        let source = self.open_cached(&address).await?;
        wait_ready(&*source, self.config.ready_timeout).await?;
        let manifest = manifest_for_fork(&source.manifest().await?, options);

        let storage_root = self.config.storage_path();
        let handle = self.engine.fork(&source, &storage_root, manifest).await?;
        let url = self.adopt(handle).await?;
        info!("Forked {source_url} into {url}");
        Ok(url)
    }

    /// Caches a freshly created handle and records it in the index.
    async fn adopt(&self, handle: Arc<E::Handle>) -> Result<String, Error> {
        let url = handle.url();
        let address = self.resolver.resolve(&url).await?;
        self.cache.put(address, Arc::clone(&handle));
        self.update_library_entry(handle);
        Ok(url)
    }

    /// Removes `url` from the library, closing its handle if open. Returns
    /// the removed record.
    pub async fn remove(&self, url: &str) -> Result<ArchiveRecord, Error> {
        let index = self.ready_index().await?;
        let record = index
            .get(url)?
            .ok_or_else(|| Error::NotInLibrary(url.to_owned()))?;
        let address = self.resolver.resolve(url).await?;
        self.close_address(&address).await?;
        index.delete(url)?;
        info!("Removed {url} from the library");
        Ok(record)
    }

    /// Closes the archive at `url`. Closing an archive that is not open is
    /// not an error.
    pub async fn close(&self, url: &str) -> Result<(), Error> {
        self.ready_index().await?;
        let address = self.resolver.resolve(url).await?;
        self.close_address(&address).await
    }

    async fn close_address(&self, address: &ArchiveAddress) -> Result<(), Error> {
        let closed = match self.engine.is_open(address) {
            true => self.engine.close(address).await,
            false => Ok(()),
        };
        self.cache.remove(address);
        debug!(%address, "closed archive");
        Ok(closed?)
    }

    /// Snapshot of every live handle. Handles the engine has closed since
    /// they were cached are dropped first.
    pub fn get_open_archives(&self) -> Vec<OpenArchive> {
        self.cache.retain_live(|address| self.engine.is_open(address));
        self.cache.enumerate()
    }

    /// Records the metadata of `handle` in the index, in the background.
    /// Failures are logged and otherwise ignored.
    pub fn update_library_entry(&self, handle: Arc<E::Handle>) {
        let Some(index) = self.index.get().cloned() else {
            warn!("Not recording {}: the index is not open yet", handle.url());
            return;
        };
        let storage_root = self.config.storage_path();
        let pending = self.pending_writes.start();
        tokio::spawn(async move {
            let _pending = pending;
            if let Err(e) = capture_entry(&index, &*handle, &storage_root).await {
                warn!("Failed to record {} in the index: {e:#}", handle.url());
            }
        });
    }

    /// Resolves once every background index write started so far has
    /// finished.
    pub async fn settled(&self) {
        self.pending_writes.settled().await
    }
}

async fn wait_ready<H: ArchiveHandle + ?Sized>(handle: &H, timeout: Duration) -> Result<(), Error> {
    match tokio::time::timeout(timeout, handle.ready()).await {
        Ok(ready) => Ok(ready?),
        Err(_) => Err(Error::ReadyTimeout {
            address: handle.address(),
            timeout,
        }),
    }
}

async fn capture_entry<H: ArchiveHandle + ?Sized>(
    index: &ArchiveIndex,
    handle: &H,
    storage_root: &Path,
) -> anyhow::Result<ArchiveRecord> {
    let record = ArchiveRecord::capture(handle, storage_root).await?;
    index.put(&record.url, &record)?;
    Ok(record)
}

/// Number of background index writes in flight.
#[derive(Clone)]
struct PendingWrites(Arc<watch::Sender<usize>>);

impl Default for PendingWrites {
    fn default() -> Self {
        Self(Arc::new(watch::Sender::new(0)))
    }
}

impl PendingWrites {
    fn start(&self) -> PendingWrite {
        self.0.send_modify(|count| *count += 1);
        PendingWrite(Arc::clone(&self.0))
    }

    async fn settled(&self) {
        let mut count = self.0.subscribe();
        // the sender lives in `self`, so waiting cannot fail
        let _ = count.wait_for(|count| *count == 0).await;
    }
}

struct PendingWrite(Arc<watch::Sender<usize>>);

impl Drop for PendingWrite {
    fn drop(&mut self) {
        self.0.send_modify(|count| *count -= 1);
    }
}

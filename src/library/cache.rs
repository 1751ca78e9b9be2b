// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{future::Future, sync::Arc};

use ahash::HashMap;
use chrono::{DateTime, Utc};
use itertools::Itertools as _;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::archive::{ArchiveAddress, ArchiveHandle};

/// Snapshot of one live handle, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenArchive {
    pub address: ArchiveAddress,
    pub url: String,
    pub last_used: DateTime<Utc>,
}

struct CacheEntry<H> {
    handle: Arc<H>,
    last_used: DateTime<Utc>,
}

/// Live archive handles keyed by canonical address, with the time each was
/// last handed out.
///
/// At most one handle is constructed per address: concurrent misses for the
/// same address queue on a per-address lock and all but the first find the
/// handle the first one stored.
pub struct HandleCache<H> {
    entries: Mutex<HashMap<ArchiveAddress, CacheEntry<H>>>,
    in_flight: InFlightMap,
}

impl<H> Default for HandleCache<H> {
    fn default() -> Self {
        Self {
            entries: Default::default(),
            in_flight: Default::default(),
        }
    }
}

impl<H: ArchiveHandle> HandleCache<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached handle, if any, and marks it as used now.
    pub fn touch(&self, address: &ArchiveAddress) -> Option<Arc<H>> {
        self.touch_live(address, |_| true)
    }

    /// Like [`HandleCache::touch`], but evicts the entry instead of returning
    /// it when `live` reports the handle closed.
    fn touch_live(
        &self,
        address: &ArchiveAddress,
        live: impl Fn(&ArchiveAddress) -> bool,
    ) -> Option<Arc<H>> {
        let mut entries = self.entries.lock();
        if entries.contains_key(address) && !live(address) {
            debug!(%address, "evicting closed handle");
            entries.remove(address);
            return None;
        }
        let entry = entries.get_mut(address)?;
        entry.last_used = Utc::now().max(entry.last_used);
        Some(Arc::clone(&entry.handle))
    }

    /// Returns the cached handle for `address`, constructing it with `open`
    /// on a miss. A cached handle that `live` reports closed counts as a
    /// miss.
    pub async fn get_or_open<L, F, Fut, E>(
        &self,
        address: &ArchiveAddress,
        live: L,
        open: F,
    ) -> Result<Arc<H>, E>
    where
        L: Fn(&ArchiveAddress) -> bool,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<H>, E>>,
    {
        if let Some(handle) = self.touch_live(address, &live) {
            debug!(%address, "handle cache hit");
            return Ok(handle);
        }

        let lock = InFlight::join(&self.in_flight, *address);
        let _guard = lock.lock().await;
        match self.touch_live(address, &live) {
            Some(handle) => Ok(handle),
            None => {
                debug!(%address, "handle cache miss");
                let opened = open().await;
                if let Ok(handle) = &opened {
                    self.put(*address, Arc::clone(handle));
                }
                opened
            }
        }
    }

    /// Stores `handle`, replacing any handle cached for `address`.
    pub fn put(&self, address: ArchiveAddress, handle: Arc<H>) {
        self.entries.lock().insert(
            address,
            CacheEntry {
                handle,
                last_used: Utc::now(),
            },
        );
    }

    /// Evicts `address` without closing its handle.
    pub fn remove(&self, address: &ArchiveAddress) -> Option<Arc<H>> {
        self.entries.lock().remove(address).map(|entry| entry.handle)
    }

    /// Evicts every handle `live` reports closed.
    pub fn retain_live(&self, live: impl Fn(&ArchiveAddress) -> bool) {
        self.entries.lock().retain(|address, _| live(address));
    }

    pub fn contains(&self, address: &ArchiveAddress) -> bool {
        self.entries.lock().contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_used(&self, address: &ArchiveAddress) -> Option<DateTime<Utc>> {
        self.entries.lock().get(address).map(|entry| entry.last_used)
    }

    /// Every cached handle, ordered by address.
    pub fn enumerate(&self) -> Vec<OpenArchive> {
        self.entries
            .lock()
            .iter()
            .map(|(address, entry)| OpenArchive {
                address: *address,
                url: entry.handle.url(),
                last_used: entry.last_used,
            })
            .sorted_by_key(|open| open.address)
            .collect()
    }
}

type InFlightMap = Mutex<HashMap<ArchiveAddress, Arc<tokio::sync::Mutex<()>>>>;

/// Share of the construction lock for one address. The last share to drop
/// removes the map entry, also when the waiting future is cancelled.
struct InFlight<'a> {
    map: &'a InFlightMap,
    address: ArchiveAddress,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl<'a> InFlight<'a> {
    fn join(map: &'a InFlightMap, address: ArchiveAddress) -> Self {
        let lock = Arc::clone(map.lock().entry(address).or_default());
        Self { map, address, lock }
    }
}

impl std::ops::Deref for InFlight<'_> {
    type Target = tokio::sync::Mutex<()>;

    fn deref(&self) -> &Self::Target {
        &self.lock
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        // Shares are only cloned under the map lock, so the count is stable here.
        let mut map = self.map.lock();
        if Arc::strong_count(&self.lock) == 2 {
            map.remove(&self.address);
        }
    }
}

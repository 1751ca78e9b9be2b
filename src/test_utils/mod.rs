// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! In-process stand-ins for the archive engine and name resolver.

use std::{path::Path, sync::Arc};

use ahash::{HashMap, HashSet};
use anyhow::{Context as _, bail};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::archive::{
    ArchiveAddress, ArchiveEngine, ArchiveHandle, ArchiveInfo, ArchiveManifest, NameResolver,
};

/// Address whose key is `n` repeated.
pub fn address(n: u8) -> ArchiveAddress {
    ArchiveAddress::from_bytes([n; ArchiveAddress::LEN])
}

#[derive(Default)]
struct EngineState {
    open: HashMap<ArchiveAddress, Arc<MockHandle>>,
    owned: HashSet<ArchiveAddress>,
    failing: HashSet<ArchiveAddress>,
    stalled: HashSet<ArchiveAddress>,
    manifests: HashMap<ArchiveAddress, ArchiveManifest>,
    open_calls: HashMap<ArchiveAddress, usize>,
    forks: Vec<ArchiveManifest>,
    created: u8,
}

pub struct MockHandle {
    address: ArchiveAddress,
    writable: bool,
    stalled: bool,
    manifest: ArchiveManifest,
    engine: Option<Arc<Mutex<EngineState>>>,
}

impl MockHandle {
    /// Handle that belongs to no engine.
    pub fn detached(address: ArchiveAddress, writable: bool) -> Self {
        Self {
            address,
            writable,
            stalled: false,
            manifest: ArchiveManifest::default(),
            engine: None,
        }
    }
}

#[async_trait]
impl ArchiveHandle for MockHandle {
    fn address(&self) -> ArchiveAddress {
        self.address
    }

    fn writable(&self) -> bool {
        self.writable
    }

    async fn ready(&self) -> anyhow::Result<()> {
        if self.stalled {
            futures::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn info(&self) -> anyhow::Result<ArchiveInfo> {
        Ok(ArchiveInfo {
            address: self.address,
            url: self.url(),
            title: self.manifest.title.clone(),
            description: self.manifest.description.clone(),
            is_owner: self.writable,
        })
    }

    async fn manifest(&self) -> anyhow::Result<ArchiveManifest> {
        Ok(self.manifest.clone())
    }

    async fn close(&self) -> anyhow::Result<()> {
        if let Some(engine) = &self.engine {
            engine.lock().open.remove(&self.address);
        }
        Ok(())
    }
}

/// Engine keeping everything in memory. Storage directories are created on
/// disk so that ownership scans can find them.
#[derive(Clone, Default)]
pub struct MockEngine {
    state: Arc<Mutex<EngineState>>,
}

impl MockEngine {
    /// Marks `address` as writable by this process.
    pub fn own(&self, address: ArchiveAddress) -> &Self {
        self.state.lock().owned.insert(address);
        self
    }

    /// Makes every open of `address` fail.
    pub fn fail(&self, address: ArchiveAddress) -> &Self {
        self.state.lock().failing.insert(address);
        self
    }

    /// Makes handles of `address` never become ready.
    pub fn stall(&self, address: ArchiveAddress) -> &Self {
        self.state.lock().stalled.insert(address);
        self
    }

    pub fn set_manifest(&self, address: ArchiveAddress, manifest: ArchiveManifest) -> &Self {
        self.state.lock().manifests.insert(address, manifest);
        self
    }

    pub fn open_calls(&self, address: &ArchiveAddress) -> usize {
        self.state
            .lock()
            .open_calls
            .get(address)
            .copied()
            .unwrap_or_default()
    }

    /// Manifests every fork was created with, in call order.
    pub fn forks(&self) -> Vec<ArchiveManifest> {
        self.state.lock().forks.clone()
    }

    fn handle(&self, address: ArchiveAddress, state: &EngineState) -> Arc<MockHandle> {
        Arc::new(MockHandle {
            address,
            writable: state.owned.contains(&address),
            stalled: state.stalled.contains(&address),
            manifest: state.manifests.get(&address).cloned().unwrap_or_default(),
            engine: Some(Arc::clone(&self.state)),
        })
    }

    fn create_owned(
        &self,
        storage_root: &Path,
        manifest: ArchiveManifest,
    ) -> anyhow::Result<Arc<MockHandle>> {
        let mut state = self.state.lock();
        state.created = state
            .created
            .checked_add(1)
            .context("mock engine ran out of keys")?;
        let address = address(0x80 | state.created);
        std::fs::create_dir_all(storage_root.join(address.to_hex()))?;
        state.owned.insert(address);
        state.manifests.insert(address, manifest);
        let handle = self.handle(address, &state);
        state.open.insert(address, Arc::clone(&handle));
        Ok(handle)
    }
}

#[async_trait]
impl ArchiveEngine for MockEngine {
    type Handle = MockHandle;

    async fn open(
        &self,
        address: &ArchiveAddress,
        storage: &Path,
    ) -> anyhow::Result<Arc<MockHandle>> {
        let mut state = self.state.lock();
        *state.open_calls.entry(*address).or_default() += 1;
        if state.failing.contains(address) {
            bail!("failed to open {address}");
        }
        if let Some(handle) = state.open.get(address) {
            return Ok(Arc::clone(handle));
        }
        std::fs::create_dir_all(storage)?;
        let handle = self.handle(*address, &state);
        state.open.insert(*address, Arc::clone(&handle));
        Ok(handle)
    }

    async fn create(
        &self,
        storage_root: &Path,
        manifest: ArchiveManifest,
    ) -> anyhow::Result<Arc<MockHandle>> {
        self.create_owned(storage_root, manifest)
    }

    async fn fork(
        &self,
        _source: &MockHandle,
        storage_root: &Path,
        manifest: ArchiveManifest,
    ) -> anyhow::Result<Arc<MockHandle>> {
        self.state.lock().forks.push(manifest.clone());
        self.create_owned(storage_root, manifest)
    }

    fn is_open(&self, address: &ArchiveAddress) -> bool {
        self.state.lock().open.contains_key(address)
    }

    async fn close(&self, address: &ArchiveAddress) -> anyhow::Result<()> {
        self.state.lock().open.remove(address);
        Ok(())
    }
}

/// Resolver understanding raw keys, `dat://` URLs and registered aliases.
#[derive(Default)]
pub struct MockResolver {
    aliases: Mutex<HashMap<String, ArchiveAddress>>,
    broken: Mutex<HashSet<String>>,
}

impl MockResolver {
    pub fn alias(&self, name: impl Into<String>, address: ArchiveAddress) -> &Self {
        self.aliases.lock().insert(name.into(), address);
        self
    }

    /// Makes resolution of `name` fail.
    pub fn break_name(&self, name: impl Into<String>) -> &Self {
        self.broken.lock().insert(name.into());
        self
    }
}

#[async_trait]
impl NameResolver for MockResolver {
    async fn resolve(&self, name: &str) -> anyhow::Result<ArchiveAddress> {
        if self.broken.lock().contains(name) {
            bail!("cannot resolve {name}");
        }
        if let Some(address) = self.aliases.lock().get(name) {
            return Ok(*address);
        }
        Ok(name.parse()?)
    }
}

// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Contracts of the collaborators the library is built on: name resolution
//! and the distributed archive engine. Neither is implemented here.

mod address;
mod manifest;

use std::{path::Path, sync::Arc};

use async_trait::async_trait;

pub use address::{ARCHIVE_URL_SCHEME, AddressParseError, ArchiveAddress};
pub use manifest::{ArchiveInfo, ArchiveManifest, manifest_for_fork};

/// A name together with the canonical address it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub address: ArchiveAddress,
    pub url: String,
}

/// Resolves human-readable names and protocol URLs to canonical addresses.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Fails when `name` cannot be resolved.
    async fn resolve(&self, name: &str) -> anyhow::Result<ArchiveAddress>;

    async fn resolve_name(&self, name: &str) -> anyhow::Result<ResolvedName> {
        let address = self.resolve(name).await?;
        Ok(ResolvedName {
            address,
            url: address.to_url(),
        })
    }
}

/// Resolver that only understands raw keys and `dat://<key>` URLs. Anything
/// that would need a DNS lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyResolver;

#[async_trait]
impl NameResolver for KeyResolver {
    async fn resolve(&self, name: &str) -> anyhow::Result<ArchiveAddress> {
        Ok(name.parse()?)
    }
}

/// An open session to one archive.
#[async_trait]
pub trait ArchiveHandle: Send + Sync + 'static {
    fn address(&self) -> ArchiveAddress;

    fn url(&self) -> String {
        self.address().to_url()
    }

    /// Whether this process holds the write capability.
    fn writable(&self) -> bool;

    /// Resolves once the archive has loaded enough state to be used. May
    /// never resolve for unreachable archives.
    async fn ready(&self) -> anyhow::Result<()>;

    async fn info(&self) -> anyhow::Result<ArchiveInfo>;

    async fn manifest(&self) -> anyhow::Result<ArchiveManifest>;

    async fn close(&self) -> anyhow::Result<()>;
}

/// Produces handles to replicated, versioned archives.
///
/// The engine keeps its own table of open archives; the library treats it as
/// a second-level cache and keeps both in agreement.
#[async_trait]
pub trait ArchiveEngine: Send + Sync + 'static {
    type Handle: ArchiveHandle;

    /// Opens the archive at `address`, creating local state under `storage`
    /// if there is none yet.
    async fn open(
        &self,
        address: &ArchiveAddress,
        storage: &Path,
    ) -> anyhow::Result<Arc<Self::Handle>>;

    /// Creates a new, owned archive. Its storage goes below `storage_root`.
    async fn create(
        &self,
        storage_root: &Path,
        manifest: ArchiveManifest,
    ) -> anyhow::Result<Arc<Self::Handle>>;

    /// Creates a new, owned archive whose initial content derives from
    /// `source`.
    async fn fork(
        &self,
        source: &Self::Handle,
        storage_root: &Path,
        manifest: ArchiveManifest,
    ) -> anyhow::Result<Arc<Self::Handle>>;

    fn is_open(&self, address: &ArchiveAddress) -> bool;

    async fn close(&self, address: &ArchiveAddress) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn key_resolver_handles_keys_and_urls() {
        let key = "00".repeat(ArchiveAddress::LEN);
        let resolved = KeyResolver
            .resolve_name(&format!("dat://{key}+3/about"))
            .await
            .unwrap();
        assert_eq!(resolved.address.to_hex(), key);
        assert_eq!(resolved.url, format!("dat://{key}/"));
    }

    #[tokio::test]
    async fn key_resolver_rejects_dns_names() {
        assert!(KeyResolver.resolve("dat://example.com/").await.is_err());
    }
}

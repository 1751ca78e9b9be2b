// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod memory;
pub mod parity_db;

pub use memory::MemoryDB;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Interface of the durable key-value store backing the archive index.
/// Keys are archive URLs; values are opaque bytes.
pub trait IndexStore: Send + Sync {
    /// Reads a binary value. For serializable data, use [`IndexStoreExt::read_obj`].
    fn read_bin(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// Writes a binary value, replacing any previous one. For serializable data, use
    /// [`IndexStoreExt::write_obj`].
    fn write_bin(&self, key: &str, value: &[u8]) -> anyhow::Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> anyhow::Result<()>;

    /// Returns `Ok(true)` if key exists in store.
    fn exists(&self, key: &str) -> anyhow::Result<bool>;

    /// Returns every key-value pair in the store.
    fn entries(&self) -> anyhow::Result<Vec<(String, Vec<u8>)>>;
}

/// Extension trait for the [`IndexStore`] trait. It is implemented for all types that implement
/// [`IndexStore`].
/// It provides methods for writing and reading any serializable object from the store.
pub trait IndexStoreExt {
    fn read_obj<V: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<V>>;
    fn write_obj<V: Serialize>(&self, key: &str, value: &V) -> anyhow::Result<()>;
}

impl<T: ?Sized + IndexStore> IndexStoreExt for T {
    fn read_obj<V: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<V>> {
        match self.read_bin(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write_obj<V: Serialize>(&self, key: &str, value: &V) -> anyhow::Result<()> {
        self.write_bin(key, &serde_json::to_vec(value)?)
    }
}

/// Storage engine used for the archive index.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    ParityDb,
    /// Nothing survives the process. Useful for tests and throwaway sessions.
    Memory,
}

pub mod db_engine {
    use std::{path::Path, sync::Arc};

    use super::{IndexBackend, IndexStore, MemoryDB, parity_db::ParityDb};

    pub fn open_index_store(
        backend: IndexBackend,
        path: &Path,
    ) -> anyhow::Result<Arc<dyn IndexStore>> {
        Ok(match backend {
            IndexBackend::ParityDb => Arc::new(ParityDb::open(path)?),
            IndexBackend::Memory => Arc::new(MemoryDB::default()),
        })
    }
}

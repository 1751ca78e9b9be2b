// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::IndexStore;
use ahash::HashMap;
use itertools::Itertools;
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct MemoryDB {
    index_db: RwLock<HashMap<String, Vec<u8>>>,
}

impl IndexStore for MemoryDB {
    fn read_bin(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.index_db.read().get(key).cloned())
    }

    fn write_bin(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        self.index_db.write().insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.index_db.write().remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.index_db.read().contains_key(key))
    }

    fn entries(&self) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
        Ok(self
            .index_db
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect_vec())
    }
}

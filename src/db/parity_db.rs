// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::PathBuf;

use super::IndexStore;

use anyhow::{Context, anyhow};
use parity_db::{CompressionType, Db, Options};
use strum::{Display, EnumIter, FromRepr, IntoEnumIterator};

/// Columns of the index database.
#[derive(Copy, Clone, Debug, Display, PartialEq, FromRepr, EnumIter)]
#[repr(u8)]
enum DbColumn {
    /// Archive records keyed by URL.
    Index,
}

impl DbColumn {
    fn create_column_options(compression: CompressionType) -> Vec<parity_db::ColumnOptions> {
        DbColumn::iter()
            .map(|col| match col {
                DbColumn::Index => parity_db::ColumnOptions {
                    // records are overwritten in place, which preimage columns forbid
                    preimage: false,
                    // This is needed for key retrieval.
                    btree_index: true,
                    compression,
                    ..Default::default()
                },
            })
            .collect()
    }
}

pub struct ParityDb {
    pub db: parity_db::Db,
}

impl ParityDb {
    fn to_options(path: PathBuf) -> Options {
        Options {
            path,
            sync_wal: true,
            sync_data: true,
            stats: false,
            salt: None,
            columns: DbColumn::create_column_options(CompressionType::NoCompression),
            compression_threshold: Default::default(),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let opts = Self::to_options(path.into());
        let db = Db::open_or_create(&opts)
            .with_context(|| format!("failed to open index at {}", opts.path.display()))?;
        Ok(Self { db })
    }

    fn read_from_column<K>(&self, key: K, column: DbColumn) -> anyhow::Result<Option<Vec<u8>>>
    where
        K: AsRef<[u8]>,
    {
        self.db
            .get(column as u8, key.as_ref())
            .map_err(|e| anyhow!("error from column {column}: {e}"))
    }

    fn write_to_column<K>(
        &self,
        key: K,
        value: Option<Vec<u8>>,
        column: DbColumn,
    ) -> anyhow::Result<()>
    where
        K: AsRef<[u8]>,
    {
        let tx = [(column as u8, key.as_ref(), value)];
        self.db
            .commit(tx)
            .map_err(|e| anyhow!("error writing to column {column}: {e}"))
    }
}

impl IndexStore for ParityDb {
    fn read_bin(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        self.read_from_column(key.as_bytes(), DbColumn::Index)
    }

    fn write_bin(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        self.write_to_column(key.as_bytes(), Some(value.to_vec()), DbColumn::Index)
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.write_to_column(key.as_bytes(), None, DbColumn::Index)
    }

    fn exists(&self, key: &str) -> anyhow::Result<bool> {
        self.db
            .get_size(DbColumn::Index as u8, key.as_bytes())
            .map(|size| size.is_some())
            .context("error checking if key exists")
    }

    fn entries(&self) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
        let mut iter = self.db.iter(DbColumn::Index as u8)?;
        let mut entries = vec![];
        while let Some((key, value)) = iter.next()? {
            entries.push((String::from_utf8(key)?, value));
        }
        Ok(entries)
    }
}

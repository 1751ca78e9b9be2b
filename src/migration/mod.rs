// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! One-time migrations of the on-disk layout of a library root. A migration
//! runs to completion before the index is opened.

mod versioned;

use std::path::Path;

use async_trait::async_trait;

use crate::archive::ArchiveEngine;

pub use versioned::{LIBRARY_VERSION, MigrationStep, VERSION_FILE_NAME, VersionedMigration};

/// Brings a library root up to date. Must be idempotent: running it on an
/// already migrated root is a no-op.
#[async_trait]
pub trait LibraryMigration<E: ArchiveEngine>: Send + Sync {
    async fn run(&self, root: &Path, engine: &E) -> anyhow::Result<()>;
}

/// Migration that leaves the root untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMigration;

#[async_trait]
impl<E: ArchiveEngine> LibraryMigration<E> for NoopMigration {
    async fn run(&self, _root: &Path, _engine: &E) -> anyhow::Result<()> {
        Ok(())
    }
}

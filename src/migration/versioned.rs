// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context as _, bail};
use async_trait::async_trait;
use itertools::Itertools as _;
use semver::Version;
use tracing::{debug, info};

use super::LibraryMigration;
use crate::archive::ArchiveEngine;

/// Layout version written by this release.
pub const LIBRARY_VERSION: Version = Version::new(1, 0, 0);

/// Marker file in the library root holding the layout version.
pub const VERSION_FILE_NAME: &str = "LIBRARY_VERSION";

/// Version assumed for a non-empty root that has no marker file.
const UNVERSIONED: Version = Version::new(0, 0, 0);

/// One step of a layout migration, from one version to the next.
#[async_trait]
pub trait MigrationStep<E: ArchiveEngine>: Send + Sync {
    fn from(&self) -> &Version;
    fn to(&self) -> &Version;
    async fn migrate(&self, root: &Path, engine: &E) -> anyhow::Result<()>;
}

/// Migrates a library root along a chain of [`MigrationStep`]s, recording
/// progress in the [`VERSION_FILE_NAME`] marker so reruns and interrupted
/// runs pick up where they left off.
pub struct VersionedMigration<E: ArchiveEngine> {
    target: Version,
    steps: Vec<Arc<dyn MigrationStep<E>>>,
}

impl<E: ArchiveEngine> VersionedMigration<E> {
    pub fn new(target: Version) -> Self {
        Self {
            target,
            steps: vec![],
        }
    }

    /// Migration to [`LIBRARY_VERSION`].
    pub fn current() -> Self {
        Self::new(LIBRARY_VERSION)
    }

    pub fn with_step(mut self, step: Arc<dyn MigrationStep<E>>) -> Self {
        self.steps.push(step);
        self
    }

    /// Steps leading from `start` to the target, in order. Gaps between
    /// steps need no migration.
    fn chain(&self, start: &Version) -> anyhow::Result<Vec<Arc<dyn MigrationStep<E>>>> {
        if start > &self.target {
            bail!(
                "library version {start} is newer than {}, downgrades are not supported",
                self.target
            );
        }
        let mut current = start.clone();
        let mut chain = vec![];
        for step in self.steps.iter().sorted_by(|a, b| a.from().cmp(b.from())) {
            if step.from() >= &current && step.to() <= &self.target {
                current = step.to().clone();
                chain.push(Arc::clone(step));
            }
        }
        Ok(chain)
    }
}

fn version_file(root: &Path) -> PathBuf {
    root.join(VERSION_FILE_NAME)
}

/// Reads the layout version recorded in `root`, if any.
async fn read_version(root: &Path) -> anyhow::Result<Option<Version>> {
    let path = version_file(root);
    if !tokio::fs::try_exists(&path).await? {
        return Ok(None);
    }
    let text = tokio::fs::read_to_string(&path).await?;
    let version = Version::parse(text.trim())
        .with_context(|| format!("malformed version marker {}", path.display()))?;
    Ok(Some(version))
}

async fn write_version(root: &Path, version: &Version) -> anyhow::Result<()> {
    tokio::fs::write(version_file(root), format!("{version}\n"))
        .await
        .with_context(|| format!("failed to write version marker in {}", root.display()))
}

/// A root is fresh when nothing but the marker lives in it.
async fn is_fresh(root: &Path) -> anyhow::Result<bool> {
    let mut entries = tokio::fs::read_dir(root).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_name() != VERSION_FILE_NAME {
            return Ok(false);
        }
    }
    Ok(true)
}

#[async_trait]
impl<E: ArchiveEngine> LibraryMigration<E> for VersionedMigration<E> {
    async fn run(&self, root: &Path, engine: &E) -> anyhow::Result<()> {
        let current = match read_version(root).await? {
            Some(version) => version,
            None if is_fresh(root).await? => {
                debug!("Fresh library root, no migration required");
                return write_version(root, &self.target).await;
            }
            None => UNVERSIONED,
        };
        if current == self.target {
            debug!("No library migration required");
            return Ok(());
        }

        for step in self.chain(&current)? {
            info!("Migrating library from {} to {}", step.from(), step.to());
            step.migrate(root, engine).await.with_context(|| {
                format!("migration from {} to {} failed", step.from(), step.to())
            })?;
            write_version(root, step.to()).await?;
        }
        write_version(root, &self.target).await?;
        info!("Library migrated to version {}", self.target);
        Ok(())
    }
}

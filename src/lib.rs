// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod archive;
mod cli;
mod cli_shared;
pub mod db;
pub mod library;
pub mod migration;
#[cfg(test)]
mod test_utils;
mod utils;

pub use archive::{ArchiveAddress, ArchiveEngine, ArchiveHandle, ArchiveManifest, NameResolver};
pub use cli::main::main as archive_library_main;
pub use cli_shared::cli::{Config, LogConfig, LogValue};
pub use library::{ArchiveLibrary, ArchiveRecord, Error, LibraryConfig, ReconcileReport};

// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::time::Duration;

use thiserror::Error;

use crate::archive::ArchiveAddress;

/// Archive library error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} is not in the library")]
    NotInLibrary(String),

    #[error("the archive library has not been initialized")]
    NotInitialized,

    #[error("the archive library is already initialized")]
    AlreadyInitialized,

    #[error("the archive library failed to initialize: {0}")]
    InitFailed(String),

    #[error("archive {address} was not ready after {timeout:?}")]
    ReadyTimeout {
        address: ArchiveAddress,
        timeout: Duration,
    },

    /// Failure of a collaborator (name resolution, engine, index), passed through as is.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ArchiveAddress;

/// Self-describing metadata stored inside an archive. Also used as the set
/// of options for creating and forking archives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Directory within the archive that is served as the site root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_root: Option<String>,
    /// Page served when a requested path does not exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_page: Option<String>,
    /// Link graph, keyed by relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    /// Any other manifest fields. Never carried into a fork.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Builds the manifest of a fork of `source`.
///
/// Only `web_root`, `fallback_page` and `links` are carried over from the
/// source, and only where `options` leaves them unset. Everything else comes
/// from `options` alone.
pub fn manifest_for_fork(source: &ArchiveManifest, options: ArchiveManifest) -> ArchiveManifest {
    ArchiveManifest {
        web_root: options.web_root.or_else(|| source.web_root.clone()),
        fallback_page: options.fallback_page.or_else(|| source.fallback_page.clone()),
        links: options.links.or_else(|| source.links.clone()),
        ..options
    }
}

/// Metadata the library captures from a live handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInfo {
    pub address: ArchiveAddress,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_owner: bool,
}

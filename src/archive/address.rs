// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// URL scheme of archive links.
pub const ARCHIVE_URL_SCHEME: &str = "dat";

/// Canonical identity of an archive: the 32-byte public key it is addressed by.
///
/// Rendered as 64 lowercase hex characters. Any number of URLs or names may
/// resolve to the same address, so caches are keyed by this type and never by
/// the URL a caller happened to use.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArchiveAddress([u8; ArchiveAddress::LEN]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("unsupported url scheme `{0}`")]
    Scheme(String),
    #[error("`{0}` is not a {len}-character hex key", len = ArchiveAddress::LEN * 2)]
    Key(String),
}

impl ArchiveAddress {
    pub const LEN: usize = 32;

    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The canonical `dat://<key>/` URL of this archive.
    pub fn to_url(&self) -> String {
        format!("{ARCHIVE_URL_SCHEME}://{}/", self.to_hex())
    }

    fn parse_key(key: &str) -> Result<Self, AddressParseError> {
        let mut bytes = [0; Self::LEN];
        hex::decode_to_slice(key, &mut bytes).map_err(|_| AddressParseError::Key(key.into()))?;
        Ok(Self(bytes))
    }
}

impl FromStr for ArchiveAddress {
    type Err = AddressParseError;

    /// Accepts a bare hex key or a `dat://<key>[+version][/path]` URL.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((scheme, rest)) = s.split_once("://") else {
            return Self::parse_key(s);
        };
        if !scheme.eq_ignore_ascii_case(ARCHIVE_URL_SCHEME) {
            return Err(AddressParseError::Scheme(scheme.into()));
        }
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        let key = host.split_once('+').map_or(host, |(key, _version)| key);
        Self::parse_key(key)
    }
}

impl TryFrom<String> for ArchiveAddress {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArchiveAddress> for String {
    fn from(value: ArchiveAddress) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for ArchiveAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ArchiveAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArchiveAddress").field(&self.to_hex()).finish()
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for ArchiveAddress {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let mut bytes = [0; Self::LEN];
        bytes.iter_mut().for_each(|b| *b = u8::arbitrary(g));
        Self(bytes)
    }
}

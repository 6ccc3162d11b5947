//! Content fingerprints (SHA-256) used as the catalog's identity key.
//!
//! `fingerprint` hashes bytes already in memory (the ingest path);
//! `fingerprint_path` streams a file from disk (verification, orphan adoption).

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

/// 256-bit SHA-256 digest of a file's exact bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    fn from_slice(digest: &[u8]) -> Self {
        let mut out = [0u8; 32];
        out.copy_from_slice(digest);
        ContentDigest(out)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex form, as persisted in the catalog.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, DigestParseError> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut out).map_err(|_| DigestParseError(s.to_string()))?;
        Ok(ContentDigest(out))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl FromStr for ContentDigest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentDigest::from_hex(s)
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Returned when a stored digest is not 64 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid SHA-256 hex digest: {0:?}")]
pub struct DigestParseError(pub String);

/// Compute the digest of `bytes`. Deterministic; cannot fail.
pub fn fingerprint(bytes: &[u8]) -> ContentDigest {
    ContentDigest::from_slice(&Sha256::digest(bytes))
}

/// Compute the digest of a file on disk.
/// Reads in chunks to keep memory use bounded.
pub fn fingerprint_path(path: &Path) -> Result<ContentDigest> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(ContentDigest::from_slice(&hasher.finalize()))
}

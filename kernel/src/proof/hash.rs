//! Domain-separated content hashing.
//!
//! Algorithm: SHA-256 over `domain_prefix || data`. Rendered as
//! `"sha256:<hex_digest>"`. Every hash computation selects a
//! [`HashDomain`]; the prefixes are null-terminated so no prefix is a
//! prefix of another.

use sha2::{Digest, Sha256};

/// Algorithm tag used in rendered hashes.
pub const HASH_ALGORITHM: &str = "sha256";

/// Typed domain separator for [`canonical_hash`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashDomain {
    /// Exported search graph (canonical JSON).
    SearchGraph,
    /// Artifact content inside a harness bundle.
    BundleArtifact,
    /// Bundle digest over the normative projection.
    BundleDigest,
}

impl HashDomain {
    /// All domains in declaration order.
    pub const ALL: &'static [HashDomain] = &[
        Self::SearchGraph,
        Self::BundleArtifact,
        Self::BundleDigest,
    ];

    /// The raw domain-separator bytes (null-terminated).
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::SearchGraph => b"STACKPLAN::SEARCH_GRAPH::V1\0",
            Self::BundleArtifact => b"STACKPLAN::BUNDLE_ARTIFACT::V1\0",
            Self::BundleDigest => b"STACKPLAN::BUNDLE_DIGEST::V1\0",
        }
    }
}

/// A content-addressed hash in `"algorithm:hex_digest"` form.
///
/// Invariant: exactly one `:` with non-empty text on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash {
    full: String,
    colon: usize,
}

impl ContentHash {
    /// Parse from `"algorithm:hex"` form. `None` if malformed.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let colon = s.find(':')?;
        if colon == 0 || colon + 1 == s.len() || s[colon + 1..].contains(':') {
            return None;
        }
        Some(Self {
            full: s.to_string(),
            colon,
        })
    }

    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.full[..self.colon]
    }

    #[must_use]
    pub fn hex_digest(&self) -> &str {
        &self.full[self.colon + 1..]
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full)
    }
}

/// SHA-256 of `domain || data`.
#[must_use]
pub fn canonical_hash(domain: HashDomain, data: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update(data);
    let hex_digest = hex::encode(hasher.finalize());
    ContentHash {
        colon: HASH_ALGORITHM.len(),
        full: format!("{HASH_ALGORITHM}:{hex_digest}"),
    }
}

//! Locks the hash domain prefixes and digest rendering. Changing any of
//! these invalidates every stored bundle.

use stackplan_kernel::proof::hash::{canonical_hash, HashDomain, HASH_ALGORITHM};

#[test]
fn domain_prefixes_are_locked() {
    let expected: [(HashDomain, &[u8]); 3] = [
        (HashDomain::SearchGraph, b"STACKPLAN::SEARCH_GRAPH::V1\0"),
        (HashDomain::BundleArtifact, b"STACKPLAN::BUNDLE_ARTIFACT::V1\0"),
        (HashDomain::BundleDigest, b"STACKPLAN::BUNDLE_DIGEST::V1\0"),
    ];
    assert_eq!(HashDomain::ALL.len(), expected.len());
    for (domain, prefix) in expected {
        assert_eq!(domain.as_bytes(), prefix, "{domain:?}");
    }
}

#[test]
fn digests_render_as_lowercase_sha256_hex() {
    let hash = canonical_hash(HashDomain::BundleArtifact, b"{}");
    assert_eq!(hash.algorithm(), HASH_ALGORITHM);
    assert_eq!(hash.hex_digest().len(), 64);
    assert!(hash
        .hex_digest()
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
}

//! Bundle directory persistence: write, read and verify an
//! [`ArtifactBundle`] on disk.
//!
//! # Directory layout
//!
//! ```text
//! <dir>/
//!   bundle_manifest.json       canonical JSON, full artifact listing
//!   bundle_digest_basis.json   canonical JSON, normative projection only
//!   bundle_digest.txt          ASCII digest string ("sha256:...")
//!   scenario.json
//!   search_graph.json
//!   plan.json
//!   report.json
//! ```
//!
//! The directory path is never part of any hash surface. The manifest's
//! declared list is the source of truth.
//!
//! # Fail-closed semantics
//!
//! - Missing declared artifact files are an error
//! - Extra undeclared files are an error
//! - A stored digest that differs from the recomputed one is an error

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use stackplan_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};

use crate::bundle::{verify_bundle, ArtifactBundle, BundleArtifact, BundleVerifyError};

const MANIFEST_FILENAME: &str = "bundle_manifest.json";
const DIGEST_BASIS_FILENAME: &str = "bundle_digest_basis.json";
const DIGEST_FILENAME: &str = "bundle_digest.txt";

const METADATA_FILENAMES: &[&str] = &[MANIFEST_FILENAME, DIGEST_BASIS_FILENAME, DIGEST_FILENAME];

const TEMP_PREFIX: &str = ".tmp_";

#[derive(Debug, thiserror::Error)]
pub enum BundleDirWriteError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} has no parent directory")]
    NoParent { path: String },
}

#[derive(Debug, thiserror::Error)]
pub enum BundleDirReadError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("missing metadata file: {filename}")]
    MissingMetadata { filename: String },
    #[error("missing artifact: {name}")]
    MissingArtifact { name: String },
    #[error("undeclared extra file: {name}")]
    ExtraFile { name: String },
    #[error("manifest parse error: {detail}")]
    ManifestParseError { detail: String },
    #[error("manifest schema_version is {found:?}, expected \"bundle.v1\"")]
    ManifestVersionMismatch { found: String },
    #[error("manifest entry invalid: {detail}")]
    ManifestEntryInvalid { detail: String },
    #[error("digest mismatch: stored={stored}, recomputed={recomputed}")]
    DigestMismatch { stored: String, recomputed: String },
}

#[derive(Debug, thiserror::Error)]
pub enum BundleDirVerifyError {
    #[error("read error: {0}")]
    Read(#[from] BundleDirReadError),
    #[error("verify error: {0}")]
    Verify(#[from] BundleVerifyError),
}

/// Write a bundle to `dir`, creating it if needed.
///
/// Every file is written to a `.tmp_` sibling and renamed into place.
///
/// # Errors
///
/// Returns [`BundleDirWriteError`] on I/O failure.
pub fn write_bundle_dir(bundle: &ArtifactBundle, dir: &Path) -> Result<(), BundleDirWriteError> {
    std::fs::create_dir_all(dir).map_err(|source| BundleDirWriteError::Io {
        context: format!("create_dir_all {}", dir.display()),
        source,
    })?;

    for artifact in bundle.artifacts.values() {
        write_atomic(&dir.join(&artifact.name), &artifact.content)?;
    }

    write_atomic(&dir.join(MANIFEST_FILENAME), &bundle.manifest)?;
    write_atomic(&dir.join(DIGEST_BASIS_FILENAME), &bundle.digest_basis)?;
    write_atomic(&dir.join(DIGEST_FILENAME), bundle.digest.as_str().as_bytes())?;

    tracing::debug!(
        dir = %dir.display(),
        artifacts = bundle.artifacts.len(),
        digest = %bundle.digest,
        "bundle written"
    );
    Ok(())
}

/// Read a bundle directory back into an [`ArtifactBundle`].
///
/// The stored `bundle_digest.txt` is checked against the digest recomputed
/// from `bundle_digest_basis.json`. Full integrity checking is left to
/// [`verify_bundle_dir`].
///
/// # Errors
///
/// Returns [`BundleDirReadError`] on any validation failure.
pub fn read_bundle_dir(dir: &Path) -> Result<ArtifactBundle, BundleDirReadError> {
    let manifest_bytes = read_required(dir, MANIFEST_FILENAME)?;
    let digest_basis_bytes = read_required(dir, DIGEST_BASIS_FILENAME)?;
    let digest_bytes = read_required(dir, DIGEST_FILENAME)?;

    let manifest: serde_json::Value = serde_json::from_slice(&manifest_bytes).map_err(|e| {
        BundleDirReadError::ManifestParseError {
            detail: e.to_string(),
        }
    })?;

    let schema_version = manifest
        .get("schema_version")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    if schema_version != "bundle.v1" {
        return Err(BundleDirReadError::ManifestVersionMismatch {
            found: schema_version.to_string(),
        });
    }

    let entries = manifest
        .get("artifacts")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| BundleDirReadError::ManifestParseError {
            detail: "\"artifacts\" is not an array".into(),
        })?;

    let mut artifacts = BTreeMap::new();
    for entry in entries {
        let artifact = read_entry(dir, entry)?;
        artifacts.insert(artifact.name.clone(), artifact);
    }

    for filename in list_files(dir)? {
        if !artifacts.contains_key(&filename) && !METADATA_FILENAMES.contains(&filename.as_str())
        {
            return Err(BundleDirReadError::ExtraFile { name: filename });
        }
    }

    let recomputed = canonical_hash(HashDomain::BundleDigest, &digest_basis_bytes);
    let stored = String::from_utf8_lossy(&digest_bytes).trim().to_string();
    if recomputed.as_str() != stored {
        return Err(BundleDirReadError::DigestMismatch {
            stored,
            recomputed: recomputed.as_str().to_string(),
        });
    }

    Ok(ArtifactBundle {
        artifacts,
        manifest: manifest_bytes,
        digest_basis: digest_basis_bytes,
        digest: recomputed,
    })
}

/// Read from disk, then run [`verify_bundle`].
///
/// # Errors
///
/// Returns [`BundleDirVerifyError`] on read failure or integrity mismatch.
pub fn verify_bundle_dir(dir: &Path) -> Result<ArtifactBundle, BundleDirVerifyError> {
    let bundle = read_bundle_dir(dir)?;
    verify_bundle(&bundle)?;
    Ok(bundle)
}

fn read_entry(dir: &Path, entry: &serde_json::Value) -> Result<BundleArtifact, BundleDirReadError> {
    let name = entry
        .get("name")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| BundleDirReadError::ManifestEntryInvalid {
            detail: "missing \"name\" field".into(),
        })?
        .to_string();

    // Artifact names are bare filenames.
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(BundleDirReadError::ManifestEntryInvalid {
            detail: format!("artifact name {name:?} is not a plain filename"),
        });
    }

    let hash_str = entry
        .get("content_hash")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| BundleDirReadError::ManifestEntryInvalid {
            detail: format!("missing \"content_hash\" for {name}"),
        })?;
    let content_hash =
        ContentHash::parse(hash_str).ok_or_else(|| BundleDirReadError::ManifestEntryInvalid {
            detail: format!("invalid content_hash for {name}: {hash_str}"),
        })?;

    let normative = entry
        .get("normative")
        .and_then(serde_json::Value::as_bool)
        .ok_or_else(|| BundleDirReadError::ManifestEntryInvalid {
            detail: format!("missing \"normative\" for {name}"),
        })?;

    let content = std::fs::read(dir.join(&name))
        .map_err(|_| BundleDirReadError::MissingArtifact { name: name.clone() })?;

    Ok(BundleArtifact {
        name,
        content,
        content_hash,
        normative,
    })
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<(), BundleDirWriteError> {
    let (Some(dir), Some(file_name)) = (path.parent(), path.file_name()) else {
        return Err(BundleDirWriteError::NoParent {
            path: path.display().to_string(),
        });
    };
    let temp_path = dir.join(format!("{TEMP_PREFIX}{}", file_name.to_string_lossy()));

    std::fs::write(&temp_path, content).map_err(|source| BundleDirWriteError::Io {
        context: format!("write {}", temp_path.display()),
        source,
    })?;
    std::fs::rename(&temp_path, path).map_err(|source| BundleDirWriteError::Io {
        context: format!("rename {} -> {}", temp_path.display(), path.display()),
        source,
    })
}

fn read_required(dir: &Path, filename: &str) -> Result<Vec<u8>, BundleDirReadError> {
    std::fs::read(dir.join(filename)).map_err(|_| BundleDirReadError::MissingMetadata {
        filename: filename.to_string(),
    })
}

/// Regular files in `dir`, skipping leftover temp files.
fn list_files(dir: &Path) -> Result<BTreeSet<String>, BundleDirReadError> {
    let io = |context: &str| {
        let context = format!("{context} {}", dir.display());
        move |source: std::io::Error| BundleDirReadError::Io { context, source }
    };

    let mut files = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(io("read_dir"))? {
        let entry = entry.map_err(io("dir entry in"))?;
        if !entry.file_type().map_err(io("file_type in"))?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if !name.starts_with(TEMP_PREFIX) {
                files.insert(name.to_string());
            }
        }
    }
    Ok(files)
}

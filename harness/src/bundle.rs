//! In-memory artifact bundle: the output of a harness run.
//!
//! No file I/O in this module (see [`crate::bundle_dir`] for persistence).
//!
//! # Normative vs observational artifacts
//!
//! Each artifact is tagged `normative` (participates in the bundle digest)
//! or observational (listed in the manifest but excluded from the digest).
//! All four run artifacts (`scenario.json`, `search_graph.json`,
//! `plan.json`, `report.json`) are normative.
//!
//! The bundle digest is computed over the **digest basis**: a canonical
//! JSON projection of normative artifact hashes only.

use std::collections::BTreeMap;

use stackplan_kernel::proof::canon::{canonical_json_bytes, is_canonical_json, CanonError};
use stackplan_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};

pub const SCENARIO_ARTIFACT: &str = "scenario.json";
pub const SEARCH_GRAPH_ARTIFACT: &str = "search_graph.json";
pub const PLAN_ARTIFACT: &str = "plan.json";
pub const REPORT_ARTIFACT: &str = "report.json";

/// Report fields that must equal the `content_hash` of an artifact.
pub const REPORT_BINDINGS: &[(&str, &str)] = &[
    ("scenario_digest", SCENARIO_ARTIFACT),
    ("search_graph_digest", SEARCH_GRAPH_ARTIFACT),
    ("plan_digest", PLAN_ARTIFACT),
];

/// A single artifact in the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifact {
    /// Logical filename (e.g., `"plan.json"`).
    pub name: String,
    pub content: Vec<u8>,
    /// `canonical_hash(BundleArtifact, content)`.
    pub content_hash: ContentHash,
    /// Whether this artifact participates in the bundle digest.
    pub normative: bool,
}

/// The complete artifact bundle from a harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactBundle {
    /// Artifacts indexed by logical name, in sorted order.
    pub artifacts: BTreeMap<String, BundleArtifact>,
    /// Canonical JSON listing all artifacts with normative flags.
    pub manifest: Vec<u8>,
    /// Canonical JSON listing normative artifact hashes only.
    pub digest_basis: Vec<u8>,
    /// `canonical_hash(BundleDigest, digest_basis)`.
    pub digest: ContentHash,
}

impl ArtifactBundle {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BundleArtifact> {
        self.artifacts.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BundleBuildError {
    #[error(transparent)]
    Canon(#[from] CanonError),
    /// Caller-provided `precomputed_hash` does not match the recomputed hash.
    #[error("precomputed hash for {name} is {expected}, content hashes to {computed}")]
    PrecomputedHashMismatch {
        name: String,
        expected: String,
        computed: String,
    },
    #[error("artifact {name} supplied twice")]
    DuplicateArtifact { name: String },
}

/// Input for bundle assembly.
///
/// If `precomputed_hash` is provided it must equal
/// `canonical_hash(BundleArtifact, &content)`.
#[derive(Debug, Clone)]
pub struct ArtifactInput {
    pub name: String,
    pub content: Vec<u8>,
    pub normative: bool,
    pub precomputed_hash: Option<ContentHash>,
}

impl From<(String, Vec<u8>, bool)> for ArtifactInput {
    fn from((name, content, normative): (String, Vec<u8>, bool)) -> Self {
        Self {
            name,
            content,
            normative,
            precomputed_hash: None,
        }
    }
}

/// Build an [`ArtifactBundle`] from a list of artifact inputs.
///
/// # Errors
///
/// Returns [`BundleBuildError`] on a duplicate name, a wrong precomputed
/// hash, or a canonical JSON failure.
pub fn build_bundle(
    artifacts: Vec<impl Into<ArtifactInput>>,
) -> Result<ArtifactBundle, BundleBuildError> {
    let mut artifact_map = BTreeMap::new();

    for input in artifacts {
        let input = input.into();
        let recomputed = canonical_hash(HashDomain::BundleArtifact, &input.content);
        if let Some(declared) = input.precomputed_hash {
            if declared != recomputed {
                return Err(BundleBuildError::PrecomputedHashMismatch {
                    name: input.name,
                    expected: declared.as_str().to_string(),
                    computed: recomputed.as_str().to_string(),
                });
            }
        }
        if artifact_map.contains_key(&input.name) {
            return Err(BundleBuildError::DuplicateArtifact { name: input.name });
        }
        artifact_map.insert(
            input.name.clone(),
            BundleArtifact {
                name: input.name,
                content: input.content,
                content_hash: recomputed,
                normative: input.normative,
            },
        );
    }

    let manifest = compute_manifest_bytes(&artifact_map)?;
    let digest_basis = compute_digest_basis_bytes(&artifact_map)?;
    let digest = canonical_hash(HashDomain::BundleDigest, &digest_basis);

    Ok(ArtifactBundle {
        artifacts: artifact_map,
        manifest,
        digest_basis,
        digest,
    })
}

/// Error from bundle integrity verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BundleVerifyError {
    #[error("artifact {artifact}: stored hash {expected}, content hashes to {actual}")]
    ContentHashMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },
    #[error("manifest does not match the artifacts")]
    ManifestMismatch,
    #[error("manifest is not canonical JSON")]
    ManifestNotCanonical,
    #[error("digest basis does not match the normative artifacts")]
    DigestBasisMismatch,
    #[error("digest basis is not canonical JSON")]
    DigestBasisNotCanonical,
    #[error("bundle digest: stored {expected}, recomputed {actual}")]
    DigestMismatch { expected: String, actual: String },
    #[error("normative artifact {artifact} is not canonical JSON")]
    ArtifactNotCanonical { artifact: String },
    #[error("report.json is not valid JSON: {detail}")]
    ReportParseError { detail: String },
    #[error("report.json does not declare {field}")]
    ReportFieldMissing { field: String },
    #[error("report declares {field} but {artifact} is absent")]
    BoundArtifactMissing { field: String, artifact: String },
    #[error("report {field} is {declared}, artifact hashes to {recomputed}")]
    BindingMismatch {
        field: String,
        declared: String,
        recomputed: String,
    },
    #[error(transparent)]
    Canon(#[from] CanonError),
}

/// Verify the internal consistency of a bundle.
///
/// This is a pure integrity check: it does NOT replay the plan (see
/// [`crate::runner::verify_bundle_replay`]). It proves:
///
/// 1. Each artifact's `content_hash` matches its content.
/// 2. `manifest` and `digest_basis` match the projections recomputed from
///    the artifacts and are canonical JSON.
/// 3. `digest` matches `canonical_hash(BundleDigest, digest_basis)`.
/// 4. Normative `.json` artifacts are canonical JSON.
/// 5. If `report.json` exists, every digest field in [`REPORT_BINDINGS`]
///    is present and equals its artifact's `content_hash`.
///
/// # Errors
///
/// Returns the first [`BundleVerifyError`] encountered.
pub fn verify_bundle(bundle: &ArtifactBundle) -> Result<(), BundleVerifyError> {
    for artifact in bundle.artifacts.values() {
        let recomputed = canonical_hash(HashDomain::BundleArtifact, &artifact.content);
        if recomputed != artifact.content_hash {
            return Err(BundleVerifyError::ContentHashMismatch {
                artifact: artifact.name.clone(),
                expected: artifact.content_hash.as_str().to_string(),
                actual: recomputed.as_str().to_string(),
            });
        }
    }

    if compute_manifest_bytes(&bundle.artifacts)? != bundle.manifest {
        return Err(BundleVerifyError::ManifestMismatch);
    }
    if !is_canonical_json(&bundle.manifest) {
        return Err(BundleVerifyError::ManifestNotCanonical);
    }

    if compute_digest_basis_bytes(&bundle.artifacts)? != bundle.digest_basis {
        return Err(BundleVerifyError::DigestBasisMismatch);
    }
    if !is_canonical_json(&bundle.digest_basis) {
        return Err(BundleVerifyError::DigestBasisNotCanonical);
    }

    let recomputed_digest = canonical_hash(HashDomain::BundleDigest, &bundle.digest_basis);
    if recomputed_digest != bundle.digest {
        return Err(BundleVerifyError::DigestMismatch {
            expected: bundle.digest.as_str().to_string(),
            actual: recomputed_digest.as_str().to_string(),
        });
    }

    for artifact in bundle.artifacts.values() {
        let is_json = std::path::Path::new(&artifact.name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if artifact.normative && is_json && !is_canonical_json(&artifact.content) {
            return Err(BundleVerifyError::ArtifactNotCanonical {
                artifact: artifact.name.clone(),
            });
        }
    }

    verify_report_bindings(bundle)
}

fn verify_report_bindings(bundle: &ArtifactBundle) -> Result<(), BundleVerifyError> {
    let Some(report_artifact) = bundle.artifacts.get(REPORT_ARTIFACT) else {
        return Ok(());
    };
    let report: serde_json::Value =
        serde_json::from_slice(&report_artifact.content).map_err(|e| {
            BundleVerifyError::ReportParseError {
                detail: e.to_string(),
            }
        })?;

    for (field, artifact_name) in REPORT_BINDINGS {
        let declared = report
            .get(*field)
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| BundleVerifyError::ReportFieldMissing {
                field: (*field).to_string(),
            })?;
        let artifact = bundle.artifacts.get(*artifact_name).ok_or_else(|| {
            BundleVerifyError::BoundArtifactMissing {
                field: (*field).to_string(),
                artifact: (*artifact_name).to_string(),
            }
        })?;
        if artifact.content_hash.as_str() != declared {
            return Err(BundleVerifyError::BindingMismatch {
                field: (*field).to_string(),
                declared: declared.to_string(),
                recomputed: artifact.content_hash.as_str().to_string(),
            });
        }
    }
    Ok(())
}

/// Recompute manifest bytes from the artifact map.
pub(crate) fn compute_manifest_bytes(
    artifacts: &BTreeMap<String, BundleArtifact>,
) -> Result<Vec<u8>, CanonError> {
    let manifest_artifacts: Vec<serde_json::Value> = artifacts
        .values()
        .map(|a| {
            serde_json::json!({
                "content_hash": a.content_hash.as_str(),
                "name": a.name,
                "normative": a.normative,
            })
        })
        .collect();

    canonical_json_bytes(&serde_json::json!({
        "artifacts": manifest_artifacts,
        "schema_version": "bundle.v1",
    }))
}

/// Recompute digest-basis bytes from the normative artifacts.
fn compute_digest_basis_bytes(
    artifacts: &BTreeMap<String, BundleArtifact>,
) -> Result<Vec<u8>, CanonError> {
    let normative_artifacts: Vec<serde_json::Value> = artifacts
        .values()
        .filter(|a| a.normative)
        .map(|a| {
            serde_json::json!({
                "content_hash": a.content_hash.as_str(),
                "name": a.name,
            })
        })
        .collect();

    canonical_json_bytes(&serde_json::json!({
        "artifacts": normative_artifacts,
        "schema_version": "bundle_digest_basis.v1",
    }))
}

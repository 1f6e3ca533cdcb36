//! Hashing - SHA-256 Draft Fingerprints
//!
//! A fingerprint is taken over canonical JSON, so two drafts with the same
//! content hash the same no matter how they were built or re-read.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::draft::PassDraft;

/// Canonical JSON: object keys sorted, no whitespace.
///
/// Going through `serde_json::Value` re-keys every object into serde_json's
/// default `Map`, which is ordered by key. Struct declaration order and
/// `BTreeMap` iteration order therefore never leak into the output. This
/// relies on the `preserve_order` feature staying off.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&serde_json::to_value(value)?)
}

/// Lowercase hex SHA-256 of the draft's canonical JSON.
pub fn draft_fingerprint(draft: &PassDraft) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(draft)?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

//! Content fingerprints and duplicate filtering for decoded records.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::ktest::{KTest, KTestObject};

/// SHA-256 hex digest over a record's object payloads.
///
/// Objects are ordered by `(name, bytes)` first, then only the payload bytes
/// are fed to the digest. Names therefore influence ordering but are not
/// hashed themselves, so two records carrying the same payloads under
/// different names can collide.
pub fn fingerprint(record: &KTest) -> String {
    fingerprint_objects(record.objects())
}

/// Fingerprint for a bare object list; see [`fingerprint`].
pub fn fingerprint_objects(objects: &[KTestObject]) -> String {
    let mut sorted: Vec<&KTestObject> = objects.iter().collect();
    sorted.sort_by(|a, b| (a.name.as_str(), &a.bytes).cmp(&(b.name.as_str(), &b.bytes)));

    let mut hasher = Sha256::new();
    for object in sorted {
        hasher.update(&object.bytes);
    }
    format!("{:x}", hasher.finalize())
}

/// Keep the first record for each fingerprint, preserving input order.
pub fn dedup(records: Vec<KTest>) -> Vec<KTest> {
    let mut seen = HashSet::new();
    records.into_iter().filter(|record| seen.insert(fingerprint(record))).collect()
}

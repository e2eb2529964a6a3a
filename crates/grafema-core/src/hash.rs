//! Content hashing shared by `Module.contentHash` (spec.md §3.1), the
//! `GraphFreshnessChecker`, and `IncrementalReanalyzer` (spec.md §4.7) —
//! invariant 7 depends on every writer going through the same function.

use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;

pub struct HashUtils;

impl HashUtils {
    pub fn hash_bytes(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex_encode(&hasher.finalize())
    }

    pub fn hash_str(data: &str) -> String {
        Self::hash_bytes(data.as_bytes())
    }

    pub fn hash_file(path: &Path) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(Self::hash_bytes(&bytes))
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_is_deterministic() {
        assert_eq!(HashUtils::hash_str("abc"), HashUtils::hash_str("abc"));
        assert_ne!(HashUtils::hash_str("abc"), HashUtils::hash_str("abd"));
    }

    #[test]
    fn hash_file_matches_hash_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");
        std::fs::write(&file, b"const x = 1;").unwrap();
        assert_eq!(
            HashUtils::hash_file(&file).unwrap(),
            HashUtils::hash_bytes(b"const x = 1;")
        );
    }
}

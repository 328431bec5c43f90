//! Digests of generated files
//!
//! A rebuild from the same recipe and templates must reproduce every digest,
//! and therefore the build hash.

use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// build_hash = sha256(recipe name : tool version : file list JSON)
///
/// Field order of the serialized list follows the struct declaration, so the
/// JSON is stable for a given list.
pub fn compute_build_hash<T: Serialize>(
    recipe_name: &str,
    tool_version: &str,
    files: &[T],
) -> Result<String, serde_json::Error> {
    let listing = serde_json::to_string(files)?;
    Ok(sha256_hex(format!("{}:{}:{}", recipe_name, tool_version, listing).as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_digest() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_build_hash_depends_on_files_and_version() {
        let a = [json!({"path": "dgs/a.obj", "sha256": "00"})];
        let b = [json!({"path": "dgs/a.obj", "sha256": "01"})];
        let ha = compute_build_hash("r", "1.0.0", &a).unwrap();
        assert_eq!(ha, compute_build_hash("r", "1.0.0", &a).unwrap());
        assert_ne!(ha, compute_build_hash("r", "1.0.0", &b).unwrap());
        assert_ne!(ha, compute_build_hash("r", "1.0.1", &a).unwrap());
    }
}

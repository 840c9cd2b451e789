//! `FullText` grader: exact byte equality via SHA-256 digests.

use sha2::{Digest, Sha256};

use super::GraderVerdict;
use crate::diagnostic::HashMismatch;

/// Registered name of the built-in full-text grader.
pub const FULL_TEXT: &str = "FullText";

/// Hex SHA-256 digest of the UTF-8 bytes of `text`.
pub fn text_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare `content` against `std` without any normalization.
pub fn fulltext(content: &str, std: &str) -> GraderVerdict {
    let content_hash = text_digest(content);
    let std_hash = text_digest(std);

    if content_hash == std_hash {
        GraderVerdict::pass()
    } else {
        GraderVerdict::fail(HashMismatch {
            content: content.to_string(),
            std: std.to_string(),
            content_hash,
            std_hash,
        })
    }
}

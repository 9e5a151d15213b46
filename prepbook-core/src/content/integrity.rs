//! Content integrity verification using SHA-256 checksums
//!
//! Manifest entries may carry a checksum. Downloaded bytes are verified
//! against it before they replace the local copy.

use ring::digest::{digest, SHA256};
use thiserror::Error;

const CHECKSUM_PREFIX: &str = "sha256:";

/// Verify SHA-256 checksum of content
///
/// `expected` must be in format "sha256:hexstring"; hex case is ignored.
///
/// # Example
/// ```
/// use prepbook_core::content::{compute_checksum, verify_checksum};
///
/// let data = br#"{"data":{}}"#;
/// let checksum = compute_checksum(data);
/// assert!(verify_checksum(data, &checksum).is_ok());
/// ```
pub fn verify_checksum(data: &[u8], expected: &str) -> Result<(), IntegrityError> {
    let expected_hex = expected
        .strip_prefix(CHECKSUM_PREFIX)
        .ok_or(IntegrityError::InvalidFormat)?
        .to_ascii_lowercase();

    let actual_hex = sha256_hex(data);
    if actual_hex != expected_hex {
        return Err(IntegrityError::ChecksumMismatch {
            expected: expected_hex,
            actual: actual_hex,
        });
    }
    Ok(())
}

/// Compute SHA-256 checksum of content in format "sha256:hexstring"
pub fn compute_checksum(data: &[u8]) -> String {
    format!("{}{}", CHECKSUM_PREFIX, sha256_hex(data))
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(digest(&SHA256, data).as_ref())
}

/// Errors that can occur during integrity verification
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// Checksum format is invalid (missing "sha256:" prefix)
    #[error("Invalid checksum format, expected 'sha256:...'")]
    InvalidFormat,

    /// Computed checksum doesn't match expected checksum
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Expected checksum (hex string without prefix)
        expected: String,
        /// Actual computed checksum (hex string without prefix)
        actual: String,
    },
}

//! Report identity
//!
//! A report's document key is the SHA-256 digest of its title followed by its
//! link, hex encoded. The same article therefore maps to the same key on every
//! run, which is what turns repeated scrapes into overwrites.

use sha2::{Digest, Sha256};

/// Length of a fingerprint in hex characters
pub const FINGERPRINT_LEN: usize = 64;

/// Computes the fingerprint of an article from its title and link
///
/// # Example
///
/// ```
/// use report_harvester::fingerprint;
///
/// let a = fingerprint("A", "L");
/// assert_eq!(a, fingerprint("A", "L"));
/// assert_eq!(a.len(), 64);
/// ```
pub fn fingerprint(title: &str, link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(link.as_bytes());
    hex::encode(hasher.finalize())
}

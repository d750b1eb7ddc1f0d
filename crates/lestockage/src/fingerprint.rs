// Catalog fingerprint
//
// *L'Empreinte* (The Fingerprint) - Stable content hash of the catalog bytes

/// Number of hex characters kept from the BLAKE3 digest
pub const FINGERPRINT_LEN: usize = 16;

/// Fingerprint the raw catalog bytes
///
/// A truncated BLAKE3 hex digest. Pure and stable across runs and platforms,
/// so identical bytes always map to the same cache key.
///
/// ```
/// use lestockage::compute_fingerprint;
///
/// let a = compute_fingerprint(b"{\"items\":[]}");
/// assert_eq!(a.len(), 16);
/// assert_eq!(a, compute_fingerprint(b"{\"items\":[]}"));
/// ```
pub fn compute_fingerprint(bytes: &[u8]) -> String {
    let hex = blake3::hash(bytes).to_hex();
    hex.as_str()[..FINGERPRINT_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_hex() {
        let fp = compute_fingerprint(b"catalog");
        assert_eq!(fp.len(), FINGERPRINT_LEN);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, compute_fingerprint(b"catalog"));
    }

    #[test]
    fn one_byte_changes_fingerprint() {
        assert_ne!(compute_fingerprint(b"catalog"), compute_fingerprint(b"catalog!"));
        assert_ne!(compute_fingerprint(b"catalog"), compute_fingerprint(b"Catalog"));
    }

    #[test]
    fn empty_input_has_a_fingerprint() {
        assert_eq!(compute_fingerprint(b"").len(), FINGERPRINT_LEN);
    }
}

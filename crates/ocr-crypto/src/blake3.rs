//! Domain-separated BLAKE3 hashing for the OCR feed.
//!
//! Every hash in the feed is computed in BLAKE3 key-derivation mode under a
//! registered context string, so a report digest can never collide with a
//! signer address or a configuration digest.
//!
//! ## Context Strings
//!
//! The registered context strings live in [`contexts`]. Using an
//! unregistered context string is a protocol violation.

/// Registered BLAKE3 context strings.
pub mod contexts {
    /// Digest of an encoded report; this is what every signer signs.
    pub const REPORT_DIGEST: &str = "OCR v1 report-digest";
    /// Derivation of a 20-byte signer address from a public key.
    pub const SIGNER_ADDRESS: &str = "OCR v1 signer-address";
    /// Derivation of a configuration digest from the oracle set.
    pub const CONFIG_DIGEST: &str = "OCR v1 config-digest";

    /// All registered context strings. Used for validation.
    pub const ALL_CONTEXTS: &[&str] = &[REPORT_DIGEST, SIGNER_ADDRESS, CONFIG_DIGEST];
}

/// Derive a 32-byte value using BLAKE3's key derivation mode.
///
/// # Arguments
///
/// * `context` - One of the registered [`contexts`]
/// * `key_material` - The input bytes
///
/// Debug builds panic on an unregistered context.
pub fn derive_key(context: &str, key_material: &[u8]) -> [u8; 32] {
    debug_assert!(
        is_registered_context(context),
        "unregistered BLAKE3 context {context:?}"
    );
    let mut hasher = ::blake3::Hasher::new_derive_key(context);
    hasher.update(key_material);
    *hasher.finalize().as_bytes()
}

/// Verify that a context string is registered.
pub fn is_registered_context(context: &str) -> bool {
    contexts::ALL_CONTEXTS.contains(&context)
}

/// Encode multiple dynamic fields using length-prefixed encoding.
///
/// `LE32(len(field1)) || field1 || LE32(len(field2)) || field2 || ...`
pub fn encode_multi_field(fields: &[&[u8]]) -> Vec<u8> {
    let total_len: usize = fields.iter().map(|f| 4 + f.len()).sum();
    let mut output = Vec::with_capacity(total_len);
    for field in fields {
        output.extend_from_slice(&(field.len() as u32).to_le_bytes());
        output.extend_from_slice(field);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_strings_prefixed() {
        for ctx in contexts::ALL_CONTEXTS {
            assert!(
                ctx.starts_with("OCR v1 "),
                "Context string '{ctx}' has wrong prefix"
            );
        }
    }

    #[test]
    fn test_derive_key_deterministic() {
        let input = b"OCR test vector 1";
        assert_eq!(
            derive_key(contexts::REPORT_DIGEST, input),
            derive_key(contexts::REPORT_DIGEST, input)
        );
        assert_ne!(
            derive_key(contexts::REPORT_DIGEST, b"input1"),
            derive_key(contexts::REPORT_DIGEST, b"input2")
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unregistered BLAKE3 context")]
    fn test_derive_key_rejects_unregistered_context() {
        derive_key("OCR v1 made-up-context", &[0u8; 32]);
    }

    #[test]
    fn test_derive_key_domain_separation() {
        let a = derive_key(contexts::REPORT_DIGEST, &[0u8; 32]);
        let b = derive_key(contexts::SIGNER_ADDRESS, &[0u8; 32]);
        let c = derive_key(contexts::CONFIG_DIGEST, &[0u8; 32]);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        assert_ne!(a, *::blake3::hash(&[0u8; 32]).as_bytes());
    }

    #[test]
    fn test_multi_field_encoding() {
        let encoded = encode_multi_field(&[b"hello", b"world"]);
        assert_eq!(encoded.len(), 4 + 5 + 4 + 5);
        assert_eq!(&encoded[0..4], &5u32.to_le_bytes());
        assert_eq!(&encoded[4..9], b"hello");
        assert_eq!(&encoded[9..13], &5u32.to_le_bytes());
        assert_eq!(&encoded[13..18], b"world");
    }

    #[test]
    fn test_multi_field_boundaries_matter() {
        // "ab" + "c" must not collide with "a" + "bc"
        assert_ne!(
            encode_multi_field(&[b"ab", b"c"]),
            encode_multi_field(&[b"a", b"bc"])
        );
    }

    #[test]
    fn test_is_registered_context() {
        assert!(is_registered_context("OCR v1 report-digest"));
        assert!(!is_registered_context("OCR v1 made-up-context"));
    }
}

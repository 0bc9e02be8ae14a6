use sha2::{Digest, Sha256};

/// SHA-256 over the full file bytes, lowercase hex. This digest is the
/// identity of a creative or report for every cache and dedup check; it
/// never depends on filename, mime type or upload time.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(content_hash(b"creative bytes"), content_hash(b"creative bytes"));
    }

    #[test]
    fn test_distinct_inputs_differ() {
        assert_ne!(content_hash(b"report-a"), content_hash(b"report-b"));
    }

    #[test]
    fn test_known_vector() {
        // SHA-256 of the empty string
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_lowercase_hex_64_chars() {
        let h = content_hash(b"ad1.mp4 contents");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}

use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the extract's UTF-8 bytes.
pub fn fingerprint(extract: &str) -> String {
    let digest = Sha256::digest(extract.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::fingerprint;

    #[test]
    fn known_digest_of_empty_string() {
        assert_eq!(
            fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn stable_and_distinct() {
        let a = "Hard Tennis Beginner Class https://example.org/a";
        let b = "Hard Tennis Beginner Class https://example.org/b";
        assert_eq!(fingerprint(a), fingerprint(a));
        assert_ne!(fingerprint(a), fingerprint(b));
        assert_eq!(fingerprint(a).len(), 64);
    }

    #[test]
    fn non_ascii_text_hashes_as_utf8() {
        assert_eq!(fingerprint("硬式テニス"), fingerprint(&String::from("硬式テニス")));
        assert_ne!(fingerprint("硬式テニス"), fingerprint("軟式テニス"));
    }
}

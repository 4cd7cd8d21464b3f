use crate::types::{InfoHash, HASH_LEN};

/// Computes BLAKE3 and returns the first-class 32-byte digest value.
pub fn blake3_32(input: &[u8]) -> [u8; 32] {
    *blake3::hash(input).as_bytes()
}

/// Hashes arbitrary bytes down to a 20-byte DHT location.
pub fn info_hash(input: &[u8]) -> InfoHash {
    let digest = blake3_32(input);
    let mut out = [0_u8; HASH_LEN];
    out.copy_from_slice(&digest[..HASH_LEN]);
    InfoHash(out)
}

#[cfg(test)]
mod tests {
    use super::{blake3_32, info_hash};

    #[test]
    fn hash_is_deterministic() {
        let input = b"ringdht";
        assert_eq!(blake3_32(input), blake3_32(input));
        assert_eq!(info_hash(input), info_hash(input));
    }

    #[test]
    fn hash_changes_when_input_changes() {
        assert_ne!(info_hash(b"ringdht-a"), info_hash(b"ringdht-b"));
    }

    #[test]
    fn info_hash_is_blake3_prefix() {
        let digest = blake3_32(b"key");
        assert_eq!(info_hash(b"key").0[..], digest[..20]);
    }
}

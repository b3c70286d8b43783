use sha2::{Digest, Sha256};

/// Hex length of a seed (SHA-256 rendered as lowercase hex).
pub const SEED_HEX_LEN: usize = 64;

/// Deterministic seed: the sole source of pseudo-randomness for a request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Seed(String);

impl Seed {
    /// Wrap an existing hex string without re-deriving it.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Seed(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading `n` hex characters, if the seed is long enough.
    pub fn prefix(&self, n: usize) -> Option<&str> {
        self.0.get(..n)
    }
}

impl std::fmt::Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// SHA-256 over `identifier || decimal(chain_id) || decimal(timestamp)`.
pub fn derive_seed(identifier: &str, chain_id: i64, timestamp: i64) -> Seed {
    let mut hasher = Sha256::new();
    hasher.update(identifier.as_bytes());
    hasher.update(chain_id.to_string().as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    Seed(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_seed() {
        let seed = derive_seed("evt1", 1, 1700000000);
        assert_eq!(
            seed.as_str(),
            "2333c78acaa0561f0e2ccf3d494089d112c2e6a3a4b7e6f0e17ad0b83bb5e00c"
        );
        assert_eq!(seed.as_str().len(), SEED_HEX_LEN);
    }

    #[test]
    fn fields_are_concatenated_without_separator() {
        // "a" + "12" + "3" and "a1" + "2" + "3" hash the same bytes.
        assert_eq!(derive_seed("a", 12, 3), derive_seed("a1", 2, 3));
        assert_ne!(derive_seed("a", 1, 23), derive_seed("a", 1, 24));
    }

    #[test]
    fn prefix_guard() {
        let short = Seed::from_hex("abc");
        assert_eq!(short.prefix(2), Some("ab"));
        assert_eq!(short.prefix(8), None);
    }
}

use crate::keccak::keccak256_hex;
use crate::probability::Probability;

/// Domain-separation salt appended to every commitment preimage.
pub const COMMITMENT_SALT: &str = "oraclex";

/// Length of a rendered commitment: `0x` plus 64 hex chars.
pub const COMMITMENT_HEX_LEN: usize = 66;

/// `keccak256(decimal(p) || explanation || "oraclex")`, rendered `0x` + lowercase hex.
pub fn bind_commitment(probability: Probability, explanation: &str) -> String {
    let mut preimage = probability.to_string().into_bytes();
    preimage.extend_from_slice(explanation.as_bytes());
    preimage.extend_from_slice(COMMITMENT_SALT.as_bytes());
    keccak256_hex(&preimage)
}

/// Check a claimed commitment against a (probability, explanation) pair.
///
/// The `0x` prefix is required; hex digits compare case-insensitively.
pub fn verify_commitment(probability: Probability, explanation: &str, claimed: &str) -> bool {
    if claimed.len() != COMMITMENT_HEX_LEN || !claimed.starts_with("0x") {
        return false;
    }
    let expected = bind_commitment(probability, explanation);
    expected.eq_ignore_ascii_case(claimed)
}

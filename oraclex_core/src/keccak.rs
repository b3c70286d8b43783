//! Keccak-256 provider seam.
//!
//! Commitments must match on-chain `keccak256`, which uses the original Keccak
//! padding rather than SHA3-256. Two providers are available and the active one
//! is chosen at build time:
//!
//! - `keccak-rustcrypto` (default): `sha3::Keccak256`
//! - `keccak-tiny`: `tiny_keccak::Keccak`, preferred whenever the feature is on
//!
//! Both must yield identical digests for identical input.

#[cfg(not(any(feature = "keccak-rustcrypto", feature = "keccak-tiny")))]
compile_error!("enable one of the `keccak-rustcrypto` or `keccak-tiny` features");

/// A Keccak-256 implementation. Stateless: each call hashes from scratch.
pub trait Keccak256Provider {
    /// Short provider name, for logs.
    const NAME: &'static str;

    fn digest(data: &[u8]) -> [u8; 32];
}

#[cfg(feature = "keccak-rustcrypto")]
#[derive(Clone, Copy, Debug, Default)]
pub struct RustCryptoKeccak;

#[cfg(feature = "keccak-rustcrypto")]
impl Keccak256Provider for RustCryptoKeccak {
    const NAME: &'static str = "sha3";

    fn digest(data: &[u8]) -> [u8; 32] {
        use sha3::{Digest, Keccak256};

        let mut hasher = Keccak256::new();
        hasher.update(data);
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        out
    }
}

#[cfg(feature = "keccak-tiny")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TinyKeccak;

#[cfg(feature = "keccak-tiny")]
impl Keccak256Provider for TinyKeccak {
    const NAME: &'static str = "tiny-keccak";

    fn digest(data: &[u8]) -> [u8; 32] {
        use tiny_keccak::{Hasher, Keccak};

        let mut hasher = Keccak::v256();
        hasher.update(data);
        let mut out = [0u8; 32];
        hasher.finalize(&mut out);
        out
    }
}

#[cfg(feature = "keccak-tiny")]
pub type DefaultKeccak = TinyKeccak;

#[cfg(all(feature = "keccak-rustcrypto", not(feature = "keccak-tiny")))]
pub type DefaultKeccak = RustCryptoKeccak;

/// Keccak-256 with the build's provider.
#[inline]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    DefaultKeccak::digest(data)
}

/// `0x`-prefixed lowercase hex Keccak-256.
pub fn keccak256_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(keccak256(data)))
}

use serde::{Deserialize, Serialize};

use crate::error::{OracleError, OracleResult};
use crate::seed::Seed;

pub const PROBABILITY_MIN: u8 = 10;
pub const PROBABILITY_MAX: u8 = 89;

const PREFIX_LEN: usize = 8;
const SPAN: u32 = (PROBABILITY_MAX - PROBABILITY_MIN + 1) as u32;

/// Integer probability in `[10, 89]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Probability(u8);

impl Probability {
    pub fn new(value: u8) -> Option<Self> {
        (PROBABILITY_MIN..=PROBABILITY_MAX)
            .contains(&value)
            .then_some(Probability(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Probability {
    type Error = OracleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Probability::new(value).ok_or_else(|| {
            OracleError::malformed(format!(
                "probability {value} outside [{PROBABILITY_MIN}, {PROBABILITY_MAX}]"
            ))
        })
    }
}

impl From<Probability> for u8 {
    fn from(p: Probability) -> u8 {
        p.0
    }
}

impl std::fmt::Display for Probability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `(u32(seed[..8]) mod 80) + 10`.
pub fn extract_probability(seed: &Seed) -> OracleResult<Probability> {
    let prefix = seed
        .prefix(PREFIX_LEN)
        .ok_or_else(|| OracleError::derivation("seed prefix not available"))?;
    let not_hex = || OracleError::derivation(format!("seed prefix {prefix:?} is not hex"));
    if !prefix.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(not_hex());
    }
    let v = u32::from_str_radix(prefix, 16).map_err(|_| not_hex())?;

    Ok(Probability(PROBABILITY_MIN + (v % SPAN) as u8))
}

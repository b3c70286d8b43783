use serde::{Deserialize, Serialize};

use crate::probability::Probability;

/// Probability assumed for markets without a commitment.
pub const UNCOMMITTED_PROBABILITY: u8 = 50;

/// Liquidity split between the YES and NO sides of a market vault.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquiditySplit {
    pub yes_amt: u128,
    pub no_amt: u128,
}

/// `yes = balance * p / 100`, `no = balance - yes`.
///
/// `yes + no == balance` always holds; the remainder of the division lands on NO.
pub fn split_liquidity(balance: u128, probability: Option<Probability>) -> LiquiditySplit {
    let p = probability.map_or(UNCOMMITTED_PROBABILITY, Probability::value) as u128;

    let yes_amt = match balance.checked_mul(p) {
        Some(scaled) => scaled / 100,
        // Same floor as the direct form, without the wide multiply.
        None => (balance / 100) * p + (balance % 100) * p / 100,
    };

    LiquiditySplit {
        yes_amt,
        no_amt: balance - yes_amt,
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    cfg::ResolverCfg,
    commitment::{bind_commitment, verify_commitment},
    error::OracleResult,
    explain::synthesize_explanation,
    keccak::{DefaultKeccak, Keccak256Provider},
    probability::{extract_probability, Probability},
    request::{normalize_request, Request},
    seed::derive_seed,
};

/// Pipeline output: the response record handed back to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub probability: Probability,
    pub explanation: String,
    #[serde(rename = "aiHash")]
    pub ai_hash: String,
}

/// Seed → probability → explanation → commitment for a canonical request.
pub fn resolve(req: &Request) -> OracleResult<Resolution> {
    let seed = derive_seed(&req.identifier, req.chain_id, req.timestamp);
    let probability = extract_probability(&seed)?;
    let explanation = synthesize_explanation(&req.identifier, &req.description, &seed)?;
    let ai_hash = bind_commitment(probability, &explanation);

    tracing::debug!(
        event_id = %req.identifier,
        chain_id = req.chain_id,
        timestamp = req.timestamp,
        probability = probability.value(),
        ai_hash = %ai_hash,
        keccak = DefaultKeccak::NAME,
        "resolved"
    );

    Ok(Resolution {
        probability,
        explanation,
        ai_hash,
    })
}

/// Normalize a loosely-typed record, then resolve it.
pub fn resolve_value(raw: &Value, cfg: &ResolverCfg) -> OracleResult<Resolution> {
    let req = normalize_request(raw, cfg)?;
    resolve(&req)
}

/// Field-by-field comparison of a claimed resolution against a recomputation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub probability_matches: bool,
    pub explanation_matches: bool,
    pub commitment_matches: bool,
    /// The claimed hash commits to the claimed (probability, explanation) pair,
    /// independent of whether that pair is the one the request yields.
    pub commitment_consistent: bool,
}

impl AuditReport {
    pub fn is_valid(&self) -> bool {
        self.probability_matches
            && self.explanation_matches
            && self.commitment_matches
            && self.commitment_consistent
    }
}

/// Recompute `req` and compare against `claimed`.
pub fn audit(req: &Request, claimed: &Resolution) -> OracleResult<AuditReport> {
    let expected = resolve(req)?;
    let report = AuditReport {
        probability_matches: expected.probability == claimed.probability,
        explanation_matches: expected.explanation == claimed.explanation,
        commitment_matches: expected.ai_hash.eq_ignore_ascii_case(&claimed.ai_hash),
        commitment_consistent: verify_commitment(
            claimed.probability,
            &claimed.explanation,
            &claimed.ai_hash,
        ),
    };

    if !report.is_valid() {
        tracing::debug!(event_id = %req.identifier, ?report, "audit mismatch");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolution_wire_shape() {
        let r = resolve(&Request::new("evt1", "", 1700000000, 1)).unwrap();
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(
            v,
            json!({
                "probability": 68,
                "explanation": "Signals: words=0, keywordWeight=0, lengthSignal=0. Deterministic seed=2333c78acaa0",
                "aiHash": "0x4c0f51271e72376415bbb639e19f2f4597e8e334fbb5fdf59eb14e1d9792e4a1"
            })
        );
    }

    #[test]
    fn out_of_range_probability_does_not_deserialize() {
        let v = json!({ "probability": 95, "explanation": "", "aiHash": "0x" });
        assert!(serde_json::from_value::<Resolution>(v).is_err());
    }

    #[test]
    fn audit_flags_each_field() {
        let req = Request::new("evt1", "", 1700000000, 1);
        let good = resolve(&req).unwrap();
        assert!(audit(&req, &good).unwrap().is_valid());

        let mut forged = good.clone();
        forged.probability = Probability::new(11).unwrap();
        let report = audit(&req, &forged).unwrap();
        assert!(!report.probability_matches);
        assert!(report.explanation_matches);
        assert!(report.commitment_matches);
        assert!(!report.commitment_consistent);

        // Re-sealed forgery: internally consistent but not what the request yields.
        forged.ai_hash = bind_commitment(forged.probability, &forged.explanation);
        let report = audit(&req, &forged).unwrap();
        assert!(report.commitment_consistent);
        assert!(!report.commitment_matches);
        assert!(!report.is_valid());
    }
}

//! In-memory commitment registry.
//!
//! Holds one commitment per market, the way the verifier contract does
//! (`commitAI` / `getCommitment`), together with the committed probability the
//! backend used for liquidity allocation.
//!
//! No IO. Snapshots are plain data; callers decide how/where to store them.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use oraclex_core::{
    keccak256_hex, resolve_value, split_liquidity, verify_commitment, LiquiditySplit,
    OracleError, Probability, Resolution, ResolverCfg,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("market {market_key} already committed to {existing}; refusing {attempted}")]
    Conflict {
        market_key: String,
        existing: String,
        attempted: String,
    },

    #[error("no commitment for market {0}")]
    NotFound(String),

    #[error("invalid market id {0:?}: 0x ids must be 32 bytes of hex")]
    InvalidMarketId(String),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// What a market has committed to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub probability: Probability,
    pub explanation: String,
    pub ai_hash: String,
}

impl From<Resolution> for CommitRecord {
    fn from(r: Resolution) -> Self {
        CommitRecord {
            probability: r.probability,
            explanation: r.explanation,
            ai_hash: r.ai_hash,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    Inserted,
    /// Same commitment was already on record.
    Unchanged,
}

/// Snapshot of registry state. Sorted by market key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub records: Vec<(String, CommitRecord)>,
}

/// Counters returned by restore/import operations.
///
/// Every incoming record lands in exactly one bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreStats {
    /// Records inserted for markets that had no commitment.
    pub applied: usize,
    /// Records matching the commitment already on file.
    pub unchanged: usize,
    /// Records disagreeing with an existing commitment; the existing one is kept.
    pub conflicts: usize,
    /// Records with an invalid key or a hash that does not bind its own
    /// probability and explanation.
    pub rejected: usize,
}

const MARKET_KEY_HEX_LEN: usize = 64;

/// Registry key for a market id.
///
/// `0x`-prefixed ids are taken as already-hashed bytes32 values and must carry
/// exactly 64 hex digits. Anything else becomes `keccak256(utf8(id))`, i.e.
/// Solidity `keccak256(abi.encodePacked(id))`.
pub fn market_key(market_id: &str) -> RegistryResult<String> {
    let Some(digits) = market_id
        .strip_prefix("0x")
        .or_else(|| market_id.strip_prefix("0X"))
    else {
        return Ok(keccak256_hex(market_id.as_bytes()));
    };
    if digits.len() != MARKET_KEY_HEX_LEN || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RegistryError::InvalidMarketId(market_id.to_string()));
    }
    Ok(format!("0x{}", digits.to_ascii_lowercase()))
}

#[derive(Debug, Default)]
pub struct CommitmentRegistry {
    cfg: ResolverCfg,
    records: HashMap<String, CommitRecord>,
}

impl CommitmentRegistry {
    pub fn new(cfg: ResolverCfg) -> Self {
        Self {
            cfg,
            records: HashMap::new(),
        }
    }

    pub fn cfg(&self) -> &ResolverCfg {
        &self.cfg
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record a resolution for `market_id`.
    ///
    /// A market commits once. Re-committing the same hash is a no-op; a
    /// different hash is a conflict and leaves the existing record in place.
    pub fn commit(&mut self, market_id: &str, resolution: Resolution) -> RegistryResult<CommitOutcome> {
        let key = market_key(market_id)?;

        if let Some(existing) = self.records.get(&key) {
            if existing.ai_hash.eq_ignore_ascii_case(&resolution.ai_hash) {
                return Ok(CommitOutcome::Unchanged);
            }
            tracing::warn!(market = %key, existing = %existing.ai_hash, attempted = %resolution.ai_hash, "commitment conflict");
            return Err(RegistryError::Conflict {
                market_key: key,
                existing: existing.ai_hash.clone(),
                attempted: resolution.ai_hash,
            });
        }

        tracing::info!(
            market = %key,
            probability = resolution.probability.value(),
            ai_hash = %resolution.ai_hash,
            "commitment recorded"
        );
        self.records.insert(key, resolution.into());
        Ok(CommitOutcome::Inserted)
    }

    /// Run the pipeline on a raw request and commit the result.
    pub fn resolve_and_commit(&mut self, market_id: &str, raw: &Value) -> RegistryResult<Resolution> {
        let resolution = resolve_value(raw, &self.cfg)?;
        self.commit(market_id, resolution.clone())?;
        Ok(resolution)
    }

    /// An invalid market id has no record.
    pub fn record(&self, market_id: &str) -> Option<&CommitRecord> {
        let key = market_key(market_id).ok()?;
        self.records.get(&key)
    }

    /// The committed hash for a market (`getCommitment`).
    pub fn commitment(&self, market_id: &str) -> Option<&str> {
        self.record(market_id).map(|r| r.ai_hash.as_str())
    }

    pub fn probability(&self, market_id: &str) -> Option<Probability> {
        self.record(market_id).map(|r| r.probability)
    }

    /// Check a revealed (probability, explanation) pair against the stored commitment.
    pub fn verify(&self, market_id: &str, probability: Probability, explanation: &str) -> RegistryResult<bool> {
        let key = market_key(market_id)?;
        let record = self.records.get(&key).ok_or(RegistryError::NotFound(key))?;
        Ok(verify_commitment(probability, explanation, &record.ai_hash))
    }

    /// Split a vault balance by the market's committed probability (50 if none).
    pub fn allocation(&self, market_id: &str, balance: u128) -> LiquiditySplit {
        split_liquidity(balance, self.probability(market_id))
    }

    /// Drop a single market's record.
    pub fn clear_market(&mut self, market_id: &str) -> Option<CommitRecord> {
        let key = market_key(market_id).ok()?;
        self.records.remove(&key)
    }

    /// Export all records. Sorted by market key.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.snapshot_filtered(|_, _| true)
    }

    /// Export records matching a predicate. Sorted by market key.
    pub fn snapshot_filtered<F>(&self, mut predicate: F) -> RegistrySnapshot
    where
        F: FnMut(&str, &CommitRecord) -> bool,
    {
        let mut out: Vec<(String, CommitRecord)> = self
            .records
            .iter()
            .filter(|(k, v)| predicate(k.as_str(), *v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        RegistrySnapshot { records: out }
    }

    /// Export only the given markets (raw ids or keys). Sorted by market key.
    pub fn snapshot_markets(&self, market_ids: &[&str]) -> RegistrySnapshot {
        let want: HashSet<String> = market_ids.iter().filter_map(|id| market_key(id).ok()).collect();
        self.snapshot_filtered(|key, _| want.contains(key))
    }

    /// Replace all state with the snapshot's records.
    pub fn restore(&mut self, snap: RegistrySnapshot) -> RestoreStats {
        self.import_state(snap.records)
    }

    /// Merge a snapshot into current state. Existing commitments are kept.
    pub fn restore_merge(&mut self, snap: RegistrySnapshot) -> RestoreStats {
        self.import_state_merge(snap.records)
    }

    /// Clear, then insert `(market_key, record)` pairs.
    pub fn import_state<I>(&mut self, iter: I) -> RestoreStats
    where
        I: IntoIterator<Item = (String, CommitRecord)>,
    {
        self.records.clear();
        self.import_state_merge(iter)
    }

    /// Insert `(market_key, record)` pairs without clearing.
    ///
    /// Each record goes through the same write-once check as `commit`: a
    /// market already on file keeps its commitment. Records whose hash does
    /// not verify against their own probability and explanation are dropped.
    /// Keys are normalized through `market_key`, so snapshots written with
    /// upper-case hex land on the same entries.
    pub fn import_state_merge<I>(&mut self, iter: I) -> RestoreStats
    where
        I: IntoIterator<Item = (String, CommitRecord)>,
    {
        let mut stats = RestoreStats::default();
        for (raw_key, record) in iter {
            let Ok(key) = market_key(&raw_key) else {
                tracing::warn!(market = %raw_key, "restore: invalid market key");
                stats.rejected += 1;
                continue;
            };
            if !verify_commitment(record.probability, &record.explanation, &record.ai_hash) {
                tracing::warn!(market = %key, ai_hash = %record.ai_hash, "restore: record does not verify");
                stats.rejected += 1;
                continue;
            }
            match self.records.get(&key) {
                Some(existing) if existing.ai_hash.eq_ignore_ascii_case(&record.ai_hash) => {
                    stats.unchanged += 1;
                }
                Some(existing) => {
                    tracing::warn!(market = %key, existing = %existing.ai_hash, attempted = %record.ai_hash, "restore: commitment conflict");
                    stats.conflicts += 1;
                }
                None => {
                    self.records.insert(key, record);
                    stats.applied += 1;
                }
            }
        }
        stats
    }
}

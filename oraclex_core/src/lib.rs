pub mod error;
pub mod cfg;
pub mod request;
pub mod seed;
pub mod probability;
pub mod explain;
pub mod keccak;
pub mod commitment;
pub mod resolve;
pub mod allocation;

pub use error::{OracleError, OracleResult};
pub use cfg::{ResolverCfg, TimestampPolicy};
pub use request::{Request, normalize_request, normalize_request_at};
pub use seed::{Seed, derive_seed, SEED_HEX_LEN};
pub use probability::{Probability, extract_probability, PROBABILITY_MIN, PROBABILITY_MAX};
pub use explain::{Signals, compute_signals, render_explanation, synthesize_explanation, KEYWORDS, MAX_EXPLANATION_CHARS};
pub use keccak::{Keccak256Provider, DefaultKeccak, keccak256, keccak256_hex};
pub use commitment::{bind_commitment, verify_commitment, COMMITMENT_SALT};
pub use resolve::{Resolution, AuditReport, resolve, resolve_value, audit};
pub use allocation::{LiquiditySplit, split_liquidity, UNCOMMITTED_PROBABILITY};

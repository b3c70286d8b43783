use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cfg::{ResolverCfg, TimestampPolicy};
use crate::error::{OracleError, OracleResult};

/// Canonical request after coercion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(rename = "eventId")]
    pub identifier: String,
    pub description: String,
    /// Unix seconds.
    pub timestamp: i64,
    pub chain_id: i64,
}

impl Request {
    pub fn new(
        identifier: impl Into<String>,
        description: impl Into<String>,
        timestamp: i64,
        chain_id: i64,
    ) -> Self {
        Request {
            identifier: identifier.into(),
            description: description.into(),
            timestamp,
            chain_id,
        }
    }
}

/// Coerce a loosely-typed record into a `Request`, reading the clock only
/// when the cfg allows the wall-clock fallback.
pub fn normalize_request(raw: &Value, cfg: &ResolverCfg) -> OracleResult<Request> {
    normalize_request_at(raw, cfg, unix_now)
}

/// Same as `normalize_request` with an injectable clock.
pub fn normalize_request_at<F>(raw: &Value, cfg: &ResolverCfg, now: F) -> OracleResult<Request>
where
    F: FnOnce() -> i64,
{
    let obj = raw
        .as_object()
        .ok_or_else(|| OracleError::malformed("request must be a JSON object"))?;

    let identifier = coerce_string(obj, "eventId")?;
    let description = coerce_string(obj, "description")?;

    let timestamp = match coerce_int(obj, "timestamp")? {
        Some(ts) => ts,
        None => match cfg.timestamp_policy {
            TimestampPolicy::Require => {
                return Err(OracleError::malformed("timestamp is required"));
            }
            TimestampPolicy::WallClock => {
                let ts = now();
                tracing::warn!(
                    event_id = %identifier,
                    timestamp = ts,
                    "timestamp missing; using wall clock, result is not reproducible"
                );
                ts
            }
        },
    };

    let chain_id = coerce_int(obj, "chainId")?.unwrap_or(0);

    Ok(Request {
        identifier,
        description,
        timestamp,
        chain_id,
    })
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn coerce_string(obj: &Map<String, Value>, key: &str) -> OracleResult<String> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(true)) => Ok("True".to_string()),
        Some(Value::Bool(false)) => Ok("False".to_string()),
        Some(_) => Err(OracleError::malformed(format!("{key} must be a string"))),
    }
}

/// `Ok(None)` means absent or null; anything present must coerce.
fn coerce_int(obj: &Map<String, Value>, key: &str) -> OracleResult<Option<i64>> {
    let not_int = || OracleError::malformed(format!("{key} must be an integer"));

    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_i64() {
                return Ok(Some(v));
            }
            // Floats truncate toward zero; u64 beyond i64 does not fit.
            match n.as_f64() {
                Some(f) if n.is_f64() && f.is_finite() && f.abs() < i64::MAX as f64 => {
                    Ok(Some(f.trunc() as i64))
                }
                _ => Err(not_int()),
            }
        }
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| not_int()),
        Some(Value::Bool(b)) => Ok(Some(i64::from(*b))),
        Some(_) => Err(not_int()),
    }
}

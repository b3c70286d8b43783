//! Boundary adapter: raw request bytes in, response envelope out.
//!
//! This module does not read or write anything itself; callers own the pipe.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use oraclex_core::{resolve_value, OracleError, OracleResult, Resolution, ResolverCfg};

/// Wire response: either the resolution or `{ "error": ... }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    Ok(Resolution),
    Err { error: String },
}

impl Envelope {
    pub fn is_error(&self) -> bool {
        matches!(self, Envelope::Err { .. })
    }
}

impl From<OracleResult<Resolution>> for Envelope {
    fn from(r: OracleResult<Resolution>) -> Self {
        match r {
            Ok(res) => Envelope::Ok(res),
            Err(e) => Envelope::Err { error: e.to_string() },
        }
    }
}

/// Parse request bytes into a loosely-typed record.
pub fn parse_request(input: &[u8]) -> OracleResult<Value> {
    if input.iter().all(u8::is_ascii_whitespace) {
        return Err(OracleError::malformed("empty input; provide a JSON request"));
    }
    serde_json::from_slice(input).map_err(|e| OracleError::malformed(e.to_string()))
}

/// Parse, normalize and resolve one request.
pub fn handle(input: &[u8], cfg: &ResolverCfg) -> Envelope {
    let result = parse_request(input).and_then(|raw| resolve_value(&raw, cfg));
    if let Err(e) = &result {
        tracing::debug!(error = %e, "request rejected");
    }
    result.into()
}

/// Render an envelope as compact (or indented) JSON.
pub fn render(envelope: &Envelope, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(envelope)
    } else {
        serde_json::to_string(envelope)
    };
    rendered.unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
}

/// `handle` + compact `render`.
pub fn handle_to_string(input: &[u8], cfg: &ResolverCfg) -> String {
    render(&handle(input, cfg), false)
}

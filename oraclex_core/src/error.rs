use thiserror::Error;

pub type OracleResult<T> = Result<T, OracleError>;

/// Failure signal exposed to the boundary layer.
///
/// The pipeline has no transient failure modes: input is either usable or it
/// isn't, and nothing is retried.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OracleError {
    /// The request could not be parsed or a field could not be coerced.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// An internal invariant of the derivation was violated.
    #[error("derivation error: {0}")]
    Derivation(String),
}

impl OracleError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        OracleError::MalformedRequest(msg.into())
    }

    pub fn derivation(msg: impl Into<String>) -> Self {
        OracleError::Derivation(msg.into())
    }
}

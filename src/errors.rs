use thiserror::Error;

/// Error type that captures common ledger failures.
///
/// Dirty financial data never surfaces here: malformed records degrade to
/// zero or are skipped during aggregation. These variants cover storage I/O
/// and programmer-error inputs such as an unparseable period key.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid reference: {0}")]
    InvalidRef(String),
}

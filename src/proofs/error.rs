use thiserror::Error;

/// Main error type for slot derivation and proof assembly
#[derive(Error, Debug)]
pub enum ProofError {
    /// A step was invoked for a logical name that has no root bundle yet
    #[error("no proof bundle named '{name}': roots must be generated first")]
    MissingBundle { name: String },

    /// Malformed derivation or encoding input
    #[error("malformed {what}: {detail}")]
    MalformedInput { what: String, detail: String },

    /// Required data absent from an RPC response
    #[error("missing data: {what}")]
    MissingData { what: String },

    /// RLP decoding failures
    #[error("rlp decoding failed: {0}")]
    Rlp(#[from] rlp::DecoderError),

    /// Generic errors from other sources (transport, persistence)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProofError {
    /// Create a missing-bundle precondition error
    pub fn missing_bundle(name: impl Into<String>) -> Self {
        Self::MissingBundle { name: name.into() }
    }

    /// Create a malformed-input error
    pub fn malformed(what: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedInput {
            what: what.into(),
            detail: detail.into(),
        }
    }

    /// Create a missing-data error
    pub fn missing_data(what: impl Into<String>) -> Self {
        Self::MissingData { what: what.into() }
    }
}

/// Result type alias using ProofError
pub type ProofResult<T> = Result<T, ProofError>;

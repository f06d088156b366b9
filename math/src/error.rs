use thiserror::Error;

/// Failure taxonomy shared by every layer of the workspace.
///
/// All variants are raised synchronously where the misuse is detected and
/// are never corrected silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Key or ciphertext dimensions, moduli or layouts disagree.
    #[error("parameter mismatch: {0}")]
    ParameterMismatch(String),
    /// Operation invoked on a polynomial in the wrong domain or form.
    #[error("domain error: {0}")]
    DomainError(String),
    /// Input exceeds what the chosen reduction supports.
    #[error("range error: {0}")]
    RangeError(String),
    /// The allocator service declined a request.
    #[error("allocation failure: {0}")]
    AllocationFailure(String),
    /// Key pack failed header or checksum validation.
    #[error("key pack corrupt: {0}")]
    KeyPackCorrupt(String),
}

pub type Result<T> = std::result::Result<T, Error>;

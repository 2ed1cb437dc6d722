//! Error returned to callers awaiting an [`crate::AsyncResult`].

use model::{DomainError, Fault};
use thiserror::Error;

/// Terminal failure of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The fault, envelope failure, or decode failure was mapped onto the
    /// taxonomy.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The transport delivered a fault outside the classification contract.
    /// It is surfaced unchanged rather than mapped onto a guessed category.
    #[error("unclassified fault: {0}")]
    Unclassified(Fault),
}

impl BridgeError {
    /// Returns the domain error, if this failure was classified.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(err) => Some(err),
            Self::Unclassified(_) => None,
        }
    }
}

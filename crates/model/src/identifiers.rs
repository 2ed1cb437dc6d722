//! Invocation identifier.
//!
//! Each call issued through the bridge is tagged with an [`InvocationId`] so
//! every diagnostic emitted for it, on the issuing thread or on the transport's
//! callback thread, can be correlated.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a single invocation (one trigger, one terminal event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

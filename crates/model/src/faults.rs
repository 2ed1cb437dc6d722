//! Fault values delivered by a transport on the failure path.
//!
//! A transport reports one of three things: a transport-level RPC fault with a
//! known kind, an exception raised by the remote (or local) code carrying free
//! text, or a fatal condition that is not an exception at all. Only the first
//! two are classified; see [`crate::classify`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transport-level fault subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcFaultKind {
    /// The call did not complete within the transport's deadline.
    Timeout,
    /// The remote endpoint could not be reached.
    Network,
    /// Request or response could not be encoded or decoded.
    Serialization,
    /// The remote side refused the call.
    Forbidden,
    /// Business exception wrapped by the transport.
    Business,
    /// The transport could not tell what went wrong.
    Unknown,
}

/// A fault raised by the RPC transport itself.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("rpc {kind:?} fault: {message}")]
pub struct RpcFault {
    /// Subtype reported by the transport.
    pub kind: RpcFaultKind,
    /// Transport's description of the failure.
    pub message: String,
}

impl RpcFault {
    pub fn new(kind: RpcFaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// An exception raised by service code, identified by its type name and an
/// optional free-form message.
///
/// Older services embed `[_code:description_]` tokens in the message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}: {}", .type_name, .message.as_deref().unwrap_or("<no message>"))]
pub struct RemoteException {
    /// Type name of the raised exception, for diagnostics only.
    pub type_name: String,
    /// Exception message, if the exception carried one.
    pub message: Option<String>,
}

impl RemoteException {
    pub fn new(type_name: impl Into<String>, message: Option<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message,
        }
    }
}

/// A fatal condition that is not an exception (resource exhaustion, a broken
/// runtime invariant). Never mapped onto the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("fatal {kind}: {message}")]
pub struct FatalFault {
    /// Name of the fatal condition.
    pub kind: String,
    pub message: String,
}

/// Anything a transport can deliver on its failure entry point, and anything a
/// trigger can return when it fails to start a call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Fault {
    /// Transport-level failure with a known subtype.
    #[error(transparent)]
    Rpc(#[from] RpcFault),
    /// Exception raised by the called code.
    #[error(transparent)]
    Exception(#[from] RemoteException),
    /// Not an exception; passed through without classification.
    #[error(transparent)]
    Fatal(#[from] FatalFault),
}

impl Fault {
    /// Shorthand for an [`RpcFault`].
    pub fn rpc(kind: RpcFaultKind, message: impl Into<String>) -> Self {
        Self::Rpc(RpcFault::new(kind, message))
    }

    /// Shorthand for a [`RemoteException`] with a message.
    pub fn exception(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Exception(RemoteException::new(type_name, Some(message.into())))
    }
}

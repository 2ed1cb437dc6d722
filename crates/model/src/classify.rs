//! Fault classification.
//!
//! One-shot decision tree from a [`Fault`] to a [`DomainError`]:
//!
//! 1. Transport faults map by kind onto a taxonomy category; the message is
//!    ignored.
//! 2. Exceptions go through the legacy decoder; a message without a token falls
//!    back to `SYS_ERROR` carrying the raw message.
//! 3. Fatal faults are not classified and come back unchanged in `Err`.

use crate::legacy::{self, LegacyToken};
use crate::{DomainError, ErrorCategory, Fault, RemoteException, RpcFaultKind};

/// Description used when an exception carries no message at all.
pub const MISSING_MESSAGE_PLACEHOLDER: &str = "NullPointerException";

/// Maps a fault onto the taxonomy.
///
/// Returns `Err(fault)` unchanged for faults outside the classification
/// contract ([`Fault::Fatal`]).
pub fn classify(fault: Fault) -> Result<DomainError, Fault> {
    match fault {
        Fault::Rpc(rpc) => Ok(rpc_category(rpc.kind).to_error()),
        Fault::Exception(exception) => Ok(classify_exception(&exception)),
        fatal @ Fault::Fatal(_) => Err(fatal),
    }
}

/// Taxonomy category for a transport fault kind.
pub fn rpc_category(kind: RpcFaultKind) -> ErrorCategory {
    match kind {
        RpcFaultKind::Timeout => ErrorCategory::BusyService,
        RpcFaultKind::Network => ErrorCategory::NetworkConnectFailed,
        RpcFaultKind::Serialization => ErrorCategory::SerializationException,
        RpcFaultKind::Forbidden => ErrorCategory::ForbiddenException,
        RpcFaultKind::Business | RpcFaultKind::Unknown => ErrorCategory::RpcCallException,
    }
}

fn classify_exception(exception: &RemoteException) -> DomainError {
    let Some(message) = exception.message.as_deref() else {
        return ErrorCategory::SysError.with_description(MISSING_MESSAGE_PLACEHOLDER);
    };

    match legacy::decode(message) {
        Some(LegacyToken::Coded { code, description }) => DomainError::new(code, description),
        Some(LegacyToken::Uncoded(text)) => ErrorCategory::RemoteService.with_description(text),
        None => ErrorCategory::SysError.with_description(message),
    }
}

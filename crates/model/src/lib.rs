//! Domain model for the RPC completion bridge.
//!
//! This crate contains every concept that sits between "invocation issued" and
//! "single typed result delivered": the error taxonomy, the domain error and its
//! severity tagging, the fault model delivered by transports, the classifier that
//! maps faults onto the taxonomy, the legacy message decoder, and the response
//! envelope normaliser.
//!
//! ## Architectural Layer
//!
//! **Business logic.** This crate has no I/O dependencies. The `bridge` crate
//! drives it from transport callbacks; the `http-client` crate reuses the
//! taxonomy for HTTP failures.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`taxonomy`] | Static category → code/description table |
//! | [`errors`] | `DomainError`, `Severity`, `FailureInfo`, severity tagging |
//! | [`faults`] | Transport fault model (`Fault`, `RpcFault`, `RemoteException`) |
//! | [`legacy`] | `[_code:description_]` token decoder |
//! | [`classify`] | Fault → domain error decision tree |
//! | [`envelope`] | Completion outcome shapes and the normaliser |
//! | [`identifiers`] | `InvocationId` |

pub mod classify;
pub mod envelope;
pub mod errors;
pub mod faults;
pub mod identifiers;
pub mod legacy;
pub mod taxonomy;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use classify::classify;
pub use envelope::{
    ensure_success, normalize, CompletionOutcome, PagedEnvelope, PagedResult, SingleResult,
};
pub use errors::{severity_of, DomainError, FailureInfo, Severity};
pub use faults::{FatalFault, Fault, RemoteException, RpcFault, RpcFaultKind};
pub use identifiers::InvocationId;
pub use legacy::{decode, LegacyToken};
pub use taxonomy::{ErrorCategory, TaxonomyEntry, TAXONOMY};

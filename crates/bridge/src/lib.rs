//! Completion bridge between a callback-driven RPC transport and an awaitable
//! result.
//!
//! [`invoke`] runs a trigger that starts one remote call and hands back an
//! in-flight handle, registers exactly one [`ResponseCallback`] on that handle,
//! and returns an [`AsyncResult`] immediately. Whatever the transport later
//! delivers, the caller observes exactly one terminal event: a payload, "no
//! payload", or a [`BridgeError`].
//!
//! ## Architectural Layer
//!
//! **Orchestration.** Envelope normalisation and fault classification live in
//! the [`model`] crate; this crate sequences them around the transport callback
//! and owns the single-resolution guarantee.
//!
//! ## Transport integration
//!
//! Transports implement [`InFlightCall`] directly, or use [`call_slot`] to get a
//! ready-made handle plus a [`CallCompleter`] for their worker thread.

pub mod errors;
pub mod invoke;
pub mod slot;
pub mod telemetry;
pub mod transport;

pub use errors::BridgeError;
pub use invoke::{invoke, AsyncResult, CallResult};
pub use slot::{call_slot, CallCompleter, PendingCall};
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig, TelemetryError};
pub use transport::{Completion, InFlightCall, ResponseCallback};

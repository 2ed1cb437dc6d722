//! Ports between the bridge and an RPC transport.

use std::sync::Arc;

use model::{CompletionOutcome, Fault};

/// Receives the outcome of one in-flight call.
///
/// A well-behaved transport calls exactly one of the two methods exactly once.
/// Implementations must tolerate misbehaving transports: further calls are
/// ignored.
pub trait ResponseCallback: Send + Sync {
    /// The call completed. `None` means the remote returned no value.
    fn on_success(&self, outcome: Option<CompletionOutcome>);

    /// The call failed.
    fn on_fault(&self, fault: Fault);

    /// Routes a [`Completion`] to the matching entry point.
    fn complete(&self, completion: Completion) {
        match completion {
            Ok(outcome) => self.on_success(outcome),
            Err(fault) => self.on_fault(fault),
        }
    }
}

/// Outcome of a call as a single value, for transports that carry it around
/// before delivery.
pub type Completion = Result<Option<CompletionOutcome>, Fault>;

/// Handle to a call that has been started but not yet completed.
///
/// Returned by the trigger passed to [`crate::invoke`]. Registration consumes
/// the handle, so a second callback can never be attached.
pub trait InFlightCall {
    /// Attaches the callback. The transport may fire it on any thread, including
    /// before this method returns.
    fn set_callback(self, callback: Arc<dyn ResponseCallback>);
}

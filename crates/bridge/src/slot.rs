//! Ready-made in-flight call handle for transports.
//!
//! [`call_slot`] returns a [`PendingCall`] for the trigger to hand back to the
//! bridge and a [`CallCompleter`] for the transport worker. The two halves may
//! meet in either order: if the worker completes the call before the callback
//! is registered, the completion is held and delivered at registration.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use model::{CompletionOutcome, Fault};
use tracing::debug;

use crate::transport::{Completion, InFlightCall, ResponseCallback};

enum SlotState {
    Empty,
    Completed(Completion),
    Registered(Arc<dyn ResponseCallback>),
    Delivered,
}

struct Slot {
    state: Mutex<SlotState>,
}

impl Slot {
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Creates a connected handle/completer pair for one call.
pub fn call_slot() -> (PendingCall, CallCompleter) {
    let slot = Arc::new(Slot {
        state: Mutex::new(SlotState::Empty),
    });
    (
        PendingCall {
            slot: Arc::clone(&slot),
        },
        CallCompleter { slot },
    )
}

/// Bridge-facing half of a [`call_slot`].
pub struct PendingCall {
    slot: Arc<Slot>,
}

impl InFlightCall for PendingCall {
    fn set_callback(self, callback: Arc<dyn ResponseCallback>) {
        let completion = {
            let mut state = self.slot.lock();
            match std::mem::replace(&mut *state, SlotState::Delivered) {
                SlotState::Empty => {
                    *state = SlotState::Registered(callback);
                    return;
                }
                SlotState::Completed(completion) => completion,
                other => {
                    *state = other;
                    debug!("callback already registered on this call; ignoring");
                    return;
                }
            }
        };
        // Delivered outside the lock.
        debug!("call completed before callback registration; delivering now");
        callback.complete(completion);
    }
}

/// Transport-facing half of a [`call_slot`]. Fires once; consumed on use.
pub struct CallCompleter {
    slot: Arc<Slot>,
}

impl CallCompleter {
    /// Completes the call with a value (or no value).
    pub fn succeed(self, outcome: Option<CompletionOutcome>) {
        self.complete(Ok(outcome));
    }

    /// Completes the call with a fault.
    pub fn fail(self, fault: Fault) {
        self.complete(Err(fault));
    }

    /// Completes the call.
    pub fn complete(self, completion: Completion) {
        let callback = {
            let mut state = self.slot.lock();
            match std::mem::replace(&mut *state, SlotState::Delivered) {
                SlotState::Empty => {
                    *state = SlotState::Completed(completion);
                    return;
                }
                SlotState::Registered(callback) => callback,
                other => {
                    *state = other;
                    debug!("call already completed; ignoring");
                    return;
                }
            }
        };
        callback.complete(completion);
    }
}

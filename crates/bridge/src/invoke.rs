//! The completion bridge.
//!
//! [`invoke`] owns one invocation from trigger to terminal event. The pending
//! result is shared between the issuing thread and whichever thread the
//! transport fires the callback on; it is resolved by taking a one-shot sender
//! out of a mutex, so whichever path gets there first wins and every later
//! attempt finds nothing to send on.
//!
//! Diagnostics for a failure are always emitted before the sender fires, so a
//! caller can never observe a failure whose log line has not been written yet.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use model::{
    classify, normalize, CompletionOutcome, DomainError, ErrorCategory, Fault, InvocationId,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, error, info_span, Span};

use crate::transport::{InFlightCall, ResponseCallback};
use crate::BridgeError;

/// Terminal event of one invocation. `Ok(None)` is success without a payload.
pub type CallResult<T> = Result<Option<T>, BridgeError>;

/// Description used when a transport drops its callback without firing it.
pub const CALLBACK_DROPPED: &str = "completion callback dropped before the call completed";

/// Issues one call and returns its pending result without blocking.
///
/// `trigger` starts the call and returns the in-flight handle. If it fails, the
/// fault is classified and the result fails immediately; no callback is
/// registered. Otherwise exactly one callback is registered on the handle.
pub fn invoke<T, H, F>(trigger: F) -> AsyncResult<T>
where
    T: DeserializeOwned + Send + 'static,
    H: InFlightCall,
    F: FnOnce() -> Result<H, Fault>,
{
    let invocation_id = InvocationId::new_random();
    let span = info_span!("rpc_invocation", %invocation_id);
    let _entered = span.enter();

    let (sender, receiver) = oneshot::channel();
    let resolver = Resolver {
        sender: Mutex::new(Some(sender)),
        span: span.clone(),
    };

    match trigger() {
        Ok(call) => {
            call.set_callback(Arc::new(resolver));
            debug!("async rpc call issued");
        }
        Err(fault) => resolver.fail(fault, "async rpc call exception"),
    }

    AsyncResult {
        invocation_id,
        receiver,
    }
}

// ---------------------------------------------------------------------------
// Pending result
// ---------------------------------------------------------------------------

/// The caller's side of one invocation.
///
/// Awaiting it yields the single terminal event. Dropping it before completion
/// is allowed; the transport callback still runs to completion.
#[derive(Debug)]
#[must_use = "an AsyncResult does nothing unless awaited"]
pub struct AsyncResult<T> {
    invocation_id: InvocationId,
    receiver: oneshot::Receiver<CallResult<T>>,
}

impl<T> AsyncResult<T> {
    /// Identifier attached to every diagnostic of this invocation.
    pub fn invocation_id(&self) -> InvocationId {
        self.invocation_id
    }

    /// Returns the terminal event if it has already been published.
    pub fn try_result(&mut self) -> Option<CallResult<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(dropped_error())),
        }
    }
}

impl<T> Future for AsyncResult<T> {
    type Output = CallResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(dropped_error())))
    }
}

fn dropped_error() -> BridgeError {
    ErrorCategory::RpcCallException
        .with_description(CALLBACK_DROPPED)
        .into()
}

// ---------------------------------------------------------------------------
// Resolver (the registered callback)
// ---------------------------------------------------------------------------

struct Resolver<T> {
    sender: Mutex<Option<oneshot::Sender<CallResult<T>>>>,
    span: Span,
}

impl<T> Resolver<T> {
    /// Claims the right to resolve. Only the first caller gets the sender.
    fn claim(&self) -> Option<oneshot::Sender<CallResult<T>>> {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn publish(sender: oneshot::Sender<CallResult<T>>, result: CallResult<T>) {
        if sender.send(result).is_err() {
            debug!("pending result was dropped by its consumer; discarding outcome");
        }
    }

    fn fail(&self, fault: Fault, context: &str) {
        let Some(sender) = self.claim() else {
            debug!(%fault, "invocation already resolved; ignoring fault");
            return;
        };

        let cause = fault.to_string();
        let error = match classify(fault) {
            Ok(domain) => {
                domain.emit_diagnostic(context, Some(&cause as &dyn fmt::Display));
                BridgeError::Domain(domain)
            }
            Err(unclassified) => {
                error!(fault = %unclassified, "{context}: fault cannot be classified");
                BridgeError::Unclassified(unclassified)
            }
        };
        Self::publish(sender, Err(error));
    }
}

impl<T> Resolver<T>
where
    T: DeserializeOwned,
{
    fn unwrap_outcome(outcome: Option<CompletionOutcome>) -> CallResult<T> {
        let Some(outcome) = outcome else {
            debug!("async rpc result is null");
            return Ok(None);
        };

        match normalize(outcome) {
            Ok(None) => Ok(None),
            Ok(Some(payload)) => decode_payload(payload).map(Some),
            Err(failure) => {
                let error = DomainError::from(failure);
                error.emit_diagnostic("rpc returned a failed result", None);
                Err(error.into())
            }
        }
    }
}

fn decode_payload<T: DeserializeOwned>(payload: Value) -> Result<T, BridgeError> {
    serde_json::from_value(payload).map_err(|err| {
        let error = ErrorCategory::SerializationException.with_description(err.to_string());
        error.emit_diagnostic(
            "rpc result could not be decoded",
            Some(&err as &dyn fmt::Display),
        );
        error.into()
    })
}

impl<T> ResponseCallback for Resolver<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn on_success(&self, outcome: Option<CompletionOutcome>) {
        let _entered = self.span.enter();
        let Some(sender) = self.claim() else {
            debug!("invocation already resolved; ignoring duplicate completion");
            return;
        };
        let result = Self::unwrap_outcome(outcome);
        if result.is_ok() {
            debug!("async rpc call complete");
        }
        Self::publish(sender, result);
    }

    fn on_fault(&self, fault: Fault) {
        let _entered = self.span.enter();
        self.fail(fault, "async rpc call failed");
    }
}

impl<T> Drop for Resolver<T> {
    fn drop(&mut self) {
        let Some(sender) = self.claim() else {
            return;
        };
        let _entered = self.span.enter();
        let error = ErrorCategory::RpcCallException.with_description(CALLBACK_DROPPED);
        error.emit_diagnostic("async rpc call abandoned by transport", None);
        Self::publish(sender, Err(error.into()));
    }
}

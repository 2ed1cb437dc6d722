//! Integration tests for `bridge::invoke` against fake transports.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use bridge::{call_slot, invoke, BridgeError, InFlightCall, ResponseCallback};
use model::{
    CompletionOutcome, DomainError, ErrorCategory, FatalFault, Fault, PagedResult, RpcFaultKind,
    Severity,
};
use serde::Deserialize;
use serde_json::json;
use tracing_test::traced_test;

// ---------------------------------------------------------------------------
// Fake transport
// ---------------------------------------------------------------------------

/// Transport handle that parks the registered callback so the test decides
/// when (and how often) it fires.
#[derive(Clone, Default)]
struct ManualTransport {
    registered: Arc<Mutex<Option<Arc<dyn ResponseCallback>>>>,
    registrations: Arc<AtomicUsize>,
}

impl ManualTransport {
    fn call(&self) -> ManualCall {
        ManualCall {
            transport: self.clone(),
        }
    }

    fn callback(&self) -> Arc<dyn ResponseCallback> {
        self.registered
            .lock()
            .unwrap()
            .clone()
            .expect("no callback registered")
    }

    fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    fn forget_callback(&self) {
        self.registered.lock().unwrap().take();
    }
}

struct ManualCall {
    transport: ManualTransport,
}

impl InFlightCall for ManualCall {
    fn set_callback(self, callback: Arc<dyn ResponseCallback>) {
        self.transport.registrations.fetch_add(1, Ordering::SeqCst);
        *self.transport.registered.lock().unwrap() = Some(callback);
    }
}

fn outcome(value: serde_json::Value) -> Option<CompletionOutcome> {
    Some(CompletionOutcome::from_value(value))
}

fn domain(result: Result<Option<impl std::fmt::Debug>, BridgeError>) -> DomainError {
    match result {
        Err(BridgeError::Domain(err)) => err,
        other => panic!("expected a domain error, got {other:?}"),
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Account {
    id: u64,
    name: String,
}

// ---------------------------------------------------------------------------
// Success path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bare_value_is_delivered_unchanged() {
    let transport = ManualTransport::default();
    let pending = invoke::<String, _, _>(|| Ok(transport.call()));

    transport.callback().on_success(outcome(json!("hello")));

    assert_eq!(pending.await, Ok(Some("hello".to_string())));
}

#[tokio::test]
async fn single_result_data_is_unwrapped_and_typed() {
    let transport = ManualTransport::default();
    let pending = invoke::<Account, _, _>(|| Ok(transport.call()));

    transport.callback().on_success(outcome(json!({
        "success": true,
        "data": {"id": 7, "name": "ops"}
    })));

    assert_eq!(
        pending.await,
        Ok(Some(Account {
            id: 7,
            name: "ops".to_string()
        }))
    );
}

#[tokio::test]
async fn paged_result_is_delivered_whole() {
    let transport = ManualTransport::default();
    let pending = invoke::<PagedResult<Account>, _, _>(|| Ok(transport.call()));

    transport.callback().on_success(outcome(json!({
        "success": true,
        "data": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}],
        "totalCount": 42,
        "pageNo": 3,
        "pageSize": 2
    })));

    let page = pending.await.unwrap().unwrap();
    assert_eq!(page.total_count, 42);
    assert_eq!(page.page_no, 3);
    assert_eq!(page.data.len(), 2);
}

#[tokio::test]
async fn paged_result_reaches_the_caller_with_every_key() {
    let transport = ManualTransport::default();
    let pending = invoke::<serde_json::Value, _, _>(|| Ok(transport.call()));

    let page = json!({
        "success": true,
        "data": null,
        "totalCount": 0,
        "pageNo": 1,
        "pageSize": 20,
        "hasNext": false
    });
    transport.callback().on_success(outcome(page.clone()));

    assert_eq!(pending.await, Ok(Some(page)));
}

#[tokio::test]
async fn empty_page_decodes_into_a_typed_page() {
    let transport = ManualTransport::default();
    let pending = invoke::<PagedResult<Account>, _, _>(|| Ok(transport.call()));

    transport.callback().on_success(outcome(json!({
        "success": true,
        "data": null,
        "totalCount": 0,
        "pageNo": 1,
        "pageSize": 20
    })));

    let page = pending.await.unwrap().unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.page_size, 20);
}

#[tokio::test]
async fn void_call_resolves_as_success_without_payload() {
    let transport = ManualTransport::default();
    let pending = invoke::<Account, _, _>(|| Ok(transport.call()));

    transport.callback().on_success(None);

    assert_eq!(pending.await, Ok(None));
}

// ---------------------------------------------------------------------------
// Failure path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_single_result_becomes_domain_error() {
    let transport = ManualTransport::default();
    let pending = invoke::<Account, _, _>(|| Ok(transport.call()));

    transport.callback().on_success(outcome(json!({
        "success": false,
        "code": "1001",
        "description": "bad input"
    })));

    let err = domain(pending.await);
    assert_eq!(err.code, "1001");
    assert_eq!(err.description, "bad input");
    assert_eq!(err.severity, Some(Severity::Warn));
}

#[tokio::test]
async fn failed_envelope_with_numeric_description_is_not_a_success() {
    let transport = ManualTransport::default();
    let pending = invoke::<serde_json::Value, _, _>(|| Ok(transport.call()));

    transport.callback().on_success(outcome(json!({
        "success": false,
        "code": "2500",
        "description": 42
    })));

    let err = domain(pending.await);
    assert_eq!(err.code, "2500");
    assert_eq!(err.description, "42");
    assert_eq!(err.severity, Some(Severity::Alert));
}

#[tokio::test]
async fn failed_paged_result_never_delivers_the_page() {
    let transport = ManualTransport::default();
    let pending = invoke::<PagedResult<Account>, _, _>(|| Ok(transport.call()));

    transport.callback().on_success(outcome(json!({
        "success": false,
        "code": "2400",
        "description": "index offline",
        "data": [{"id": 1, "name": "a"}],
        "totalCount": 1
    })));

    let err = domain(pending.await);
    assert_eq!(err.code, "2400");
    assert_eq!(err.severity, Some(Severity::Alert));
}

#[tokio::test]
async fn timeout_fault_is_busy_service() {
    let transport = ManualTransport::default();
    let pending = invoke::<Account, _, _>(|| Ok(transport.call()));

    transport
        .callback()
        .on_fault(Fault::rpc(RpcFaultKind::Timeout, "[_2001:ignored_]"));

    assert_eq!(domain(pending.await), ErrorCategory::BusyService.to_error());
}

#[tokio::test]
async fn legacy_exception_text_is_decoded() {
    let transport = ManualTransport::default();
    let pending = invoke::<Account, _, _>(|| Ok(transport.call()));

    transport.callback().on_fault(Fault::exception(
        "BizException",
        "call failed [_1042:account locked_]",
    ));

    let err = domain(pending.await);
    assert_eq!(err.code, "1042");
    assert_eq!(err.description, "account locked");
}

#[tokio::test]
async fn exception_without_token_keeps_original_message() {
    let transport = ManualTransport::default();
    let pending = invoke::<Account, _, _>(|| Ok(transport.call()));

    transport
        .callback()
        .on_fault(Fault::exception("IllegalStateException", "pool closed"));

    assert_eq!(
        domain(pending.await),
        ErrorCategory::SysError.with_description("pool closed")
    );
}

#[tokio::test]
async fn fatal_fault_is_surfaced_unchanged() {
    let transport = ManualTransport::default();
    let pending = invoke::<Account, _, _>(|| Ok(transport.call()));
    let fatal = Fault::Fatal(FatalFault {
        kind: "StackOverflow".into(),
        message: "deep recursion".into(),
    });

    transport.callback().on_fault(fatal.clone());

    let err = pending.await.unwrap_err();
    assert!(err.as_domain().is_none());
    assert_eq!(err, BridgeError::Unclassified(fatal));
}

#[tokio::test]
async fn payload_of_wrong_shape_is_serialization_error() {
    let transport = ManualTransport::default();
    let pending = invoke::<Account, _, _>(|| Ok(transport.call()));

    transport
        .callback()
        .on_success(outcome(json!({"success": true, "data": "not an account"})));

    let err = domain(pending.await);
    assert_eq!(err.code, ErrorCategory::SerializationException.code());
}

// ---------------------------------------------------------------------------
// Single-completion guarantee
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_firing_keeps_the_first_outcome() {
    let transport = ManualTransport::default();
    let mut pending = invoke::<String, _, _>(|| Ok(transport.call()));

    let callback = transport.callback();
    callback.on_success(outcome(json!("first")));
    callback.on_success(outcome(json!("second")));
    callback.on_fault(Fault::rpc(RpcFaultKind::Network, "late"));

    assert_eq!(pending.try_result(), Some(Ok(Some("first".to_string()))));
    assert_eq!(transport.registrations(), 1);
}

#[tokio::test]
async fn duplicate_firing_after_fault_is_ignored() {
    let transport = ManualTransport::default();
    let pending = invoke::<String, _, _>(|| Ok(transport.call()));

    let callback = transport.callback();
    callback.on_fault(Fault::rpc(RpcFaultKind::Forbidden, "denied"));
    callback.on_success(outcome(json!("too late")));

    assert_eq!(
        domain(pending.await),
        ErrorCategory::ForbiddenException.to_error()
    );
}

#[tokio::test]
async fn concurrent_firings_resolve_exactly_once() {
    for _ in 0..50 {
        let transport = ManualTransport::default();
        let pending = invoke::<u32, _, _>(|| Ok(transport.call()));
        let callback = transport.callback();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let callback = Arc::clone(&callback);
                thread::spawn(move || {
                    if i % 2 == 0 {
                        callback.on_success(outcome(json!(i)));
                    } else {
                        callback.on_fault(Fault::rpc(RpcFaultKind::Network, "race"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        match pending.await {
            Ok(Some(value)) => assert_eq!(value % 2, 0),
            Err(BridgeError::Domain(err)) => {
                assert_eq!(err, ErrorCategory::NetworkConnectFailed.to_error())
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}

#[tokio::test]
async fn failing_trigger_resolves_immediately_without_registration() {
    let transport = ManualTransport::default();
    let mut pending = invoke::<String, ManualCall, _>(|| {
        Err(Fault::exception("IllegalArgumentException", "no provider"))
    });

    let result = pending.try_result().expect("resolved synchronously");
    assert_eq!(
        domain(result),
        ErrorCategory::SysError.with_description("no provider")
    );
    assert_eq!(transport.registrations(), 0);
    assert!(transport.registered.lock().unwrap().is_none());
}

#[tokio::test]
async fn transport_dropping_the_callback_still_resolves() {
    let transport = ManualTransport::default();
    let pending = invoke::<String, _, _>(|| Ok(transport.call()));

    transport.forget_callback();

    let err = domain(pending.await);
    assert_eq!(err.code, ErrorCategory::RpcCallException.code());
    assert_eq!(err.description, bridge::invoke::CALLBACK_DROPPED);
}

#[tokio::test]
async fn dropped_consumer_does_not_disturb_the_callback() {
    let transport = ManualTransport::default();
    let pending = invoke::<String, _, _>(|| Ok(transport.call()));
    drop(pending);

    let callback = transport.callback();
    callback.on_fault(Fault::rpc(RpcFaultKind::Timeout, "slow"));
    callback.on_success(outcome(json!("ignored")));
}

#[tokio::test]
async fn invocations_have_distinct_ids() {
    let transport = ManualTransport::default();
    let first = invoke::<String, _, _>(|| Ok(transport.call()));
    let second = invoke::<String, _, _>(|| Ok(transport.call()));
    assert_ne!(first.invocation_id(), second.invocation_id());
}

// ---------------------------------------------------------------------------
// Call slot
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completion_before_registration_is_delivered_at_registration() {
    let pending = invoke::<String, _, _>(|| {
        let (call, completer) = call_slot();
        completer.succeed(outcome(json!("early")));
        Ok(call)
    });

    assert_eq!(pending.await, Ok(Some("early".to_string())));
}

#[tokio::test]
async fn completion_from_a_worker_thread_is_delivered() {
    let pending = invoke::<Account, _, _>(|| {
        let (call, completer) = call_slot();
        thread::spawn(move || {
            completer.succeed(outcome(json!({
                "success": true,
                "data": {"id": 3, "name": "worker"}
            })));
        });
        Ok(call)
    });

    let account = pending.await.unwrap().unwrap();
    assert_eq!(account.name, "worker");
}

#[tokio::test]
async fn completer_fault_is_classified() {
    let pending = invoke::<Account, _, _>(|| {
        let (call, completer) = call_slot();
        thread::spawn(move || completer.fail(Fault::rpc(RpcFaultKind::Serialization, "bad")));
        Ok(call)
    });

    assert_eq!(
        domain(pending.await),
        ErrorCategory::SerializationException.to_error()
    );
}

#[tokio::test]
async fn completer_dropped_without_firing_still_resolves() {
    let pending = invoke::<Account, _, _>(|| {
        let (call, completer) = call_slot();
        thread::spawn(move || drop(completer));
        Ok(call)
    });

    let err = domain(pending.await);
    assert_eq!(err.code, ErrorCategory::RpcCallException.code());
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[traced_test]
#[tokio::test]
async fn faults_are_logged_before_the_caller_sees_them() {
    let transport = ManualTransport::default();
    let pending = invoke::<String, _, _>(|| Ok(transport.call()));

    transport
        .callback()
        .on_fault(Fault::rpc(RpcFaultKind::Network, "connection refused"));
    let _ = pending.await;

    assert!(logs_contain("async rpc call failed"));
    assert!(logs_contain("connection refused"));
}

#[traced_test]
#[tokio::test]
async fn alert_band_envelope_failures_are_logged_as_errors() {
    let transport = ManualTransport::default();
    let pending = invoke::<String, _, _>(|| Ok(transport.call()));

    transport.callback().on_success(outcome(json!({
        "success": false,
        "code": "2500",
        "description": "clearing house down"
    })));
    let _ = pending.await;

    assert!(logs_contain("ERROR"));
    assert!(logs_contain("clearing house down"));
}

//! End-to-end callback behaviour: server actions driven by invokers created
//! from an ambient `ApiProvider`.
//!
//! Every callback appends to a shared log, so tests can assert on the exact
//! firing order across ambient and local callbacks.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use vergestack_api::handlers::greeting::{fail_action, greet_action, hello_action, GreetInput};
use vergestack_client::{ActionOptions, ApiProvider};
use vergestack_core::{ApiResponse, FieldError};

type Log = Arc<Mutex<Vec<String>>>;

fn push(log: &Log, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

/// Provider whose four callbacks log with a `global` prefix.
fn global_provider(log: &Log) -> ApiProvider {
    let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
    ApiProvider::new(
        ActionOptions::<Value>::new()
            .on_start(move || push(&a, "globalOnStart"))
            .on_success(move |data| push(&b, format!("globalOnSuccess {data}")))
            .on_error(move |errors| push(&c, format!("globalOnError {}", errors.len())))
            .on_complete(move || push(&d, "globalOnComplete")),
    )
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

// ---------------------------------------------------------------------------
// Test: global callbacks on success
// ---------------------------------------------------------------------------

#[tokio::test]
async fn global_callbacks_fire_on_success() {
    let log: Log = Arc::default();
    let invoker = global_provider(&log).use_action(hello_action());

    let response = invoker.execute("world".to_string()).await;

    assert_eq!(response, ApiResponse::success("Hello, world!".to_string()));
    assert_eq!(invoker.data().as_deref(), Some("Hello, world!"));
    assert!(invoker.errors().is_none());
    assert_eq!(
        entries(&log),
        vec![
            "globalOnStart",
            "globalOnComplete",
            "globalOnSuccess \"Hello, world!\"",
        ]
    );
}

// ---------------------------------------------------------------------------
// Test: global callbacks on error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn global_callbacks_fire_on_error() {
    let log: Log = Arc::default();
    let invoker = global_provider(&log).use_action(fail_action());

    invoker.execute("world".to_string()).await;

    assert!(invoker.data().is_none(), "data must stay absent after an error");
    assert_eq!(
        invoker.errors(),
        Some(vec![FieldError::general("An internal error occurred")])
    );
    assert_eq!(
        entries(&log),
        vec!["globalOnStart", "globalOnComplete", "globalOnError 1"]
    );
}

// ---------------------------------------------------------------------------
// Test: local callbacks override their global counterparts only
// ---------------------------------------------------------------------------

#[tokio::test]
async fn local_callbacks_override_global_ones() {
    let log: Log = Arc::default();
    let (a, b) = (log.clone(), log.clone());
    let local = ActionOptions::new()
        .on_start(move || push(&a, "localOnStart"))
        .on_success(move |data: &String| push(&b, format!("localOnSuccess {data}")));

    let invoker = global_provider(&log).use_action_with(hello_action(), local);
    invoker.execute("world".to_string()).await;

    assert_eq!(
        entries(&log),
        vec![
            "localOnStart",
            "globalOnComplete",
            "localOnSuccess Hello, world!",
        ]
    );
}

// ---------------------------------------------------------------------------
// Test: validation errors reach on_error with field names
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_errors_reach_local_on_error() {
    let log: Log = Arc::default();
    let sink = log.clone();
    let local = ActionOptions::new().on_error(move |errors: &[FieldError]| {
        for error in errors {
            push(&sink, error.field.clone().unwrap_or_default());
        }
    });

    let invoker = global_provider(&log).use_action_with(greet_action(), local);
    invoker
        .execute(GreetInput {
            name: String::new(),
            language: "en".into(),
        })
        .await;

    assert_eq!(entries(&log), vec!["globalOnStart", "globalOnComplete", "name"]);
    assert!(!invoker.is_pending());
}

// ---------------------------------------------------------------------------
// Test: on_complete fires exactly once per invocation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn on_complete_fires_once_per_invocation() {
    let log: Log = Arc::default();
    let invoker = global_provider(&log).use_action(hello_action());

    invoker.execute("one".to_string()).await;
    invoker.execute("two".to_string()).await;

    let completes = entries(&log)
        .iter()
        .filter(|e| *e == "globalOnComplete")
        .count();
    assert_eq!(completes, 2);
    assert_eq!(invoker.data().as_deref(), Some("Hello, two!"));
}

// ---------------------------------------------------------------------------
// Test: no provider means no callbacks, state still tracked
// ---------------------------------------------------------------------------

#[tokio::test]
async fn default_provider_has_no_callbacks() {
    let invoker = ApiProvider::default().use_action(hello_action());

    let response = invoker.execute("quiet".to_string()).await;

    assert!(response.is_success());
    assert_eq!(invoker.data().as_deref(), Some("Hello, quiet!"));
}

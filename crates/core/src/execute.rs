//! The validate → handle → validate pipeline shared by routes and actions.

use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;
use crate::response::Envelope;
use crate::schema::Schema;

/// Run `handler` on `raw` between an input and an output schema.
///
/// 1. `raw` is parsed with `input_schema`; a rejection yields a `400`
///    envelope and the handler is not invoked.
/// 2. The handler is invoked exactly once. An `Err` or a panic yields a
///    `500` envelope with the generic message.
/// 3. The handler's value is serialized and parsed with `output_schema`;
///    a rejection yields a `500` envelope.
/// 4. Otherwise a `200` success envelope carries the parsed output.
pub async fn execute<I, O, H, Fut, R, E>(
    input_schema: &I,
    output_schema: &O,
    handler: &H,
    raw: Value,
) -> Envelope<O::Output>
where
    I: Schema,
    O: Schema,
    H: Fn(I::Output) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    R: Serialize,
    E: Display,
{
    match run(input_schema, output_schema, handler, raw).await {
        Ok(output) => Envelope::success(output),
        Err(err) => err.into_envelope(),
    }
}

async fn run<I, O, H, Fut, R, E>(
    input_schema: &I,
    output_schema: &O,
    handler: &H,
    raw: Value,
) -> Result<O::Output, CoreError>
where
    I: Schema,
    O: Schema,
    H: Fn(I::Output) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    R: Serialize,
    E: Display,
{
    let input = input_schema
        .parse(raw)
        .map_err(CoreError::InputValidation)?;

    // The call sits inside the async block so a panic while building the
    // future is caught along with panics while polling it.
    let outcome = AssertUnwindSafe(async { handler(input).await })
        .catch_unwind()
        .await;

    let value = match outcome {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => return Err(CoreError::Internal(format!("handler failed: {err}"))),
        Err(panic) => {
            return Err(CoreError::Internal(format!(
                "handler panicked: {}",
                panic_message(&*panic)
            )))
        }
    };

    let raw_output = serde_json::to_value(value)
        .map_err(|err| CoreError::Internal(format!("handler output is not serializable: {err}")))?;

    output_schema.parse(raw_output).map_err(|errors| {
        let detail = errors
            .iter()
            .map(|e| match &e.field {
                Some(field) => format!("{field}: {}", e.message),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        CoreError::Internal(format!("handler output rejected by schema: {detail}"))
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "non-string panic payload"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

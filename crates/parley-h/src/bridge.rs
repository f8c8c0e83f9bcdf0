//! Calls into the injected DOM bridge.
//!
//! The bridge is (re)injected before each call: navigation wipes it together
//! with the handle registry, after which old handles report as stale.

use chromiumoxide::Page;
use chromiumoxide::cdp::js_protocol::runtime::{EvaluateParams, RemoteObjectId};
use parley_common::error::DomError;
use parley_common::protocol::ElementHandle;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

const BRIDGE_JS: &str = include_str!("bridge.js");

/// Upper bound for one evaluation. A dialog blocks the JS thread until it is
/// handled.
const EVAL_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_CONTEXT_RETRIES: u32 = 10;

const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

/// Retry `operation` while the page has no usable execution context.
async fn retry_on_context_error<T, F, Fut>(
    operation_name: &str,
    mut operation: F,
) -> Result<T, DomError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EvalError>>,
{
    let mut last_error = None;

    for attempt in 0..MAX_CONTEXT_RETRIES {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(EvalError::Context(err_str)) => {
                tracing::debug!(
                    "{} context error (attempt {}/{}), retrying...",
                    operation_name,
                    attempt + 1,
                    MAX_CONTEXT_RETRIES
                );
                last_error = Some(err_str);
                tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
            }
            Err(EvalError::Timeout) => {
                return Err(DomError::Other(format!(
                    "{} timed out, possibly blocked by a dialog",
                    operation_name
                )));
            }
            Err(EvalError::Other(err_str)) => {
                return Err(DomError::Script(format!("{}: {}", operation_name, err_str)));
            }
        }
    }

    Err(DomError::Other(last_error.unwrap_or_else(|| {
        format!("{} failed after retries", operation_name)
    })))
}

enum EvalError {
    Timeout,
    Context(String),
    Other(String),
}

impl EvalError {
    fn from_message(err_str: String) -> Self {
        if is_context_error(&err_str) {
            EvalError::Context(err_str)
        } else {
            EvalError::Other(err_str)
        }
    }
}

async fn evaluate_with_timeout(page: &Page, expression: &str) -> Result<Value, EvalError> {
    match tokio::time::timeout(EVAL_TIMEOUT, page.evaluate(expression)).await {
        Err(_) => Err(EvalError::Timeout),
        Ok(Err(e)) => Err(EvalError::from_message(e.to_string())),
        Ok(Ok(remote_object)) => remote_object
            .into_value::<Value>()
            .map_err(|e| EvalError::Other(format!("Failed to get result: {}", e))),
    }
}

async fn ensure_injected(page: &Page) -> Result<(), EvalError> {
    let loaded = evaluate_with_timeout(page, "typeof window.__parley !== 'undefined'").await?;
    if loaded != Value::Bool(true) {
        match tokio::time::timeout(EVAL_TIMEOUT, page.evaluate(BRIDGE_JS)).await {
            Err(_) => return Err(EvalError::Timeout),
            Ok(Err(e)) => return Err(EvalError::from_message(e.to_string())),
            Ok(Ok(_)) => tracing::debug!("DOM bridge injected"),
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct BridgeReply {
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    id: Option<u32>,
}

impl BridgeReply {
    fn into_result(self) -> Result<Value, DomError> {
        if self.ok {
            return Ok(self.value);
        }
        let message = self.message.unwrap_or_default();
        Err(match (self.kind.as_deref(), self.id) {
            (Some("stale"), Some(id)) => DomError::StaleElement(ElementHandle(id)),
            (Some("selector"), _) => DomError::InvalidSelector(message),
            (Some("unsupported"), _) => DomError::NotSupported(message),
            _ => DomError::Script(message),
        })
    }
}

/// Run bridge operation `op` with JSON `args` and return its value.
pub async fn call(page: &Page, op: &str, args: Value) -> Result<Value, DomError> {
    let expression = format!(
        "window.__parley.call({}, {})",
        serde_json::to_string(op)?,
        serde_json::to_string(&args)?
    );
    tracing::trace!("Bridge call: {}", expression);

    let expression = expression.as_str();
    let raw = retry_on_context_error(op, || async move {
        ensure_injected(page).await?;
        evaluate_with_timeout(page, expression).await
    })
    .await?;

    let reply: BridgeReply = serde_json::from_value(raw)?;
    reply.into_result()
}

/// Remote object id of a registered element, for CDP commands that take a
/// node reference.
pub async fn object_id(page: &Page, el: ElementHandle) -> Result<RemoteObjectId, DomError> {
    let params = EvaluateParams::builder()
        .expression(format!("window.__parley.element({})", el.0))
        .return_by_value(false)
        .build()
        .map_err(DomError::Other)?;

    let params = &params;
    let response = retry_on_context_error("element lookup", || async move {
        ensure_injected(page).await?;
        match tokio::time::timeout(EVAL_TIMEOUT, page.execute(params.clone())).await {
            Err(_) => Err(EvalError::Timeout),
            Ok(Err(e)) => Err(EvalError::from_message(e.to_string())),
            Ok(Ok(response)) => Ok(response),
        }
    })
    .await?;

    if response.result.exception_details.is_some() {
        return Err(DomError::StaleElement(el));
    }
    response
        .result
        .result
        .object_id
        .clone()
        .ok_or(DomError::StaleElement(el))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stale_reply_maps_to_stale_element() {
        let reply: BridgeReply = serde_json::from_value(json!({
            "ok": false, "kind": "stale", "message": "gone", "id": 4
        }))
        .unwrap();
        let err = reply.into_result().unwrap_err();
        assert!(matches!(err, DomError::StaleElement(ElementHandle(4))));
    }

    #[test]
    fn selector_reply_maps_to_invalid_selector() {
        let reply: BridgeReply = serde_json::from_value(json!({
            "ok": false, "kind": "selector", "message": "a[", "id": null
        }))
        .unwrap();
        assert!(matches!(
            reply.into_result(),
            Err(DomError::InvalidSelector(s)) if s == "a["
        ));
    }

    #[test]
    fn ok_reply_yields_value() {
        let reply: BridgeReply =
            serde_json::from_value(json!({ "ok": true, "value": [1, 2] })).unwrap();
        assert_eq!(reply.into_result().unwrap(), json!([1, 2]));
    }

    #[test]
    fn context_errors_are_recognized() {
        assert!(is_context_error("Execution context was destroyed."));
        assert!(!is_context_error("ReferenceError: x is not defined"));
    }
}

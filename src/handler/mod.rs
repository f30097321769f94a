//! Invocation boundary: one JSON event in, one wire envelope out.

use serde_json::Value;
use tracing::info;

use crate::executor::{ExecutionResult, ScriptExecutor};

/// Platform-supplied invocation metadata.
///
/// Accepted at the boundary but not consumed by the execution core; it only
/// shows up in logs.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: Option<String>,
}

/// Handle one invocation event.
///
/// The event must be a mapping with a string `script` key; any other keys are
/// ignored. A missing or non-string `script` is reported through the same
/// failure envelope as an in-script fault, so callers see exactly two
/// response shapes.
pub fn handle(event: &Value, context: &RequestContext) -> ExecutionResult {
    info!(request_id = ?context.request_id, "Handling invocation");

    let script = match event.get("script").and_then(Value::as_str) {
        Some(script) => script,
        None => {
            return ExecutionResult::Failure {
                message: "event is missing a string 'script' field".to_string(),
            }
        }
    };

    let result = ScriptExecutor::new().execute(script);

    match &result {
        ExecutionResult::Success { output } => {
            info!(output_len = output.len(), "Invocation succeeded");
        }
        ExecutionResult::Failure { message } => {
            info!(error = %message, "Invocation failed");
        }
    }

    result
}

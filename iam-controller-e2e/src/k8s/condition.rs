//! Status conditions written by the controller.

use std::time::Duration;

use serde_json::Value;

use crate::error::{E2eError, E2eResult};
use crate::k8s::{CustomResourceClient, CustomResourceReference};
use crate::wait::{poll_until, WaitOptions};

pub const CONDITION_TYPE_ADOPTED: &str = "ACK.Adopted";
pub const CONDITION_TYPE_RESOURCE_SYNCED: &str = "ACK.ResourceSynced";
pub const CONDITION_TYPE_TERMINAL: &str = "ACK.Terminal";
pub const CONDITION_TYPE_RECOVERABLE: &str = "ACK.Recoverable";
pub const CONDITION_TYPE_ADVISORY: &str = "ACK.Advisory";
pub const CONDITION_TYPE_LATE_INITIALIZED: &str = "ACK.LateInitialized";
pub const CONDITION_TYPE_READY: &str = "Ready";

/// The condition of type `condition_type` in `status.conditions`, if any.
pub fn get_condition<'a>(resource: &'a Value, condition_type: &str) -> Option<&'a Value> {
    resource
        .get("status")?
        .get("conditions")?
        .as_array()?
        .iter()
        .find(|c| c.get("type").and_then(Value::as_str) == Some(condition_type))
}

/// Checks a condition's status against `expected`, returning a description of
/// the mismatch when it differs.
pub fn check_type_status(
    resource: &Value,
    condition_type: &str,
    expected: bool,
) -> Result<(), String> {
    let Some(condition) = get_condition(resource, condition_type) else {
        return Err(format!("no {condition_type} condition in status"));
    };
    let expected_status = if expected { "True" } else { "False" };
    let status = condition.get("status").and_then(Value::as_str).unwrap_or("");
    if status == expected_status {
        return Ok(());
    }
    let message = condition
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("<no message>");
    Err(format!(
        "expected {condition_type}={expected_status}, found {condition_type}={status} ({message})"
    ))
}

/// Fetches the resource and asserts a condition's status.
pub async fn assert_type_status(
    crs: &CustomResourceClient,
    reference: &CustomResourceReference,
    condition_type: &str,
    expected: bool,
) -> E2eResult<()> {
    let resource = crs
        .get_resource(reference)
        .await?
        .ok_or_else(|| E2eError::Condition {
            resource: reference.to_string(),
            message: "resource not found".to_string(),
        })?;
    check_type_status(&resource, condition_type, expected).map_err(|message| E2eError::Condition {
        resource: reference.to_string(),
        message,
    })
}

/// Poll until the condition reaches `expected`, returning the resource as
/// last observed.
pub async fn wait_on_condition(
    crs: &CustomResourceClient,
    reference: &CustomResourceReference,
    condition_type: &str,
    expected: bool,
    wait_periods: u32,
    period_length: Duration,
) -> E2eResult<Value> {
    let description = format!("{condition_type}={expected} on {reference}");
    poll_until(
        &description,
        WaitOptions::periods(wait_periods, period_length),
        || async {
            let resource = crs.get_resource(reference).await?;
            Ok::<_, E2eError>(
                resource.filter(|r| check_type_status(r, condition_type, expected).is_ok()),
            )
        },
    )
    .await
}

pub async fn assert_synced(
    crs: &CustomResourceClient,
    reference: &CustomResourceReference,
) -> E2eResult<()> {
    assert_type_status(crs, reference, CONDITION_TYPE_RESOURCE_SYNCED, true).await
}

pub async fn assert_ready(
    crs: &CustomResourceClient,
    reference: &CustomResourceReference,
) -> E2eResult<()> {
    assert_type_status(crs, reference, CONDITION_TYPE_READY, true).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource() -> Value {
        json!({
            "status": {
                "conditions": [
                    {"type": "ACK.ResourceSynced", "status": "True"},
                    {"type": "ACK.LateInitialized", "status": "False", "message": "pending"}
                ]
            }
        })
    }

    #[test]
    fn test_get_condition() {
        let r = resource();
        assert_eq!(
            get_condition(&r, CONDITION_TYPE_RESOURCE_SYNCED).unwrap()["status"],
            "True"
        );
        assert!(get_condition(&r, CONDITION_TYPE_TERMINAL).is_none());
        assert!(get_condition(&json!({"spec": {}}), CONDITION_TYPE_READY).is_none());
    }

    #[test]
    fn test_check_type_status() {
        let r = resource();
        assert!(check_type_status(&r, CONDITION_TYPE_RESOURCE_SYNCED, true).is_ok());
        assert!(check_type_status(&r, CONDITION_TYPE_LATE_INITIALIZED, false).is_ok());

        let err = check_type_status(&r, CONDITION_TYPE_LATE_INITIALIZED, true).unwrap_err();
        assert!(err.contains("found ACK.LateInitialized=False (pending)"), "{err}");

        let err = check_type_status(&r, CONDITION_TYPE_READY, true).unwrap_err();
        assert_eq!(err, "no Ready condition in status");
    }
}

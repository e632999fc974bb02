//! Structural validation of raw model entries.

use serde_json::Value;

use super::types::ToolCallType;

/// Check that a raw JSON value has the shape of a [`Model`](super::Model).
///
/// `id`, `name`, `provider` and `providerId` must be strings, `enabled` a
/// boolean, `toolCallType` exactly `"native"` or `"manual"`, and
/// `toolCallModel` either absent or a string. Extra keys are ignored.
pub fn validate_model(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };

    let is_string = |key: &str| obj.get(key).is_some_and(Value::is_string);

    is_string("id")
        && is_string("name")
        && is_string("provider")
        && is_string("providerId")
        && obj.get("enabled").is_some_and(Value::is_boolean)
        && obj
            .get("toolCallType")
            .and_then(Value::as_str)
            .and_then(ToolCallType::parse)
            .is_some()
        && obj.get("toolCallModel").map_or(true, Value::is_string)
}

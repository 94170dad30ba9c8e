use crate::error::{Error, Result};

use serde_json::Value as JsonValue;

const NO_CONTENT: u16 = 204;

/// Classifies a raw response.
///
/// Returns `Ok(None)` for `204 No Content` and the parsed body otherwise. The API doesn't use a
/// single error envelope: depending on the endpoint a failure is reported with a `message` field,
/// or with `response`/`success` set to `false` alongside a `reason`. Both shapes are checked, even
/// for a successful status code.
pub(crate) fn decode(status: u16, body: &[u8]) -> Result<Option<JsonValue>> {
    if status == NO_CONTENT {
        return Ok(None);
    }

    let success = (200..300).contains(&status);

    let value: JsonValue = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) if success => return Err(Error::Decode(e)),
        Err(_) => return Err(Error::Http { code: status }),
    };

    if let Some(message) = api_failure(&value) {
        tracing::debug!(status, %message, "API reported an error");
        return Err(Error::Api { status, message });
    }

    if !success {
        return Err(Error::Http { code: status });
    }

    Ok(Some(value))
}

fn api_failure(value: &JsonValue) -> Option<String> {
    let obj = value.as_object()?;

    let failed = obj.contains_key("message")
        || ["response", "success"]
            .iter()
            .any(|k| obj.get(*k) == Some(&JsonValue::Bool(false)));

    if !failed {
        return None;
    }

    let message = ["message", "reason"]
        .iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
        .map(|v| match v {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| String::from("unknown error"));

    Some(message)
}

//! Envelope codec: wire text ⇄ [`Envelope`].
//!
//! The wire format is a JSON object. `encode` never fails; `decode` rejects
//! anything that cannot be correlated (no usable `id`) or routed (no `type`).

use crate::envelope::Envelope;
use crate::errors::DecodeError;
use crate::ids::RequestId;
use serde_json::{Map, Value};

/// Render a request envelope.
pub fn encode(id: RequestId, message_type: &str, payload: Value) -> String {
    let mut obj = Map::with_capacity(3);
    obj.insert("id".into(), Value::from(id.get()));
    obj.insert("type".into(), Value::from(message_type));
    obj.insert("payload".into(), payload);
    Value::Object(obj).to_string()
}

/// Render a response envelope.
pub fn encode_response(id: RequestId, message_type: &str, success: bool, payload: Value) -> String {
    let mut obj = Map::with_capacity(4);
    obj.insert("id".into(), Value::from(id.get()));
    obj.insert("type".into(), Value::from(message_type));
    obj.insert("payload".into(), payload);
    obj.insert("success".into(), Value::Bool(success));
    Value::Object(obj).to_string()
}

/// Parse wire text into an envelope.
pub fn decode(wire: &str) -> Result<Envelope, DecodeError> {
    let value: Value =
        serde_json::from_str(wire).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let Value::Object(mut obj) = value else {
        return Err(DecodeError::NotAnObject);
    };

    let id = match obj.get("id") {
        None | Some(Value::Null) => return Err(DecodeError::MissingId),
        Some(raw) => raw
            .as_u64()
            .map(RequestId::new)
            .ok_or_else(|| DecodeError::InvalidId(raw.to_string()))?,
    };

    let message_type = obj
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(DecodeError::MissingType)?;

    let success = obj.get("success").and_then(Value::as_bool);
    let payload = obj.remove("payload").unwrap_or(Value::Null);

    Ok(Envelope {
        id,
        message_type,
        payload,
        success,
    })
}

/// Best-effort extraction of `id` from a message that failed to decode, so
/// the receiver can still answer the request with an error.
pub fn recover_id(wire: &str) -> Option<RequestId> {
    serde_json::from_str::<Value>(wire)
        .ok()?
        .get("id")?
        .as_u64()
        .map(RequestId::new)
}

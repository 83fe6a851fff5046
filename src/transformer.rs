//! Deep key renaming of JSON structures between the two naming conventions.
//!
//! Records leaving the persistence layer are rewritten to camelCase before
//! they reach a client; request payloads are rewritten to snake_case before
//! they reach persistence logic. Only keys change: values keep their type.
//!
//! Deep traversal uses the plain algorithmic conversions from
//! [`crate::name_mapper`]. The override table is *not* consulted here.

use std::fmt;

use axum::body::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::name_mapper::{camel_to_snake, snake_to_camel};

/// Error type for payload transformation
#[derive(Debug)]
pub enum TransformError {
    /// A record could not be turned into a plain JSON structure
    Serialization(String),
    /// A payload declared as JSON did not parse
    MalformedPayload(String),
    /// A payload could not be read from its source
    BodyUnavailable(String),
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            TransformError::MalformedPayload(msg) => write!(f, "Malformed JSON payload: {}", msg),
            TransformError::BodyUnavailable(msg) => write!(f, "Body unavailable: {}", msg),
        }
    }
}

impl std::error::Error for TransformError {}

impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> Self {
        TransformError::Serialization(err.to_string())
    }
}

/// Something that can describe itself as a plain JSON structure.
///
/// Persistence records implement this to hand their column values to the
/// transformer. The default implementation goes through serde.
///
/// ```ignore
/// #[derive(Serialize)]
/// struct OrderRow {
///     order_id: String,
///     total_cents: i64,
/// }
///
/// impl Serializable for OrderRow {}
/// ```
pub trait Serializable: Serialize {
    fn to_plain_object(&self) -> Result<Value, TransformError> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Serializable for Value {
    fn to_plain_object(&self) -> Result<Value, TransformError> {
        Ok(self.clone())
    }
}

/// Outcome of a fail-open transformation.
///
/// Either the converted value, or the untouched original together with the
/// error that prevented conversion. Both carry a value that is safe to
/// forward.
#[derive(Debug)]
pub enum Transformed<T> {
    Converted(T),
    Passthrough { original: T, error: TransformError },
}

impl<T> Transformed<T> {
    /// The value to forward, whichever branch was taken.
    pub fn into_inner(self) -> T {
        match self {
            Transformed::Converted(value) => value,
            Transformed::Passthrough { original, .. } => original,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, Transformed::Converted(_))
    }

    pub fn error(&self) -> Option<&TransformError> {
        match self {
            Transformed::Converted(_) => None,
            Transformed::Passthrough { error, .. } => Some(error),
        }
    }
}

fn rename_keys(map: &Map<String, Value>, rename: fn(&str) -> String) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (rename(key), rename_nested(value, rename)))
        .collect()
}

fn rename_nested(value: &Value, rename: fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(rename_keys(map, rename)),
        // Only objects inside arrays are rewritten; nested arrays and
        // primitives are kept as they are.
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => Value::Object(rename_keys(map, rename)),
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Rewrite every key of an object, recursively, to camelCase.
///
/// Anything that is not an object at the top level (null, primitives,
/// arrays) is returned unchanged.
pub fn object_snake_to_camel(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(rename_keys(map, snake_to_camel)),
        other => other.clone(),
    }
}

/// Rewrite every key of an object, recursively, to snake_case.
///
/// Same top-level and array rules as [`object_snake_to_camel`].
pub fn object_camel_to_snake(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(rename_keys(map, camel_to_snake)),
        other => other.clone(),
    }
}

/// camelCase projection of a persistence record.
pub fn to_camel_case<T: Serializable + ?Sized>(record: &T) -> Result<Value, TransformError> {
    let plain = record.to_plain_object()?;
    Ok(object_snake_to_camel(&plain))
}

/// snake_case projection of an application object.
pub fn to_snake_case(value: &Value) -> Value {
    object_camel_to_snake(value)
}

/// Shape a value for the response path: arrays are mapped element-wise,
/// objects converted directly.
pub fn camelize_outbound(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(object_snake_to_camel).collect()),
        other => object_snake_to_camel(other),
    }
}

fn transform_payload(
    payload: &[u8],
    convert: fn(&Value) -> Value,
    stage: &'static str,
) -> Transformed<Bytes> {
    let result = serde_json::from_slice::<Value>(payload)
        .map_err(|e| TransformError::MalformedPayload(e.to_string()))
        .and_then(|value| Ok(serde_json::to_vec(&convert(&value))?));

    match result {
        Ok(converted) => Transformed::Converted(Bytes::from(converted)),
        Err(error) => {
            tracing::warn!(stage, error = %error, "Key transformation failed, forwarding original payload");
            Transformed::Passthrough {
                original: Bytes::copy_from_slice(payload),
                error,
            }
        }
    }
}

/// Rewrite a serialized JSON response body to camelCase keys.
///
/// A body that does not parse is forwarded unchanged.
pub fn transform_outbound(payload: &[u8]) -> Transformed<Bytes> {
    transform_payload(payload, camelize_outbound, "response")
}

/// Rewrite a serialized JSON request body to snake_case keys.
///
/// A body that does not parse is forwarded unchanged.
pub fn transform_inbound(payload: &[u8]) -> Transformed<Bytes> {
    transform_payload(payload, to_snake_case, "request")
}

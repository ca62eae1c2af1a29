// Map daemon-native JSON shapes into the stable output records.
//
// Raw shapes are deserialized per item so one malformed entry is skipped (and logged)
// without failing the rest of the response. Only a response that is not the expected
// container type (sequence or object) is an error.

mod container;
mod image;
mod system;

pub use container::{ContainerInventory, format_port, normalize_containers};
pub use image::normalize_images;
pub use system::normalize_system;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// The response as a whole does not have the shape the endpoint guarantees.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ShapeError(pub String);

/// Deserializes every element of a JSON sequence, dropping the ones that do not fit `T`.
fn sequence_items<T: DeserializeOwned>(data: Value, kind: &'static str) -> Result<Vec<T>, ShapeError> {
    let Value::Array(items) = data else {
        return Err(ShapeError(format!(
            "{kind} response is not a sequence (got {})",
            type_name(&data)
        )));
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let id = item.get("Id").and_then(Value::as_str).map(str::to_string);
            match serde_json::from_value::<T>(item) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(kind, index, id = ?id, error = %e, "skipping malformed record");
                    None
                }
            }
        })
        .collect())
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "object",
    }
}

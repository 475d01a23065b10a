use serde_json::Value;
use thiserror::Error;

use super::Record;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("patch must be a JSON object")]
    NotAnObject,
    #[error("merged record is invalid: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Maps accepted input names onto the stored field names.
fn stored_key(key: &str) -> &str {
    match key {
        "primaryImage" => "img",
        "subItems" => "figures",
        "description" => "desc",
        other => other,
    }
}

/// Shallow-merge a JSON object patch over an existing record.
///
/// The result always keeps the existing `id`. Sub-items are only replaced
/// when the patch carries a non-null `figures`/`subItems` value.
pub fn merge(existing: &Record, patch: &Value) -> Result<Record, MergeError> {
    let patch = patch.as_object().ok_or(MergeError::NotAnObject)?;
    let mut merged = serde_json::to_value(existing)?;
    let fields = merged.as_object_mut().ok_or(MergeError::NotAnObject)?;

    for (key, value) in patch {
        let key = stored_key(key);
        match key {
            "id" => continue,
            "figures" if value.is_null() => continue,
            _ => {
                fields.insert(key.to_string(), value.clone());
            }
        }
    }

    Ok(serde_json::from_value(merged)?)
}

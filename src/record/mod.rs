//! Record: one catalog entry and the helpers that create and patch it.
//!
//! The wire shape follows the persisted catalog document: the primary image is
//! stored as `img`, sub-items as `figures` and descriptions as `desc`. The
//! long names (`primaryImage`, `subItems`, `description`, `image`) are accepted
//! on input as aliases.
//!
//! ## Example
//!
//! ```ignore
//! use minifig_catalog::record::{self, Record};
//!
//! let mut item = Record::blank(record::generate_id(existing.iter().map(|r| r.id.as_str())));
//! item.name = "Panzer IV".into();
//! item.manufacturer = "Tamiya".into();
//! ```

mod id;
mod merge;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use id::{generate_id, ID_LEN};
pub use merge::{merge, MergeError};

/// Fields a record must carry before it can be created.
pub const REQUIRED_FIELDS: [&str; 2] = ["name", "manufacturer"];

/// A single piece inside a set. Order within a record is display order.
///
/// Simplified documents list pieces by name only (`"figures": ["Commander"]`);
/// those read back as a sub-item with no image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SubItemWire")]
pub struct SubItem {
    pub name: String,
    #[serde(rename = "img")]
    pub image: String,
    #[serde(rename = "desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SubItemWire {
    Name(String),
    Fields {
        #[serde(default)]
        name: String,
        #[serde(rename = "img", alias = "image", default)]
        image: String,
        #[serde(rename = "desc", alias = "description", default)]
        description: Option<String>,
    },
}

impl From<SubItemWire> for SubItem {
    fn from(wire: SubItemWire) -> Self {
        match wire {
            SubItemWire::Name(name) => SubItem {
                name,
                image: String::new(),
                description: None,
            },
            SubItemWire::Fields {
                name,
                image,
                description,
            } => SubItem {
                name,
                image,
                description,
            },
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub scale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(
        rename = "desc",
        alias = "description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default)]
    pub folder: String,
    #[serde(rename = "img", alias = "primaryImage", default)]
    pub primary_image: String,
    #[serde(rename = "figures", alias = "subItems", default)]
    pub sub_items: Vec<SubItem>,
    /// Fields this crate does not model. Kept so a load/replace cycle never
    /// drops data written by other tools.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// The empty template the admin screen opens for "add new".
    pub fn blank(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            manufacturer: String::new(),
            scale: String::new(),
            year: None,
            material: None,
            kind: None,
            description: None,
            folder: String::new(),
            primary_image: String::new(),
            sub_items: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Value of a facet field by its wire name. Empty strings count as absent.
    pub fn facet(&self, field: &str) -> Option<&str> {
        let value = match field {
            "manufacturer" => Some(self.manufacturer.as_str()),
            "scale" => Some(self.scale.as_str()),
            "folder" => Some(self.folder.as_str()),
            "material" => self.material.as_deref(),
            "type" => self.kind.as_deref(),
            "year" => self.year.as_deref(),
            _ => None,
        };
        value.filter(|v| !v.is_empty())
    }
}

/// Returns the name of the first required field missing from a JSON payload.
///
/// A field counts as missing when it is absent, not a string, or blank.
pub fn missing_required(payload: &Map<String, Value>) -> Option<&'static str> {
    REQUIRED_FIELDS.into_iter().find(|field| {
        payload
            .get(*field)
            .and_then(Value::as_str)
            .map_or(true, |v| v.trim().is_empty())
    })
}

/// Older documents carry numeric ids; they are read back as strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!("invalid record id: {}", other))),
    }
}

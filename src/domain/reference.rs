//! Reference Entities
//!
//! Items of a named reference list and the registry descriptors naming those lists.

use serde::{Deserialize, Serialize};

/// One entry of a reference list (tag, status, stage, ...)
///
/// Display order is the position in the list, not `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceItem {
    /// Stable key, unique within its list
    pub key: String,
    /// Numeric id; unique only among currently present items
    pub id: u32,
    /// Display name
    pub name: String,
}

impl ReferenceItem {
    pub fn new(id: u32, name: String) -> Self {
        Self {
            key: id.to_string(),
            id,
            name,
        }
    }

    /// Item named `"<label> <id>"`
    pub fn numbered(label: &str, id: u32) -> Self {
        Self::new(id, format!("{} {}", label, id))
    }
}

/// Registry entry describing one reference list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDescriptor {
    pub key: String,
    pub title: String,
    pub description: String,
}

impl ReferenceDescriptor {
    pub fn new(key: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            description: description.into(),
        }
    }
}

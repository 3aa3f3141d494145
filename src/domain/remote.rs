//! Remote Entities
//!
//! Rows of the hosted relational backend. Ids are backend-assigned strings.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use super::entity::Entity;

/// An entity stored in a remote table
pub trait RemoteEntity: Entity<Id = String> + Serialize + DeserializeOwned {
    /// Backend table name
    const TABLE: &'static str;
}

/// Construction project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Entity for Project {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

impl RemoteEntity for Project {
    const TABLE: &'static str = "projects";
}

/// Unit of measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default = "default_true", deserialize_with = "flexible_bool")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Entity for Unit {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

impl RemoteEntity for Unit {
    const TABLE: &'static str = "units";
}

/// Approval state of an additional work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkStatus {
    #[default]
    Draft,
    Approved,
    Rejected,
}

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Draft => "draft",
            WorkStatus::Approved => "approved",
            WorkStatus::Rejected => "rejected",
        }
    }

    /// User-facing label
    pub fn label(&self) -> &'static str {
        match self {
            WorkStatus::Draft => "Черновик",
            WorkStatus::Approved => "Утвержден",
            WorkStatus::Rejected => "Отклонен",
        }
    }
}

/// Additional (out-of-contract) work with its quantity recount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalWork {
    pub id: String,
    pub materials: String,
    /// Quantity per design documentation
    pub quantity_pd: f64,
    /// Quantity after recount
    pub quantity_recount: f64,
    #[serde(default)]
    pub unit_id: Option<String>,
    #[serde(default)]
    pub status: WorkStatus,
    /// Embedded `units` row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl AdditionalWork {
    pub fn deviation(&self) -> f64 {
        self.quantity_recount - self.quantity_pd
    }

    pub fn has_deviation(&self) -> bool {
        self.quantity_pd != self.quantity_recount
    }
}

impl Entity for AdditionalWork {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

impl RemoteEntity for AdditionalWork {
    const TABLE: &'static str = "additional_works";
}

/// Free-form parameter row of a project card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectParameter {
    pub id: String,
    pub project_id: String,
    pub parameter: String,
    pub value: String,
    pub sort_order: i64,
}

impl Entity for ProjectParameter {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

impl RemoteEntity for ProjectParameter {
    const TABLE: &'static str = "project_parameters";
}

/// Per-project column names of the work-order table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderColumns {
    pub id: String,
    pub project_id: String,
    pub column_1_name: String,
    pub column_2_name: String,
    pub column_3_name: String,
}

impl Entity for WorkOrderColumns {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

impl RemoteEntity for WorkOrderColumns {
    const TABLE: &'static str = "additional_works_columns";
}

/// One row of a project's work-order table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderRow {
    pub id: String,
    pub project_id: String,
    pub column_1_value: String,
    pub column_2_value: String,
    pub column_3_value: String,
    pub sort_order: i64,
}

impl Entity for WorkOrderRow {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

impl RemoteEntity for WorkOrderRow {
    const TABLE: &'static str = "additional_works_rows";
}

fn default_true() -> bool {
    true
}

/// Accepts JSON booleans and 0/1 integers (SQLite has no boolean type)
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrInt {
        Bool(bool),
        Int(i64),
    }

    Ok(match BoolOrInt::deserialize(deserializer)? {
        BoolOrInt::Bool(b) => b,
        BoolOrInt::Int(i) => i != 0,
    })
}

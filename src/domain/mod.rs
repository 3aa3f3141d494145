//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO external dependencies (except serde for serialization).

mod entity;
mod grid;
mod reference;
mod remote;

pub use entity::{Entity, GatewayError, GatewayResult};
pub use grid::{CellRow, ColumnHeader, ColumnType, NUMBERING_ROW_KEY};
pub use reference::{ReferenceDescriptor, ReferenceItem};
pub use remote::{
    AdditionalWork, Project, ProjectParameter, RemoteEntity, Unit, WorkOrderColumns, WorkOrderRow,
    WorkStatus,
};

//! Calculation Grid
//!
//! Editable grid of renamable columns whose editor kind follows the header.

pub mod column_type;
mod editor;
mod model;
mod scale;

pub use column_type::{infer_column_type, resolve_column_type, CommitTrigger, EditorOptions};
pub use editor::EditSession;
pub use model::{CellEditor, CellRef, GridConfig, GridModel};
pub use scale::{Density, Metric, Scale, ScaleMetrics};

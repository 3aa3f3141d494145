//! Durable store keys
//!
//! These names are read by existing sessions; never rename them.

/// Reference registry descriptors
pub const REFERENCE_TYPES: &str = "referenceTypes";
/// Keys of deleted reference descriptors
pub const DELETED_REFERENCE_TYPES: &str = "deletedReferenceTypes";

/// Grid column headers
pub const GRID_COLUMN_HEADERS: &str = "tableColumnHeaders";
/// Grid row data
pub const GRID_ROWS: &str = "tableData";
/// Grid scale percentage
pub const GRID_SCALE: &str = "tableScale";

//! Grid Entities
//!
//! Column headers and cell rows of the planned-calculations grid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key of the synthetic row showing 1-based column positions
pub const NUMBERING_ROW_KEY: &str = "numbering";

/// Editor kind backing a grid column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Free-form single-line input
    #[default]
    Text,
    /// Fixed three-option priority
    Priority,
    /// Options from the tags list
    Tag,
    /// Options from the calculation types list
    CalculationType,
    /// Options from the initiators list
    Initiator,
    /// Fixed three-option amount range
    SumRange,
    /// Fixed four-option progress status
    Status,
}

/// One grid column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnHeader {
    /// Stable key, `col_N`
    pub key: String,
    /// User-editable label
    pub title: String,
    pub editable: bool,
    /// Pinned editor kind; inferred from `title` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ColumnType>,
}

impl ColumnHeader {
    /// Default header for 1-based column `position`
    pub fn numbered(position: usize) -> Self {
        Self {
            key: format!("col_{}", position),
            title: format!("Столбец {}", position),
            editable: false,
            kind: None,
        }
    }
}

/// One grid row: column key -> cell text (empty string = unset)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRow {
    pub key: String,
    #[serde(flatten)]
    pub cells: BTreeMap<String, String>,
}

impl CellRow {
    /// Empty row `row_{index}` with a blank cell per column
    pub fn blank(index: usize, headers: &[ColumnHeader]) -> Self {
        Self {
            key: format!("row_{}", index),
            cells: headers.iter().map(|h| (h.key.clone(), String::new())).collect(),
        }
    }

    pub fn get(&self, column_key: &str) -> &str {
        self.cells.get(column_key).map(String::as_str).unwrap_or("")
    }

    pub fn is_numbering(&self) -> bool {
        self.key == NUMBERING_ROW_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_serialization() {
        assert_eq!(serde_json::to_string(&ColumnType::CalculationType).unwrap(), r#""calculation_type""#);
        let kind: ColumnType = serde_json::from_str(r#""sum_range""#).unwrap();
        assert_eq!(kind, ColumnType::SumRange);
    }

    #[test]
    fn test_header_omits_absent_kind() {
        let header = ColumnHeader::numbered(5);
        let json = serde_json::to_string(&header).unwrap();
        assert_eq!(json, r#"{"key":"col_5","title":"Столбец 5","editable":false}"#);
    }

    #[test]
    fn test_row_flattens_cells() {
        let headers = vec![ColumnHeader::numbered(1), ColumnHeader::numbered(2)];
        let mut row = CellRow::blank(0, &headers);
        row.cells.insert("col_2".to_string(), "x".to_string());

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["key"], "row_0");
        assert_eq!(json["col_1"], "");
        assert_eq!(json["col_2"], "x");

        let back: CellRow = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
        assert_eq!(back.get("col_9"), "");
    }
}

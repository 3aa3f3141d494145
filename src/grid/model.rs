//! Grid Model
//!
//! State of the planned-calculations grid: renamable column headers, free-text
//! cell rows, one cell edit and one header edit at a time, and the zoom scale.
//! Every committed change writes the whole affected collection back to the
//! store. Defaults live only in memory until the first change.

use serde::{Deserialize, Serialize};

use crate::domain::{CellRow, ColumnHeader, ColumnType, NUMBERING_ROW_KEY};
use crate::storage::keys::{GRID_COLUMN_HEADERS, GRID_ROWS, GRID_SCALE};
use crate::storage::PersistentStore;
use super::column_type::{resolve_column_type, CommitTrigger, EditorOptions};
use super::editor::EditSession;
use super::scale::{Scale, ScaleMetrics};

/// Initial grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub columns: usize,
    pub rows: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 21,
            rows: 15,
        }
    }
}

/// Address of one cell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row_key: String,
    pub column_key: String,
}

impl CellRef {
    pub fn new(row_key: impl Into<String>, column_key: impl Into<String>) -> Self {
        Self {
            row_key: row_key.into(),
            column_key: column_key.into(),
        }
    }
}

/// Editor opened on a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEditor {
    pub cell: CellRef,
    pub column_type: ColumnType,
    pub options: EditorOptions,
    pub commit: CommitTrigger,
    /// Value at the time the edit started
    pub value: String,
}

pub struct GridModel {
    store: PersistentStore,
    headers: Vec<ColumnHeader>,
    rows: Vec<CellRow>,
    scale: Scale,
    cell_edit: EditSession<CellRef>,
    header_edit: EditSession<String>,
}

impl GridModel {
    pub fn load(store: PersistentStore, config: GridConfig) -> Self {
        let headers = store
            .lookup::<Vec<ColumnHeader>>(GRID_COLUMN_HEADERS)
            .found()
            .unwrap_or_else(|| default_headers(config.columns));

        let rows = store
            .lookup::<Vec<CellRow>>(GRID_ROWS)
            .found()
            .unwrap_or_else(|| default_rows(config.rows, &headers));

        let scale = store
            .lookup::<i64>(GRID_SCALE)
            .found()
            .map(Scale::new)
            .unwrap_or_default();

        Self {
            store,
            headers,
            rows,
            scale,
            cell_edit: EditSession::new(),
            header_edit: EditSession::new(),
        }
    }

    pub fn headers(&self) -> &[ColumnHeader] {
        &self.headers
    }

    pub fn header(&self, column_key: &str) -> Option<&ColumnHeader> {
        self.headers.iter().find(|h| h.key == column_key)
    }

    /// Persisted rows, without the numbering row
    pub fn rows(&self) -> &[CellRow] {
        &self.rows
    }

    /// Synthetic first row showing each column's 1-based position
    pub fn numbering_row(&self) -> CellRow {
        CellRow {
            key: NUMBERING_ROW_KEY.to_string(),
            cells: self
                .headers
                .iter()
                .enumerate()
                .map(|(index, h)| (h.key.clone(), (index + 1).to_string()))
                .collect(),
        }
    }

    /// Rows as rendered: numbering row first
    pub fn display_rows(&self) -> Vec<CellRow> {
        std::iter::once(self.numbering_row())
            .chain(self.rows.iter().cloned())
            .collect()
    }

    pub fn cell(&self, row_key: &str, column_key: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.key == row_key)
            .map(|r| r.get(column_key))
    }

    pub fn column_type(&self, column_key: &str) -> ColumnType {
        self.header(column_key)
            .map(resolve_column_type)
            .unwrap_or_default()
    }

    // ========================
    // Cell editing
    // ========================

    /// Open an editor on a cell; refused for the numbering row and unknown cells
    pub fn start_cell_edit(&mut self, row_key: &str, column_key: &str) -> Option<CellEditor> {
        if row_key == NUMBERING_ROW_KEY || self.header(column_key).is_none() {
            return None;
        }
        let value = self.cell(row_key, column_key)?.to_string();

        let column_type = self.column_type(column_key);
        let options = EditorOptions::for_column(column_type, &self.store);
        let cell = CellRef::new(row_key, column_key);
        self.cell_edit.begin(cell.clone(), &value);

        Some(CellEditor {
            cell,
            column_type,
            commit: options.commit_trigger(),
            options,
            value,
        })
    }

    pub fn editing_cell(&self) -> Option<&CellRef> {
        self.cell_edit.target()
    }

    pub fn cell_buffer(&self) -> &str {
        self.cell_edit.buffer()
    }

    pub fn set_cell_buffer(&mut self, value: impl Into<String>) {
        self.cell_edit.set_buffer(value);
    }

    /// Write the buffer into its cell and persist all rows
    pub fn commit_cell_edit(&mut self) -> bool {
        let Some((cell, value)) = self.cell_edit.commit() else {
            return false;
        };
        let Some(row) = self.rows.iter_mut().find(|r| r.key == cell.row_key) else {
            return false;
        };
        row.cells.insert(cell.column_key, value);
        self.store.set(GRID_ROWS, &self.rows);
        true
    }

    pub fn cancel_cell_edit(&mut self) {
        self.cell_edit.cancel();
    }

    // ========================
    // Header editing
    // ========================

    pub fn start_header_edit(&mut self, column_key: &str) -> bool {
        let Some(title) = self.header(column_key).map(|h| h.title.clone()) else {
            return false;
        };
        self.header_edit.begin(column_key.to_string(), &title);
        true
    }

    pub fn editing_header(&self) -> Option<&str> {
        self.header_edit.target().map(String::as_str)
    }

    pub fn header_buffer(&self) -> &str {
        self.header_edit.buffer()
    }

    pub fn set_header_buffer(&mut self, value: impl Into<String>) {
        self.header_edit.set_buffer(value);
    }

    /// Close the header edit and persist headers
    ///
    /// A blank buffer keeps the previous title.
    pub fn commit_header_edit(&mut self) -> bool {
        let Some((column_key, title)) = self.header_edit.commit() else {
            return false;
        };
        let Some(header) = self.headers.iter_mut().find(|h| h.key == column_key) else {
            return false;
        };
        let title = title.trim();
        if !title.is_empty() {
            header.title = title.to_string();
        }
        self.persist_headers();
        true
    }

    pub fn cancel_header_edit(&mut self) {
        self.header_edit.cancel();
    }

    /// Rename a column directly; blank titles are ignored
    pub fn rename_column(&mut self, column_key: &str, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        let Some(header) = self.headers.iter_mut().find(|h| h.key == column_key) else {
            return false;
        };
        header.title = title.to_string();
        self.persist_headers();
        true
    }

    /// Pin a column's editor kind, or clear the pin with `None`
    pub fn set_column_kind(&mut self, column_key: &str, kind: Option<ColumnType>) -> bool {
        let Some(header) = self.headers.iter_mut().find(|h| h.key == column_key) else {
            return false;
        };
        header.kind = kind;
        self.persist_headers();
        true
    }

    // ========================
    // Scale
    // ========================

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn metrics(&self) -> ScaleMetrics {
        self.scale.metrics()
    }

    pub fn zoom_in(&mut self) -> Scale {
        self.apply_scale(self.scale.zoomed_in())
    }

    pub fn zoom_out(&mut self) -> Scale {
        self.apply_scale(self.scale.zoomed_out())
    }

    pub fn reset_zoom(&mut self) -> Scale {
        self.apply_scale(Scale::DEFAULT)
    }

    /// Slider input: clamped and snapped to the step
    pub fn set_scale(&mut self, percent: i64) -> Scale {
        self.apply_scale(Scale::snapped(percent))
    }

    fn apply_scale(&mut self, scale: Scale) -> Scale {
        self.scale = scale;
        self.store.set(GRID_SCALE, &scale);
        scale
    }

    fn persist_headers(&self) {
        self.store.set(GRID_COLUMN_HEADERS, &self.headers);
    }
}

fn default_headers(columns: usize) -> Vec<ColumnHeader> {
    (1..=columns).map(ColumnHeader::numbered).collect()
}

fn default_rows(rows: usize, headers: &[ColumnHeader]) -> Vec<CellRow> {
    (0..rows).map(|index| CellRow::blank(index, headers)).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::grid::column_type::STATUS_OPTIONS;
    use crate::reference::domains::INITIATORS;
    use crate::reference::NamedListStore;
    use crate::storage::{KeyValueBackend, MemoryBackend};

    fn model() -> (Arc<MemoryBackend>, PersistentStore, GridModel) {
        let backend = Arc::new(MemoryBackend::new());
        let store = PersistentStore::new(backend.clone());
        let grid = GridModel::load(store.clone(), GridConfig::default());
        (backend, store, grid)
    }

    #[test]
    fn test_defaults_are_not_persisted() {
        let (backend, _, grid) = model();

        assert_eq!(grid.headers().len(), 21);
        assert_eq!(grid.headers()[0].title, "Столбец 1");
        assert_eq!(grid.headers()[20].key, "col_21");
        assert_eq!(grid.rows().len(), 15);
        assert_eq!(grid.rows()[14].key, "row_14");
        assert_eq!(grid.scale(), Scale::DEFAULT);
        assert!(backend.keys().unwrap().is_empty());
    }

    #[test]
    fn test_numbering_row_is_derived_and_read_only() {
        let (_, _, mut grid) = model();

        let display = grid.display_rows();
        assert_eq!(display.len(), 16);
        assert!(display[0].is_numbering());
        assert_eq!(display[0].get("col_1"), "1");
        assert_eq!(display[0].get("col_21"), "21");

        assert!(grid.start_cell_edit(NUMBERING_ROW_KEY, "col_1").is_none());
        assert!(grid.start_cell_edit("row_99", "col_1").is_none());
        assert!(grid.start_cell_edit("row_0", "col_99").is_none());
        assert!(grid.editing_cell().is_none());
    }

    #[test]
    fn test_cell_commit_persists_rows() {
        let (_, store, mut grid) = model();

        let editor = grid.start_cell_edit("row_2", "col_3").unwrap();
        assert_eq!(editor.options, EditorOptions::FreeText);
        assert_eq!(editor.commit, CommitTrigger::EnterOrBlur);
        grid.set_cell_buffer("Фундамент");
        assert!(grid.commit_cell_edit());
        assert!(!grid.commit_cell_edit());

        let reloaded = GridModel::load(store, GridConfig::default());
        assert_eq!(reloaded.cell("row_2", "col_3"), Some("Фундамент"));
    }

    #[test]
    fn test_cancel_and_switch_discard_buffer() {
        let (_, _, mut grid) = model();

        grid.start_cell_edit("row_0", "col_1");
        grid.set_cell_buffer("lost");
        grid.cancel_cell_edit();
        assert_eq!(grid.cell("row_0", "col_1"), Some(""));

        grid.start_cell_edit("row_0", "col_1");
        grid.set_cell_buffer("also lost");
        grid.start_cell_edit("row_1", "col_1");
        grid.commit_cell_edit();
        assert_eq!(grid.cell("row_0", "col_1"), Some(""));
        assert_eq!(grid.cell("row_1", "col_1"), Some(""));
    }

    #[test]
    fn test_status_header_switches_editor() {
        let (_, _, mut grid) = model();

        assert!(grid.start_header_edit("col_5"));
        assert_eq!(grid.header_buffer(), "Столбец 5");
        grid.set_header_buffer("Статус");
        assert!(grid.commit_header_edit());

        let editor = grid.start_cell_edit("row_0", "col_5").unwrap();
        assert_eq!(editor.column_type, ColumnType::Status);
        assert_eq!(editor.options.options().to_vec(), STATUS_OPTIONS.to_vec());
        assert_eq!(editor.commit, CommitTrigger::Blur);
    }

    #[test]
    fn test_rename_away_reverts_to_text() {
        let (_, _, mut grid) = model();

        grid.rename_column("col_2", "Инициатор");
        assert_eq!(grid.column_type("col_2"), ColumnType::Initiator);
        grid.rename_column("col_2", "Примечание");
        assert_eq!(grid.column_type("col_2"), ColumnType::Text);
    }

    #[test]
    fn test_pinned_kind_survives_rename() {
        let (_, store, mut grid) = model();

        grid.set_column_kind("col_4", Some(ColumnType::Priority));
        grid.rename_column("col_4", "Важность");
        let reloaded = GridModel::load(store, GridConfig::default());
        assert_eq!(reloaded.column_type("col_4"), ColumnType::Priority);
        assert_eq!(reloaded.header("col_4").unwrap().title, "Важность");
    }

    #[test]
    fn test_blank_header_keeps_title_and_persists() {
        let (backend, _, mut grid) = model();

        grid.start_header_edit("col_1");
        grid.set_header_buffer("   ");
        assert!(grid.commit_header_edit());
        assert_eq!(grid.editing_header(), None);
        assert_eq!(grid.header("col_1").unwrap().title, "Столбец 1");
        assert!(backend.read("tableColumnHeaders").unwrap().is_some());

        assert!(!grid.rename_column("col_1", ""));
    }

    #[test]
    fn test_initiator_options_read_at_edit_time() {
        let (_, store, mut grid) = model();
        grid.rename_column("col_7", "Инициатор работ");

        let before = grid.start_cell_edit("row_0", "col_7").unwrap();
        assert!(before.options.options().is_empty());
        grid.cancel_cell_edit();

        let mut initiators = NamedListStore::load(&INITIATORS, store);
        initiators.add();
        let after = grid.start_cell_edit("row_0", "col_7").unwrap();
        assert_eq!(after.options.options().len(), 4);
    }

    #[test]
    fn test_zoom_persists() {
        let (backend, store, mut grid) = model();

        assert_eq!(grid.zoom_in().percent(), 110);
        assert_eq!(backend.read("tableScale").unwrap(), Some("110".to_string()));
        grid.zoom_out();
        grid.zoom_out();
        assert_eq!(grid.scale().percent(), 90);
        assert_eq!(grid.set_scale(147).percent(), 150);

        let reloaded = GridModel::load(store, GridConfig::default());
        assert_eq!(reloaded.scale().percent(), 150);
        assert_eq!(reloaded.metrics().column_width, 210);

        grid.reset_zoom();
        assert_eq!(grid.scale(), Scale::DEFAULT);
    }

    #[test]
    fn test_out_of_range_stored_scale_is_clamped() {
        let (backend, store, _) = model();
        backend.write("tableScale", "500").unwrap();
        let grid = GridModel::load(store, GridConfig::default());
        assert_eq!(grid.scale().percent(), 200);
    }

    #[test]
    fn test_extreme_slider_input_is_clamped() {
        let (_, _, mut grid) = model();
        assert_eq!(grid.set_scale(i64::MAX).percent(), 200);
        assert_eq!(grid.set_scale(i64::MIN).percent(), 50);
        assert!(!grid.scale().can_zoom_out());
    }

    #[test]
    fn test_custom_dimensions() {
        let store = PersistentStore::in_memory();
        let grid = GridModel::load(store, GridConfig { columns: 3, rows: 2 });
        assert_eq!(grid.headers().len(), 3);
        assert_eq!(grid.rows()[1].cells.len(), 3);
    }
}

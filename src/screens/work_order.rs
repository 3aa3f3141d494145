//! Work-Order Table Screen
//!
//! Per-project three-column table of additional works. Column names live in
//! one row per project, created with defaults on first open.

use std::sync::Arc;

use serde_json::json;

use crate::domain::{GatewayError, GatewayResult, RemoteEntity, WorkOrderColumns, WorkOrderRow};
use crate::gateway::{from_row, from_rows, single, to_row, Filter, Query, Row, TableGateway};
use super::notice::Notices;
use super::remote_list::{LoadTicket, RemoteList};
use super::report_failure;

pub const DEFAULT_COLUMN_NAMES: [&str; 3] = [
    "Материалы/Работы",
    "Количество по ПД",
    "Количество по пересчету",
];

pub const LOAD_FAILED: &str = "Ошибка загрузки данных дополнительных работ";
pub const ROW_UPDATED: &str = "Строка обновлена";
pub const ROW_UPDATE_FAILED: &str = "Ошибка при обновлении строки";
pub const ROW_DELETED: &str = "Строка удалена";
pub const ROW_DELETE_FAILED: &str = "Ошибка при удалении строки";
pub const COLUMNS_UPDATED: &str = "Заголовки колонок обновлены";
pub const COLUMNS_UPDATE_FAILED: &str = "Ошибка при обновлении заголовков";
pub const ROW_ADDED: &str = "Строка добавлена";
pub const ROW_ADD_FAILED: &str = "Ошибка при добавлении строки";

pub struct WorkOrderScreen {
    gateway: Arc<dyn TableGateway>,
    project_id: String,
    columns: Option<WorkOrderColumns>,
    rows: RemoteList<WorkOrderRow>,
    editing_row: Option<String>,
    notices: Notices,
}

impl WorkOrderScreen {
    pub fn new(gateway: Arc<dyn TableGateway>, project_id: impl Into<String>) -> Self {
        Self {
            gateway,
            project_id: project_id.into(),
            columns: None,
            rows: RemoteList::new(),
            editing_row: None,
            notices: Notices::default(),
        }
    }

    /// Column names; `None` until the first successful load
    pub fn columns(&self) -> Option<&WorkOrderColumns> {
        self.columns.as_ref()
    }

    pub fn rows(&self) -> &[WorkOrderRow] {
        self.rows.items()
    }

    pub fn is_loading(&self) -> bool {
        self.rows.is_loading()
    }

    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }

    /// Fetch column names (creating the defaults if the project has none) and rows
    pub async fn fetch(
        gateway: &dyn TableGateway,
        project_id: &str,
    ) -> GatewayResult<(WorkOrderColumns, Vec<WorkOrderRow>)> {
        let columns_query = Query::table(WorkOrderColumns::TABLE).eq("project_id", project_id);
        let columns = match gateway.select_single(&columns_query).await {
            Ok(row) => from_row(row)?,
            Err(GatewayError::NoRows) => {
                log::info!("Creating default work-order columns for project {}", project_id);
                let defaults = to_row(&json!({
                    "project_id": project_id,
                    "column_1_name": DEFAULT_COLUMN_NAMES[0],
                    "column_2_name": DEFAULT_COLUMN_NAMES[1],
                    "column_3_name": DEFAULT_COLUMN_NAMES[2],
                }))?;
                single(gateway.insert(WorkOrderColumns::TABLE, vec![defaults], &[]).await?)?
            }
            Err(e) => return Err(e),
        };

        let rows_query = Query::table(WorkOrderRow::TABLE)
            .eq("project_id", project_id)
            .order("sort_order", true);
        let rows = from_rows(gateway.select(&rows_query).await?)?;
        Ok((columns, rows))
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.rows.begin_load()
    }

    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        result: GatewayResult<(WorkOrderColumns, Vec<WorkOrderRow>)>,
    ) -> bool {
        match result {
            Ok((columns, rows)) => {
                if !self.rows.finish_load(ticket, rows) {
                    return false;
                }
                self.columns = Some(columns);
                true
            }
            Err(e) => {
                if self.rows.fail_load(ticket) {
                    report_failure(&mut self.notices, LOAD_FAILED, &e);
                }
                false
            }
        }
    }

    pub async fn load(&mut self) -> bool {
        let ticket = self.begin_load();
        let gateway = Arc::clone(&self.gateway);
        let result = Self::fetch(gateway.as_ref(), &self.project_id).await;
        self.apply_load(ticket, result)
    }

    // ========================
    // Rows
    // ========================

    pub fn start_row_edit(&mut self, id: &str) -> bool {
        if self.rows.get(id).is_none() {
            return false;
        }
        self.editing_row = Some(id.to_string());
        true
    }

    pub fn editing_row(&self) -> Option<&str> {
        self.editing_row.as_deref()
    }

    pub fn cancel_row_edit(&mut self) {
        self.editing_row = None;
    }

    /// Next free position: one past the largest, starting at 1
    pub fn next_sort_order(&self) -> i64 {
        self.rows().iter().map(|r| r.sort_order).max().unwrap_or(0).max(0) + 1
    }

    pub async fn add_row(&mut self, values: [&str; 3]) -> Option<WorkOrderRow> {
        let row = json!({
            "project_id": self.project_id,
            "column_1_value": values[0],
            "column_2_value": values[1],
            "column_3_value": values[2],
            "sort_order": self.next_sort_order(),
        });

        match self.insert_row(row).await {
            Ok(created) => {
                self.rows.append(created.clone());
                self.notices.success(ROW_ADDED);
                Some(created)
            }
            Err(e) => {
                report_failure(&mut self.notices, ROW_ADD_FAILED, &e);
                None
            }
        }
    }

    async fn insert_row(&self, row: serde_json::Value) -> GatewayResult<WorkOrderRow> {
        let row = to_row(&row)?;
        single(self.gateway.insert(WorkOrderRow::TABLE, vec![row], &[]).await?)
    }

    /// Save a row's three values and close its edit
    pub async fn update_row(&mut self, id: &str, values: [&str; 3]) -> Option<WorkOrderRow> {
        let patch = json!({
            "column_1_value": values[0],
            "column_2_value": values[1],
            "column_3_value": values[2],
        });

        match self.patch(WorkOrderRow::TABLE, id, patch).await.and_then(single::<WorkOrderRow>) {
            Ok(updated) => {
                self.rows.replace(updated.clone());
                self.editing_row = None;
                self.notices.success(ROW_UPDATED);
                Some(updated)
            }
            Err(e) => {
                report_failure(&mut self.notices, ROW_UPDATE_FAILED, &e);
                None
            }
        }
    }

    pub async fn delete_row(&mut self, id: &str) -> bool {
        match self.gateway.delete(WorkOrderRow::TABLE, &[Filter::eq("id", id)]).await {
            Ok(()) => {
                self.rows.remove(id);
                if self.editing_row.as_deref() == Some(id) {
                    self.editing_row = None;
                }
                self.notices.success(ROW_DELETED);
                true
            }
            Err(e) => {
                report_failure(&mut self.notices, ROW_DELETE_FAILED, &e);
                false
            }
        }
    }

    // ========================
    // Column names
    // ========================

    /// Rename the three columns; needs a loaded table
    pub async fn update_columns(&mut self, names: [&str; 3]) -> bool {
        let Some(id) = self.columns.as_ref().map(|c| c.id.clone()) else {
            return false;
        };
        let patch = json!({
            "column_1_name": names[0],
            "column_2_name": names[1],
            "column_3_name": names[2],
        });

        match self.patch(WorkOrderColumns::TABLE, &id, patch).await.and_then(single::<WorkOrderColumns>) {
            Ok(columns) => {
                self.columns = Some(columns);
                self.notices.success(COLUMNS_UPDATED);
                true
            }
            Err(e) => {
                report_failure(&mut self.notices, COLUMNS_UPDATE_FAILED, &e);
                false
            }
        }
    }

    async fn patch(
        &self,
        table: &str,
        id: &str,
        patch: serde_json::Value,
    ) -> GatewayResult<Vec<Row>> {
        let patch = to_row(&patch)?;
        self.gateway
            .update(table, patch, &[Filter::eq("id", id)], &[])
            .await
    }

    pub fn leave(&mut self) {
        self.rows.invalidate();
        self.editing_row = None;
    }
}

//! Project Parameters Screen
//!
//! Free-form `parameter: value` rows on a project card, kept in `sort_order`.

use std::sync::Arc;

use serde_json::json;

use crate::domain::{GatewayResult, ProjectParameter, RemoteEntity};
use crate::gateway::{from_rows, single, to_row, Filter, Query, TableGateway};
use super::notice::Notices;
use super::remote_list::{LoadTicket, RemoteList};
use super::report_failure;

pub const LOAD_FAILED: &str = "Ошибка при загрузке параметров проекта";
pub const ADD_FAILED: &str = "Ошибка при добавлении параметра";
pub const UPDATE_FAILED: &str = "Ошибка при обновлении параметра";
pub const DELETE_FAILED: &str = "Ошибка при удалении параметра";

pub struct ProjectParametersScreen {
    gateway: Arc<dyn TableGateway>,
    project_id: String,
    list: RemoteList<ProjectParameter>,
    notices: Notices,
}

impl ProjectParametersScreen {
    pub fn new(gateway: Arc<dyn TableGateway>, project_id: impl Into<String>) -> Self {
        Self {
            gateway,
            project_id: project_id.into(),
            list: RemoteList::new(),
            notices: Notices::default(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn parameters(&self) -> &[ProjectParameter] {
        self.list.items()
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub async fn fetch(gateway: &dyn TableGateway, project_id: &str) -> GatewayResult<Vec<ProjectParameter>> {
        let query = Query::table(ProjectParameter::TABLE)
            .eq("project_id", project_id)
            .order("sort_order", true);
        from_rows(gateway.select(&query).await?)
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.list.begin_load()
    }

    pub fn apply_load(&mut self, ticket: LoadTicket, result: GatewayResult<Vec<ProjectParameter>>) -> bool {
        self.list.settle(ticket, result, &mut self.notices, LOAD_FAILED)
    }

    pub async fn load(&mut self) -> bool {
        let ticket = self.begin_load();
        let gateway = Arc::clone(&self.gateway);
        let result = Self::fetch(gateway.as_ref(), &self.project_id).await;
        self.apply_load(ticket, result)
    }

    /// Next free position: one past the largest, starting at 1
    pub fn next_sort_order(&self) -> i64 {
        self.parameters()
            .iter()
            .map(|p| p.sort_order)
            .max()
            .unwrap_or(0)
            .max(0)
            + 1
    }

    /// Append a parameter; both fields must be non-blank
    pub async fn add(&mut self, parameter: &str, value: &str) -> Option<ProjectParameter> {
        let (parameter, value) = (parameter.trim(), value.trim());
        if parameter.is_empty() || value.is_empty() {
            return None;
        }

        let row = json!({
            "project_id": self.project_id,
            "parameter": parameter,
            "value": value,
            "sort_order": self.next_sort_order(),
        });
        match self.insert(row).await {
            Ok(created) => {
                self.list.append(created.clone());
                Some(created)
            }
            Err(e) => {
                report_failure(&mut self.notices, ADD_FAILED, &e);
                None
            }
        }
    }

    async fn insert(&self, row: serde_json::Value) -> GatewayResult<ProjectParameter> {
        let row = to_row(&row)?;
        single(self.gateway.insert(ProjectParameter::TABLE, vec![row], &[]).await?)
    }

    pub async fn update(&mut self, id: &str, parameter: &str, value: &str) -> Option<ProjectParameter> {
        match self.patch(id, parameter, value).await {
            Ok(updated) => {
                self.list.replace(updated.clone());
                Some(updated)
            }
            Err(e) => {
                report_failure(&mut self.notices, UPDATE_FAILED, &e);
                None
            }
        }
    }

    async fn patch(&self, id: &str, parameter: &str, value: &str) -> GatewayResult<ProjectParameter> {
        let row = to_row(&json!({ "parameter": parameter, "value": value }))?;
        single(
            self.gateway
                .update(ProjectParameter::TABLE, row, &[Filter::eq("id", id)], &[])
                .await?,
        )
    }

    pub async fn delete(&mut self, id: &str) -> bool {
        match self.gateway.delete(ProjectParameter::TABLE, &[Filter::eq("id", id)]).await {
            Ok(()) => {
                self.list.remove(id);
                true
            }
            Err(e) => {
                report_failure(&mut self.notices, DELETE_FAILED, &e);
                false
            }
        }
    }

    pub fn leave(&mut self) {
        self.list.invalidate();
    }
}

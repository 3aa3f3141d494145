//! Projects Screen
//!
//! Project list, newest first.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{GatewayResult, Project, RemoteEntity};
use crate::gateway::{from_rows, single, to_row, Filter, Query, TableGateway};
use super::notice::Notices;
use super::remote_list::{LoadTicket, RemoteList};
use super::report_failure;

pub const LOAD_FAILED: &str = "Ошибка при загрузке проектов";
pub const ADD_FAILED: &str = "Ошибка при добавлении проекта";
pub const UPDATE_FAILED: &str = "Ошибка при обновлении проекта";
pub const DELETE_FAILED: &str = "Ошибка при удалении проекта";

/// Status every new project starts in
pub const INITIAL_STATUS: &str = "active";

/// Fields of a project being created
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Changed fields of a project
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

pub struct ProjectsScreen {
    gateway: Arc<dyn TableGateway>,
    list: RemoteList<Project>,
    notices: Notices,
}

impl ProjectsScreen {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self {
            gateway,
            list: RemoteList::new(),
            notices: Notices::default(),
        }
    }

    pub fn projects(&self) -> &[Project] {
        self.list.items()
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.list.get(id)
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub async fn fetch(gateway: &dyn TableGateway) -> GatewayResult<Vec<Project>> {
        let query = Query::table(Project::TABLE).order("created_at", false);
        from_rows(gateway.select(&query).await?)
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.list.begin_load()
    }

    pub fn apply_load(&mut self, ticket: LoadTicket, result: GatewayResult<Vec<Project>>) -> bool {
        self.list.settle(ticket, result, &mut self.notices, LOAD_FAILED)
    }

    pub async fn load(&mut self) -> bool {
        let ticket = self.begin_load();
        let gateway = Arc::clone(&self.gateway);
        let result = Self::fetch(gateway.as_ref()).await;
        self.apply_load(ticket, result)
    }

    /// Create a project; it is shown first
    pub async fn add(&mut self, draft: NewProject) -> Option<Project> {
        if draft.name.trim().is_empty() {
            log::warn!("Project name is required");
            return None;
        }

        match self.insert(&draft).await {
            Ok(project) => {
                log::info!("Project created: {}", project.id);
                self.list.prepend(project.clone());
                Some(project)
            }
            Err(e) => {
                report_failure(&mut self.notices, ADD_FAILED, &e);
                None
            }
        }
    }

    async fn insert(&self, draft: &NewProject) -> GatewayResult<Project> {
        let mut row = to_row(draft)?;
        row.insert("status".to_string(), INITIAL_STATUS.into());
        single(self.gateway.insert(Project::TABLE, vec![row], &[]).await?)
    }

    /// Update a project and replace it with the stored row
    pub async fn update(&mut self, id: &str, patch: ProjectPatch) -> Option<Project> {
        match self.patch(id, &patch).await {
            Ok(project) => {
                self.list.replace(project.clone());
                Some(project)
            }
            Err(e) => {
                report_failure(&mut self.notices, UPDATE_FAILED, &e);
                None
            }
        }
    }

    async fn patch(&self, id: &str, patch: &ProjectPatch) -> GatewayResult<Project> {
        let row = to_row(patch)?;
        single(
            self.gateway
                .update(Project::TABLE, row, &[Filter::eq("id", id)], &[])
                .await?,
        )
    }

    pub async fn delete(&mut self, id: &str) -> bool {
        match self.gateway.delete(Project::TABLE, &[Filter::eq("id", id)]).await {
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

    /// Drop loads in flight when the screen goes away
    pub fn leave(&mut self) {
        self.list.invalidate();
    }
}

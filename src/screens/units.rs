//! Units Screen
//!
//! Units of measure, ordered by name.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{GatewayResult, RemoteEntity, Unit};
use crate::gateway::{from_rows, single, to_row, Filter, Query, TableGateway};
use super::notice::Notices;
use super::remote_list::{LoadTicket, RemoteList};
use super::report_failure;

pub const LOAD_FAILED: &str = "Не удалось загрузить единицы измерения";
pub const ADD_FAILED: &str = "Не удалось добавить единицу измерения";
pub const UPDATE_FAILED: &str = "Не удалось обновить единицу измерения";
pub const DELETE_FAILED: &str = "Не удалось удалить единицу измерения";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewUnit {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnitPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

pub struct UnitsScreen {
    gateway: Arc<dyn TableGateway>,
    list: RemoteList<Unit>,
    notices: Notices,
}

impl UnitsScreen {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self {
            gateway,
            list: RemoteList::new(),
            notices: Notices::default(),
        }
    }

    pub fn units(&self) -> &[Unit] {
        self.list.items()
    }

    /// Units offered in editors
    pub fn active(&self) -> Vec<&Unit> {
        self.list.items().iter().filter(|u| u.is_active).collect()
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub async fn fetch(gateway: &dyn TableGateway) -> GatewayResult<Vec<Unit>> {
        let query = Query::table(Unit::TABLE).order("name", true);
        from_rows(gateway.select(&query).await?)
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.list.begin_load()
    }

    pub fn apply_load(&mut self, ticket: LoadTicket, result: GatewayResult<Vec<Unit>>) -> bool {
        self.list.settle(ticket, result, &mut self.notices, LOAD_FAILED)
    }

    pub async fn load(&mut self) -> bool {
        let ticket = self.begin_load();
        let gateway = Arc::clone(&self.gateway);
        let result = Self::fetch(gateway.as_ref()).await;
        self.apply_load(ticket, result)
    }

    pub async fn add(&mut self, draft: NewUnit) -> Option<Unit> {
        match self.insert(&draft).await {
            Ok(unit) => {
                self.list.append(unit.clone());
                Some(unit)
            }
            Err(e) => {
                report_failure(&mut self.notices, ADD_FAILED, &e);
                None
            }
        }
    }

    async fn insert(&self, draft: &NewUnit) -> GatewayResult<Unit> {
        let row = to_row(draft)?;
        single(self.gateway.insert(Unit::TABLE, vec![row], &[]).await?)
    }

    pub async fn update(&mut self, id: &str, patch: UnitPatch) -> Option<Unit> {
        match self.patch(id, &patch).await {
            Ok(unit) => {
                self.list.replace(unit.clone());
                Some(unit)
            }
            Err(e) => {
                report_failure(&mut self.notices, UPDATE_FAILED, &e);
                None
            }
        }
    }

    async fn patch(&self, id: &str, patch: &UnitPatch) -> GatewayResult<Unit> {
        let row = to_row(patch)?;
        single(
            self.gateway
                .update(Unit::TABLE, row, &[Filter::eq("id", id)], &[])
                .await?,
        )
    }

    pub async fn delete(&mut self, id: &str) -> bool {
        match self.gateway.delete(Unit::TABLE, &[Filter::eq("id", id)]).await {
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

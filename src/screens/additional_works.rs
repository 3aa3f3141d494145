//! Additional Works Screen
//!
//! Out-of-contract works with their design and recount quantities. Each work
//! is fetched with its unit embedded.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{AdditionalWork, GatewayResult, RemoteEntity, Unit, WorkStatus};
use crate::gateway::{from_rows, single, to_row, Embed, Filter, Query, TableGateway};
use super::notice::Notices;
use super::remote_list::{LoadTicket, RemoteList};
use super::report_failure;

pub const LOAD_FAILED: &str = "Не удалось загрузить дополнительные работы";
pub const ADD_FAILED: &str = "Не удалось добавить дополнительную работу";
pub const UPDATE_FAILED: &str = "Не удалось обновить дополнительную работу";
pub const DELETE_FAILED: &str = "Не удалось удалить дополнительную работу";
pub const UNITS_FAILED: &str = "Не удалось загрузить единицы измерения";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewWork {
    pub materials: String,
    pub quantity_pd: f64,
    pub quantity_recount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<String>,
    pub status: WorkStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materials: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_pd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_recount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkStatus>,
}

fn unit_embed() -> Embed {
    Embed::new("unit", Unit::TABLE)
}

pub struct AdditionalWorksScreen {
    gateway: Arc<dyn TableGateway>,
    list: RemoteList<AdditionalWork>,
    units: RemoteList<Unit>,
    notices: Notices,
}

impl AdditionalWorksScreen {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self {
            gateway,
            list: RemoteList::new(),
            units: RemoteList::new(),
            notices: Notices::default(),
        }
    }

    pub fn works(&self) -> &[AdditionalWork] {
        self.list.items()
    }

    /// Active units for the unit selector
    pub fn units(&self) -> &[Unit] {
        self.units.items()
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub async fn fetch(gateway: &dyn TableGateway) -> GatewayResult<Vec<AdditionalWork>> {
        let query = Query::table(AdditionalWork::TABLE)
            .embed(unit_embed())
            .order("created_at", false);
        from_rows(gateway.select(&query).await?)
    }

    pub async fn fetch_units(gateway: &dyn TableGateway) -> GatewayResult<Vec<Unit>> {
        let query = Query::table(Unit::TABLE)
            .eq("is_active", true)
            .order("name", true);
        from_rows(gateway.select(&query).await?)
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.list.begin_load()
    }

    pub fn apply_load(&mut self, ticket: LoadTicket, result: GatewayResult<Vec<AdditionalWork>>) -> bool {
        self.list.settle(ticket, result, &mut self.notices, LOAD_FAILED)
    }

    pub async fn load(&mut self) -> bool {
        let ticket = self.begin_load();
        let gateway = Arc::clone(&self.gateway);
        let result = Self::fetch(gateway.as_ref()).await;
        self.apply_load(ticket, result)
    }

    pub async fn load_units(&mut self) -> bool {
        let ticket = self.units.begin_load();
        let gateway = Arc::clone(&self.gateway);
        let result = Self::fetch_units(gateway.as_ref()).await;
        self.units.settle(ticket, result, &mut self.notices, UNITS_FAILED)
    }

    /// Record a new work; it is shown first
    pub async fn add(&mut self, draft: NewWork) -> Option<AdditionalWork> {
        match self.insert(&draft).await {
            Ok(work) => {
                self.list.prepend(work.clone());
                Some(work)
            }
            Err(e) => {
                report_failure(&mut self.notices, ADD_FAILED, &e);
                None
            }
        }
    }

    async fn insert(&self, draft: &NewWork) -> GatewayResult<AdditionalWork> {
        let row = to_row(draft)?;
        single(
            self.gateway
                .insert(AdditionalWork::TABLE, vec![row], &[unit_embed()])
                .await?,
        )
    }

    /// Update a work; the stored row, with its unit, replaces the local one
    pub async fn update(&mut self, id: &str, patch: WorkPatch) -> Option<AdditionalWork> {
        match self.patch(id, &patch).await {
            Ok(work) => {
                self.list.replace(work.clone());
                Some(work)
            }
            Err(e) => {
                report_failure(&mut self.notices, UPDATE_FAILED, &e);
                None
            }
        }
    }

    async fn patch(&self, id: &str, patch: &WorkPatch) -> GatewayResult<AdditionalWork> {
        let row = to_row(patch)?;
        single(
            self.gateway
                .update(AdditionalWork::TABLE, row, &[Filter::eq("id", id)], &[unit_embed()])
                .await?,
        )
    }

    pub async fn delete(&mut self, id: &str) -> bool {
        match self.gateway.delete(AdditionalWork::TABLE, &[Filter::eq("id", id)]).await {
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

    pub fn by_status(&self, status: WorkStatus) -> Vec<&AdditionalWork> {
        self.works().iter().filter(|w| w.status == status).collect()
    }

    pub fn with_deviations(&self) -> Vec<&AdditionalWork> {
        self.works().iter().filter(|w| w.has_deviation()).collect()
    }

    /// Sum of absolute recount deviations
    pub fn total_deviation(&self) -> f64 {
        self.works().iter().map(|w| w.deviation().abs()).sum()
    }

    pub fn leave(&mut self) {
        self.list.invalidate();
        self.units.invalidate();
    }
}

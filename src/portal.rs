//! Portal Session
//!
//! Wires configuration, logging, the durable store, the reference registry and
//! the calculation grid for one session.

use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::grid::GridModel;
use crate::reference::{ReferencePage, ReferenceRegistry};
use crate::storage::PersistentStore;

#[cfg(not(target_arch = "wasm32"))]
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use crate::gateway::SqliteGateway;
#[cfg(not(target_arch = "wasm32"))]
use crate::storage::SqliteBackend;

pub struct Portal {
    config: PortalConfig,
    store: PersistentStore,
    registry: ReferenceRegistry,
    grid: GridModel,
}

impl Portal {
    /// Open the session over a SQLite store under `config.data_dir`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open(config: PortalConfig) -> Result<Self, PortalError> {
        std::fs::create_dir_all(&config.data_dir).map_err(|source| PortalError::Io {
            path: config.data_dir.clone(),
            source,
        })?;

        let backend = SqliteBackend::open(&config.store_path())?;
        log::info!("Local store opened at {}", config.store_path().display());
        Ok(Self::with_store(config, PersistentStore::new(Arc::new(backend))))
    }

    /// Open the session over an existing store
    pub fn with_store(config: PortalConfig, store: PersistentStore) -> Self {
        let registry = ReferenceRegistry::load(store.clone());
        let grid = GridModel::load(store.clone(), config.grid);
        log::info!(
            "Portal session ready: {} reference types, {}x{} grid",
            registry.descriptors().len(),
            grid.headers().len(),
            grid.rows().len()
        );

        Self {
            config,
            store,
            registry,
            grid,
        }
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn store(&self) -> &PersistentStore {
        &self.store
    }

    pub fn registry(&self) -> &ReferenceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ReferenceRegistry {
        &mut self.registry
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut GridModel {
        &mut self.grid
    }

    /// Resolve a reference route
    pub fn open_reference(&self, key: &str) -> ReferencePage {
        self.registry.open(key)
    }

    /// Open the relational database behind the entity screens
    #[cfg(not(target_arch = "wasm32"))]
    pub fn connect_gateway(&self) -> Result<SqliteGateway, PortalError> {
        let path = self.config.remote_db_path();
        let gateway = SqliteGateway::open(&path)?;
        log::info!("Remote database opened at {}", path.display());
        Ok(gateway)
    }
}

/// Install the rolling file logger for this configuration
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging(config: &PortalConfig) -> Result<(), PortalError> {
    rolling_logger::init_logger(config.log_path(), &config.app_name)
        .map_err(|e| PortalError::Logger(e.to_string()))?;
    let _ = rolling_logger::info(&format!(
        "Data directory: {}",
        config.data_dir.display()
    ));
    Ok(())
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::domain::{Project, RemoteEntity};
    use crate::gateway::{Query, TableGateway};

    fn temp_config(dir: &tempfile::TempDir) -> PortalConfig {
        PortalConfig {
            data_dir: dir.path().join("data"),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_creates_data_dir_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let portal = Portal::open(temp_config(&dir)).unwrap();

        assert!(dir.path().join("data").join("store.db").exists());
        assert!(portal.registry().get("tags").is_some());
        assert_eq!(portal.grid().headers().len(), 21);
        assert_eq!(portal.grid().rows().len(), 15);
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut portal = Portal::open(temp_config(&dir)).unwrap();
            assert!(portal.registry_mut().delete("tags"));
            assert!(portal.grid_mut().rename_column("col_5", "Статус"));
        }

        let portal = Portal::open(temp_config(&dir)).unwrap();
        assert!(portal.registry().get("tags").is_none());
        assert!(portal.registry().deleted_keys().contains(&"tags".to_string()));
        assert_eq!(portal.grid().header("col_5").map(|h| h.title.as_str()), Some("Статус"));
        assert!(matches!(portal.open_reference("tags"), ReferencePage::NotFound));
    }

    #[test]
    fn test_open_reference_routes() {
        let portal = Portal::with_store(PortalConfig::default(), PersistentStore::in_memory());

        match portal.open_reference("documents") {
            ReferencePage::List(list) => assert_eq!(list.items().len(), 3),
            _ => panic!("documents should open as a list"),
        }
        assert!(matches!(portal.open_reference("missing"), ReferencePage::NotFound));
    }

    #[test]
    fn test_open_fails_when_data_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("data");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = Portal::open(temp_config(&dir));
        assert!(matches!(result, Err(PortalError::Io { .. })));
    }

    #[tokio::test]
    async fn test_connect_gateway_migrates_remote_db() {
        let dir = tempfile::tempdir().unwrap();
        let portal = Portal::open(temp_config(&dir)).unwrap();

        let gateway = portal.connect_gateway().unwrap();
        let rows = gateway.select(&Query::table(Project::TABLE)).await.unwrap();
        assert!(rows.is_empty());
        assert!(dir.path().join("data").join("portal.db").exists());
    }
}

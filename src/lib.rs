//! X-Work Portal Core
//!
//! Layered architecture:
//! - domain: Core entities shared by every layer
//! - storage: Durable key-value store adapter and its backends
//! - reference: Named reference lists and the reference registry
//! - grid: Editable calculation grid (columns, cells, scale)
//! - gateway: Remote relational table contract and a SQLite implementation
//! - screens: Entity screens consuming the gateway
//! - portal: Session facade wiring config, logging and local state

pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod grid;
pub mod portal;
pub mod reference;
pub mod screens;
pub mod storage;

pub use config::PortalConfig;
pub use error::{ConfigError, PortalError, StoreError};
pub use portal::Portal;

#[cfg(not(target_arch = "wasm32"))]
pub use portal::init_logging;

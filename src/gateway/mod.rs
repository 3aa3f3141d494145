//! Gateway Layer
//!
//! Remote relational table contract and its local SQLite implementation.

mod traits;

#[cfg(not(target_arch = "wasm32"))]
mod db;
#[cfg(not(target_arch = "wasm32"))]
mod sqlite;


pub use traits::{from_row, from_rows, single, to_row, Embed, Filter, Order, Query, Row, TableGateway};

#[cfg(not(target_arch = "wasm32"))]
pub use db::{column_exists, init_db};
#[cfg(not(target_arch = "wasm32"))]
pub use sqlite::SqliteGateway;

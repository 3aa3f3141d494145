//! Gateway Layer - Core Traits
//!
//! The remote relational table contract consumed by the entity screens.
//! Implementations can talk to a hosted backend, a local SQLite file, etc.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{GatewayError, GatewayResult};

/// One table row as a JSON object
pub type Row = Map<String, Value>;

/// Equality filter `column = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Result ordering on one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Related row fetched alongside each result row
///
/// `unit:units(*)` embeds the `units` row whose `id` equals the result's
/// `unit_id`, under the `unit` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub alias: String,
    pub table: String,
    pub foreign_key: String,
}

impl Embed {
    pub fn new(alias: impl Into<String>, table: impl Into<String>) -> Self {
        let alias = alias.into();
        Self {
            foreign_key: format!("{}_id", alias),
            alias,
            table: table.into(),
        }
    }

    /// Parse `alias:table(*)`
    pub fn parse(text: &str) -> GatewayResult<Self> {
        let invalid = || GatewayError::InvalidInput(format!("bad embed '{}'", text));

        let (alias, rest) = text.split_once(':').ok_or_else(invalid)?;
        let table = rest.strip_suffix("(*)").ok_or_else(invalid)?;
        if alias.is_empty() || table.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(alias, table))
    }
}

/// Select request against one table
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    /// Requested columns; empty means all
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub embeds: Vec<Embed>,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: None,
            embeds: Vec::new(),
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }
}

/// Remote table operations
///
/// Mutations return the affected rows as stored, with `embeds` resolved, so
/// callers can update local state from the backend's view of the row.
#[async_trait]
pub trait TableGateway: Send + Sync {
    /// Fetch rows matching the query
    async fn select(&self, query: &Query) -> GatewayResult<Vec<Row>>;

    /// Fetch exactly one row; `NoRows` when nothing matches
    async fn select_single(&self, query: &Query) -> GatewayResult<Row> {
        let mut rows = self.select(query).await?;
        match rows.len() {
            0 => Err(GatewayError::NoRows),
            1 => Ok(rows.remove(0)),
            n => Err(GatewayError::Conflict(format!(
                "expected one row from '{}', got {}",
                query.table, n
            ))),
        }
    }

    /// Insert rows, returning them with backend defaults filled in
    async fn insert(&self, table: &str, rows: Vec<Row>, embeds: &[Embed]) -> GatewayResult<Vec<Row>>;

    /// Apply `patch` to every row matching `filters`
    async fn update(
        &self,
        table: &str,
        patch: Row,
        filters: &[Filter],
        embeds: &[Embed],
    ) -> GatewayResult<Vec<Row>>;

    /// Delete every row matching `filters`
    async fn delete(&self, table: &str, filters: &[Filter]) -> GatewayResult<()>;
}

/// Serialize a value into a row object
pub fn to_row<T: Serialize>(value: &T) -> GatewayResult<Row> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(GatewayError::InvalidInput(format!(
            "expected an object row, got {}",
            other
        ))),
        Err(e) => Err(GatewayError::InvalidInput(e.to_string())),
    }
}

pub fn from_row<T: DeserializeOwned>(row: Row) -> GatewayResult<T> {
    serde_json::from_value(Value::Object(row)).map_err(|e| GatewayError::Internal(e.to_string()))
}

pub fn from_rows<T: DeserializeOwned>(rows: Vec<Row>) -> GatewayResult<Vec<T>> {
    rows.into_iter().map(from_row).collect()
}

/// The single row a one-row mutation returned
pub fn single<T: DeserializeOwned>(rows: Vec<Row>) -> GatewayResult<T> {
    let row = rows.into_iter().next().ok_or(GatewayError::NoRows)?;
    from_row(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embed_parse() {
        let embed = Embed::parse("unit:units(*)").unwrap();
        assert_eq!(embed.alias, "unit");
        assert_eq!(embed.table, "units");
        assert_eq!(embed.foreign_key, "unit_id");

        assert!(Embed::parse("units").is_err());
        assert!(Embed::parse(":units(*)").is_err());
        assert!(Embed::parse("unit:units").is_err());
    }

    #[test]
    fn test_query_builder() {
        let query = Query::table("project_parameters")
            .eq("project_id", "p1")
            .order("sort_order", true);
        assert_eq!(query.filters, vec![Filter::eq("project_id", json!("p1"))]);
        assert_eq!(query.order.as_ref().map(|o| o.ascending), Some(true));
        assert!(query.columns.is_empty());
    }

    #[test]
    fn test_to_row_rejects_scalars() {
        assert!(to_row(&json!({"name": "x"})).is_ok());
        assert!(matches!(to_row(&5), Err(GatewayError::InvalidInput(_))));
        assert!(matches!(single::<Row>(Vec::new()), Err(GatewayError::NoRows)));
    }
}

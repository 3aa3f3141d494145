//! SQLite Gateway Implementation
//!
//! Local implementation of the remote table contract, used for development,
//! offline work and tests.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, ErrorCode};
use serde_json::{Number, Value};
use tokio::sync::Mutex;

use crate::domain::{GatewayError, GatewayResult};
use super::db::{column_exists, init_db, NOW_SQL};
use super::traits::{Embed, Filter, Query, Row, TableGateway};

/// SQLite implementation of the table gateway
pub struct SqliteGateway {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteGateway {
    pub fn new(conn: Arc<Mutex<Option<Connection>>>) -> Self {
        Self { conn }
    }

    /// Open (and migrate) the database at `path`
    pub fn open(path: &Path) -> GatewayResult<Self> {
        let conn = init_db(path)?;
        Ok(Self::new(Arc::new(Mutex::new(Some(conn)))))
    }

    pub fn open_in_memory() -> GatewayResult<Self> {
        Self::open(Path::new(":memory:"))
    }

    /// Release the connection; later calls fail with `Network`
    pub async fn close(&self) {
        self.conn.lock().await.take();
    }
}

#[async_trait]
impl TableGateway for SqliteGateway {
    async fn select(&self, query: &Query) -> GatewayResult<Vec<Row>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_connected)?;
        select_rows(conn, query)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>, embeds: &[Embed]) -> GatewayResult<Vec<Row>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_connected)?;
        insert_rows(conn, table, rows, embeds)
    }

    async fn update(
        &self,
        table: &str,
        patch: Row,
        filters: &[Filter],
        embeds: &[Embed],
    ) -> GatewayResult<Vec<Row>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_connected)?;
        update_rows(conn, table, patch, filters, embeds)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> GatewayResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_connected)?;
        delete_rows(conn, table, filters)
    }
}

// ========================
// Statements
// ========================

fn select_rows(conn: &Connection, query: &Query) -> GatewayResult<Vec<Row>> {
    check_identifier(&query.table)?;
    for column in &query.columns {
        check_identifier(column)?;
    }

    let (where_sql, params) = where_clause(&query.filters)?;
    let order_sql = match &query.order {
        Some(order) => {
            check_identifier(&order.column)?;
            let dir = if order.ascending { "ASC" } else { "DESC" };
            format!(" ORDER BY {} {}, rowid {}", order.column, dir, dir)
        }
        None => " ORDER BY rowid ASC".to_string(),
    };

    let sql = format!("SELECT * FROM {}{}{}", query.table, where_sql, order_sql);
    let mut rows = query_rows(conn, &sql, params)?;
    resolve_embeds(conn, &mut rows, &query.embeds)?;

    if !query.columns.is_empty() {
        for row in &mut rows {
            row.retain(|key, _| {
                query.columns.iter().any(|c| c == key) || query.embeds.iter().any(|e| &e.alias == key)
            });
        }
    }
    Ok(rows)
}

fn insert_rows(conn: &Connection, table: &str, rows: Vec<Row>, embeds: &[Embed]) -> GatewayResult<Vec<Row>> {
    check_identifier(table)?;

    let tx = conn.unchecked_transaction().map_err(map_sql_error)?;
    let mut inserted = Vec::with_capacity(rows.len());
    for row in rows {
        let sql = if row.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES RETURNING *", table)
        } else {
            for column in row.keys() {
                check_identifier(column)?;
            }
            let columns: Vec<&str> = row.keys().map(String::as_str).collect();
            let placeholders = vec!["?"; columns.len()].join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
                table,
                columns.join(", "),
                placeholders
            )
        };
        let params: Vec<SqlValue> = row.values().map(to_sql_value).collect();
        inserted.extend(query_rows(&tx, &sql, params)?);
    }
    resolve_embeds(&tx, &mut inserted, embeds)?;
    tx.commit().map_err(map_sql_error)?;

    log::info!("Inserted {} row(s) into {}", inserted.len(), table);
    Ok(inserted)
}

fn update_rows(
    conn: &Connection,
    table: &str,
    mut patch: Row,
    filters: &[Filter],
    embeds: &[Embed],
) -> GatewayResult<Vec<Row>> {
    check_identifier(table)?;
    if filters.is_empty() {
        return Err(GatewayError::InvalidInput(format!("refusing unfiltered update of {}", table)));
    }
    // Ids are backend-owned
    patch.remove("id");
    if patch.is_empty() {
        return Err(GatewayError::InvalidInput("empty update patch".to_string()));
    }

    let mut assignments = Vec::with_capacity(patch.len() + 1);
    for column in patch.keys() {
        check_identifier(column)?;
        assignments.push(format!("{} = ?", column));
    }
    if !patch.contains_key("updated_at") && column_exists(conn, table, "updated_at") {
        assignments.push(format!("updated_at = {}", NOW_SQL));
    }

    let mut params: Vec<SqlValue> = patch.values().map(to_sql_value).collect();
    let (where_sql, filter_params) = where_clause(filters)?;
    params.extend(filter_params);

    let sql = format!(
        "UPDATE {} SET {}{} RETURNING *",
        table,
        assignments.join(", "),
        where_sql
    );
    let mut rows = query_rows(conn, &sql, params)?;
    resolve_embeds(conn, &mut rows, embeds)?;
    Ok(rows)
}

fn delete_rows(conn: &Connection, table: &str, filters: &[Filter]) -> GatewayResult<()> {
    check_identifier(table)?;
    if filters.is_empty() {
        return Err(GatewayError::InvalidInput(format!("refusing unfiltered delete of {}", table)));
    }

    let (where_sql, params) = where_clause(filters)?;
    let sql = format!("DELETE FROM {}{}", table, where_sql);
    let deleted = conn
        .execute(&sql, params_from_iter(params))
        .map_err(map_sql_error)?;

    log::info!("Deleted {} row(s) from {}", deleted, table);
    Ok(())
}

/// Attach each embed's related row (or null) under its alias
fn resolve_embeds(conn: &Connection, rows: &mut [Row], embeds: &[Embed]) -> GatewayResult<()> {
    for embed in embeds {
        check_identifier(&embed.table)?;
        let sql = format!("SELECT * FROM {} WHERE id = ?", embed.table);

        for row in rows.iter_mut() {
            let related = match row.get(&embed.foreign_key) {
                Some(Value::Null) | None => Value::Null,
                Some(key) => query_rows(conn, &sql, vec![to_sql_value(key)])?
                    .into_iter()
                    .next()
                    .map(Value::Object)
                    .unwrap_or(Value::Null),
            };
            row.insert(embed.alias.clone(), related);
        }
    }
    Ok(())
}

// ========================
// Helpers
// ========================

fn query_rows(conn: &Connection, sql: &str, params: Vec<SqlValue>) -> GatewayResult<Vec<Row>> {
    let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
    let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();

    let mut rows = stmt.query(params_from_iter(params)).map_err(map_sql_error)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(map_sql_error)? {
        let mut object = Row::new();
        for (index, name) in names.iter().enumerate() {
            let value = row.get_ref(index).map_err(map_sql_error)?;
            object.insert(name.clone(), to_json_value(value));
        }
        out.push(object);
    }
    Ok(out)
}

fn where_clause(filters: &[Filter]) -> GatewayResult<(String, Vec<SqlValue>)> {
    if filters.is_empty() {
        return Ok((String::new(), Vec::new()));
    }

    let mut conditions = Vec::with_capacity(filters.len());
    let mut params = Vec::with_capacity(filters.len());
    for filter in filters {
        check_identifier(&filter.column)?;
        if filter.value.is_null() {
            conditions.push(format!("{} IS NULL", filter.column));
        } else {
            conditions.push(format!("{} = ?", filter.column));
            params.push(to_sql_value(&filter.value));
        }
    }
    Ok((format!(" WHERE {}", conditions.join(" AND ")), params))
}

fn identifier_pattern() -> GatewayResult<&'static Regex> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$"))
        .as_ref()
        .map_err(|e| GatewayError::Internal(e.to_string()))
}

/// Table and column names are spliced into SQL; only plain identifiers pass
fn check_identifier(name: &str) -> GatewayResult<()> {
    if identifier_pattern()?.is_match(name) {
        Ok(())
    } else {
        Err(GatewayError::InvalidInput(format!("invalid identifier '{}'", name)))
    }
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn to_json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn map_sql_error(e: rusqlite::Error) -> GatewayError {
    match e.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => GatewayError::Conflict(e.to_string()),
        _ => {
            let message = e.to_string();
            if message.contains("no such table") || message.contains("no such column") {
                GatewayError::InvalidInput(message)
            } else {
                GatewayError::Internal(message)
            }
        }
    }
}

fn not_connected() -> GatewayError {
    GatewayError::Network("database connection closed".to_string())
}

//! Database Connection and Setup
//!
//! Opens the local relational database and runs migrations.

use std::path::Path;

use rusqlite::Connection;

use crate::domain::{GatewayError, GatewayResult};

/// SQL expression for an ISO-8601 UTC timestamp with milliseconds
pub const NOW_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Open the database at `path` (`:memory:` for an in-memory database)
pub fn init_db(path: &Path) -> GatewayResult<Connection> {
    let conn = if path.as_os_str() == ":memory:" {
        Connection::open_in_memory()
    } else {
        Connection::open(path)
    }
    .map_err(|e| GatewayError::Internal(format!("Failed to open database: {}", e)))?;

    run_migrations(&conn)?;
    Ok(conn)
}

/// Check if a column exists in a table
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let Ok(names) = stmt.query_map([], |row| row.get::<_, String>(1)) else {
        return false;
    };
    let found = names.flatten().any(|name| name == column);
    found
}

fn execute(conn: &Connection, sql: &str) -> GatewayResult<()> {
    conn.execute_batch(sql)
        .map_err(|e| GatewayError::Internal(format!("Migration failed: {}", e)))
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> GatewayResult<()> {
    let id = "id TEXT PRIMARY KEY NOT NULL DEFAULT (lower(hex(randomblob(16))))";
    let created = format!("created_at TEXT NOT NULL DEFAULT ({})", NOW_SQL);
    let updated = format!("updated_at TEXT NOT NULL DEFAULT ({})", NOW_SQL);

    execute(
        conn,
        &format!(
            "CREATE TABLE IF NOT EXISTS projects (
                {id},
                name TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'active',
                {created},
                {updated}
            )"
        ),
    )?;

    // Projects gained an address after the first release
    if !column_exists(conn, "projects", "address") {
        execute(conn, "ALTER TABLE projects ADD COLUMN address TEXT")?;
    }

    execute(
        conn,
        &format!(
            "CREATE TABLE IF NOT EXISTS units (
                {id},
                name TEXT NOT NULL,
                short_name TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                {created},
                {updated}
            )"
        ),
    )?;

    execute(
        conn,
        &format!(
            "CREATE TABLE IF NOT EXISTS additional_works (
                {id},
                materials TEXT NOT NULL,
                quantity_pd REAL NOT NULL DEFAULT 0,
                quantity_recount REAL NOT NULL DEFAULT 0,
                unit_id TEXT,
                status TEXT NOT NULL DEFAULT 'draft'
                    CHECK (status IN ('draft', 'approved', 'rejected')),
                {created},
                {updated}
            )"
        ),
    )?;

    execute(
        conn,
        &format!(
            "CREATE TABLE IF NOT EXISTS project_parameters (
                {id},
                project_id TEXT NOT NULL,
                parameter TEXT NOT NULL,
                value TEXT NOT NULL,
                sort_order INTEGER NOT NULL DEFAULT 0,
                {created}
            )"
        ),
    )?;

    execute(
        conn,
        &format!(
            "CREATE TABLE IF NOT EXISTS additional_works_columns (
                {id},
                project_id TEXT NOT NULL UNIQUE,
                column_1_name TEXT NOT NULL DEFAULT '',
                column_2_name TEXT NOT NULL DEFAULT '',
                column_3_name TEXT NOT NULL DEFAULT '',
                {created},
                {updated}
            )"
        ),
    )?;

    execute(
        conn,
        &format!(
            "CREATE TABLE IF NOT EXISTS additional_works_rows (
                {id},
                project_id TEXT NOT NULL,
                column_1_value TEXT NOT NULL DEFAULT '',
                column_2_value TEXT NOT NULL DEFAULT '',
                column_3_value TEXT NOT NULL DEFAULT '',
                sort_order INTEGER NOT NULL DEFAULT 0,
                {created},
                {updated}
            )"
        ),
    )?;

    // Indexes for per-project lookups
    execute(
        conn,
        "CREATE INDEX IF NOT EXISTS idx_parameters_project ON project_parameters(project_id);
         CREATE INDEX IF NOT EXISTS idx_work_rows_project ON additional_works_rows(project_id);",
    )?;

    Ok(())
}

//! Embedded libSQL store holding the loaded trip data.

use std::path::Path;

use libsql::{Connection, Database as LibSqlDatabase, Value};

use crate::error::StoreError;

/// Cap on rows rendered back to the reasoning service per statement.
const MAX_RESULT_ROWS: usize = 50;

/// Handle to the trip database.
///
/// Opened once per process; connections are created per operation.
pub struct Store {
    db: LibSqlDatabase,
}

impl Store {
    /// Open (or create) a local database file.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Open(format!("failed to create {}: {e}", parent.display())))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;

        Ok(Self { db })
    }

    /// Open an in-memory database (tests).
    pub async fn memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;

        Ok(Self { db })
    }

    /// Create a connection with a busy timeout so concurrent writers wait
    /// instead of failing instantly with "database is locked".
    pub async fn connect(&self) -> Result<Connection, StoreError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| StoreError::Open(e.to_string()))?;
        conn.query("PRAGMA busy_timeout = 5000", ())
            .await
            .map_err(|e| StoreError::Open(format!("failed to set busy_timeout: {e}")))?;
        Ok(conn)
    }

    /// Execute a read-only SQL statement and render the result as text for
    /// the reasoning service.
    pub async fn execute_query(&self, sql: &str) -> Result<String, StoreError> {
        let head = sql.trim_start().to_ascii_uppercase();
        if !head.starts_with("SELECT") && !head.starts_with("WITH") {
            return Err(StoreError::Rejected(
                "only SELECT statements are allowed".to_string(),
            ));
        }

        let conn = self.connect().await?;
        let mut rows = conn
            .query(sql, ())
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let column_count = rows.column_count();
        let header: Vec<String> = (0..column_count)
            .map(|i| rows.column_name(i).unwrap_or("?").to_string())
            .collect();

        let mut lines = vec![header.join(" | ")];
        let mut row_count = 0usize;
        let mut truncated = false;

        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
        {
            if row_count >= MAX_RESULT_ROWS {
                truncated = true;
                break;
            }
            let mut fields = Vec::with_capacity(column_count as usize);
            for i in 0..column_count {
                let value = row
                    .get_value(i)
                    .map_err(|e| StoreError::Query(e.to_string()))?;
                fields.push(render_value(&value));
            }
            lines.push(fields.join(" | "));
            row_count += 1;
        }

        if row_count == 0 {
            lines.push("(no rows)".to_string());
        }
        if truncated {
            lines.push(format!("... (truncated at {MAX_RESULT_ROWS} rows)"));
        }

        Ok(lines.join("\n"))
    }

    /// Textual schema description: the CREATE statements of the user tables
    /// plus their row counts.
    pub async fn table_info(&self) -> Result<String, StoreError> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(
                "SELECT name, sql FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                (),
            )
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut tables = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
        {
            let name: String = row.get(0).map_err(|e| StoreError::Query(e.to_string()))?;
            let create_sql: String = row.get(1).map_err(|e| StoreError::Query(e.to_string()))?;
            tables.push((name, create_sql));
        }

        let mut sections = Vec::with_capacity(tables.len());
        for (name, create_sql) in tables {
            let count = self.row_count(&conn, &name).await?;
            sections.push(format!("{create_sql}\n/* {name}: {count} rows */"));
        }

        if sections.is_empty() {
            return Ok("(no tables loaded)".to_string());
        }
        Ok(sections.join("\n\n"))
    }

    async fn row_count(&self, conn: &Connection, table: &str) -> Result<i64, StoreError> {
        // Table names come from sqlite_master, not user input.
        let mut rows = conn
            .query(&format!("SELECT COUNT(*) FROM \"{table}\""), ())
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        match rows
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
        {
            Some(row) => row.get(0).map_err(|e| StoreError::Query(e.to_string())),
            None => Ok(0),
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store() -> Store {
        let store = Store::memory().await.unwrap();
        let conn = store.connect().await.unwrap();
        conn.execute("CREATE TABLE trips (trip_id INTEGER, passenger_count INTEGER)", ())
            .await
            .unwrap();
        conn.execute("INSERT INTO trips VALUES (1, 4), (2, 8)", ())
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn execute_query_renders_rows() {
        let store = seeded_store().await;
        let out = store
            .execute_query("SELECT COUNT(*) AS total FROM trips")
            .await
            .unwrap();
        assert!(out.contains("total"));
        assert!(out.contains('2'));
    }

    #[tokio::test]
    async fn execute_query_reports_empty_result() {
        let store = seeded_store().await;
        let out = store
            .execute_query("SELECT * FROM trips WHERE trip_id = 99")
            .await
            .unwrap();
        assert!(out.contains("(no rows)"));
    }

    #[tokio::test]
    async fn execute_query_rejects_writes() {
        let store = seeded_store().await;
        let err = store.execute_query("DELETE FROM trips").await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
    }

    #[tokio::test]
    async fn table_info_includes_schema_and_counts() {
        let store = seeded_store().await;
        let info = store.table_info().await.unwrap();
        assert!(info.contains("CREATE TABLE trips"));
        assert!(info.contains("trips: 2 rows"));
    }
}

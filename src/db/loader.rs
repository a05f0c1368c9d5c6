//! One-shot CSV loader.
//!
//! Rebuilds the database file from scratch: deletes any previous file,
//! creates the three tables with column names taken verbatim from each CSV
//! header, inserts every row with types coerced per the fixed positional
//! layout, then builds the join/filter indexes. The whole load runs in one
//! transaction; any malformed row aborts it and rolls everything back.

use std::path::Path;

use libsql::{Connection, Value};

use crate::config::DatabaseConfig;
use crate::db::schema::{self, ColumnType, TableLayout};
use crate::db::store::Store;
use crate::error::{LoaderError, StoreError};

/// Per-table row counts from a completed load.
#[derive(Debug)]
pub struct LoadReport {
    pub tables: Vec<(&'static str, u64)>,
}

/// Run the full load against the configured paths.
pub async fn load(config: &DatabaseConfig) -> Result<LoadReport, LoaderError> {
    // The destination file is replaced wholesale on every run.
    match std::fs::remove_file(&config.path) {
        Ok(()) => tracing::info!("removed previous database at {}", config.path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(LoaderError::Io {
                path: config.path.clone(),
                source: e,
            });
        }
    }

    let store = Store::open(&config.path).await?;
    let conn = store.connect().await?;

    conn.execute("BEGIN", ())
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

    match load_all(&conn, config).await {
        Ok(report) => {
            conn.execute("COMMIT", ())
                .await
                .map_err(|e| StoreError::Query(e.to_string()))?;
            Ok(report)
        }
        Err(e) => {
            let _ = conn.execute("ROLLBACK", ()).await;
            Err(e)
        }
    }
}

async fn load_all(conn: &Connection, config: &DatabaseConfig) -> Result<LoadReport, LoaderError> {
    let inputs = [
        (schema::DEMOGRAPHICS, config.demographics_csv()),
        (schema::RIDERS, config.riders_csv()),
        (schema::TRIPS, config.trips_csv()),
    ];

    let mut tables = Vec::with_capacity(inputs.len());
    for (layout, path) in inputs {
        let rows = load_table(conn, layout, &path).await?;
        tracing::info!(table = layout.table, rows, "table loaded");
        tables.push((layout.table, rows));
    }

    for &(name, table, column) in schema::INDEXES {
        conn.execute(
            &format!("CREATE INDEX IF NOT EXISTS {name} ON {table}(\"{column}\")"),
            (),
        )
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;
    }
    tracing::info!("created {} indexes", schema::INDEXES.len());

    Ok(LoadReport { tables })
}

async fn load_table(
    conn: &Connection,
    layout: TableLayout,
    path: &Path,
) -> Result<u64, LoaderError> {
    let file = std::fs::File::open(path).map_err(|e| LoaderError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    // flexible(true) so short/long rows reach our column-count check instead
    // of surfacing as an opaque csv error.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoaderError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.len() != layout.types.len() {
        return Err(LoaderError::HeaderLayout {
            path: path.to_path_buf(),
            table: layout.table,
            expected: layout.types.len(),
            got: headers.len(),
        });
    }

    let columns: Vec<String> = headers
        .iter()
        .zip(layout.types)
        .map(|(name, ty)| format!("\"{name}\" {}", ty.sql()))
        .collect();
    conn.execute(
        &format!("CREATE TABLE {} ({})", layout.table, columns.join(", ")),
        (),
    )
    .await
    .map_err(|e| StoreError::Query(e.to_string()))?;

    let quoted: Vec<String> = headers.iter().map(|h| format!("\"{h}\"")).collect();
    let placeholders: Vec<String> = (1..=headers.len()).map(|i| format!("?{i}")).collect();
    let insert = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        layout.table,
        quoted.join(", "),
        placeholders.join(", ")
    );

    let mut inserted = 0u64;
    for record in reader.records() {
        let record = record.map_err(|e| LoaderError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

        if record.len() != headers.len() {
            return Err(LoaderError::ColumnCount {
                path: path.to_path_buf(),
                row: record.position().map(|p| p.line()).unwrap_or(inserted + 2),
                expected: headers.len(),
                got: record.len(),
            });
        }

        let values: Vec<Value> = record
            .iter()
            .zip(layout.types)
            .map(|(raw, ty)| coerce(*ty, raw))
            .collect();
        conn.execute(&insert, values)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        inserted += 1;
    }

    Ok(inserted)
}

/// Coerce a CSV field into the column's storage class. Blank fields become
/// NULL; values that do not parse as the numeric type are stored as text,
/// matching SQLite's flexible typing.
fn coerce(ty: ColumnType, raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match ty {
        ColumnType::Integer => trimmed
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(raw.to_string())),
        ColumnType::Real => trimmed
            .parse::<f64>()
            .map(Value::Real)
            .unwrap_or_else(|_| Value::Text(raw.to_string())),
        ColumnType::Text => Value::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_parses_numerics() {
        assert_eq!(coerce(ColumnType::Integer, "42"), Value::Integer(42));
        assert_eq!(coerce(ColumnType::Real, "3.5"), Value::Real(3.5));
        assert_eq!(
            coerce(ColumnType::Text, "downtown"),
            Value::Text("downtown".to_string())
        );
    }

    #[test]
    fn coerce_blank_is_null() {
        assert_eq!(coerce(ColumnType::Integer, ""), Value::Null);
        assert_eq!(coerce(ColumnType::Real, "   "), Value::Null);
    }

    #[test]
    fn coerce_falls_back_to_text() {
        assert_eq!(
            coerce(ColumnType::Integer, "n/a"),
            Value::Text("n/a".to_string())
        );
    }
}

//! Database schema.
//!
//! The layout matches stores written by existing producers, so it is created
//! with the exact statement below and never altered afterwards.

use rusqlite::Connection;

use crate::error::{Error, Result};

/// Name of the single table holding samples.
pub const TABLE: &str = "SensorData";

/// Columns every store must have, in declaration order.
pub const COLUMNS: [&str; 6] = [
    "id",
    "timestamp",
    "bmp280_temperature",
    "bmp280_pressure",
    "htu21d_temperature",
    "htu21d_humidity",
];

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS SensorData (\
     id INTEGER PRIMARY KEY AUTOINCREMENT, \
     timestamp DATETIME DEFAULT CURRENT_TIMESTAMP, \
     bmp280_temperature REAL, \
     bmp280_pressure REAL, \
     htu21d_temperature REAL, \
     htu21d_humidity REAL);";

/// Create the table if it is absent. Producer only.
pub fn initialize(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)
}

/// Check that `SensorData` exists and carries every expected column.
///
/// Returns `Ok(false)` when the table is missing so the caller can attach
/// the store path to the error.
pub fn verify(conn: &Connection) -> Result<bool> {
    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
            [TABLE],
            |row| row.get(0),
        )
        .map_err(Error::Read)?;

    if !exists {
        return Ok(false);
    }

    let present: Vec<String> = conn
        .prepare("SELECT name FROM pragma_table_info('SensorData')")
        .and_then(|mut stmt| {
            stmt.query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()
        })
        .map_err(Error::Read)?;

    for column in COLUMNS {
        if !present.iter().any(|name| name.eq_ignore_ascii_case(column)) {
            return Err(Error::MissingColumn { column });
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"SensorData".to_string()));
        // AUTOINCREMENT keeps its counter here
        assert!(tables.contains(&"sqlite_sequence".to_string()));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn.execute(
            "INSERT INTO SensorData (bmp280_temperature) VALUES (1.0)",
            [],
        )
        .unwrap();

        initialize(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM SensorData", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_timestamp_defaults_to_creation_time() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn.execute(
            "INSERT INTO SensorData (bmp280_temperature) VALUES (1.0)",
            [],
        )
        .unwrap();

        let ts: String = conn
            .query_row("SELECT timestamp FROM SensorData", [], |row| row.get(0))
            .unwrap();
        assert_eq!(ts.len(), "YYYY-MM-DD HH:MM:SS".len());
    }

    #[test]
    fn test_verify() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!verify(&conn).unwrap());

        initialize(&conn).unwrap();
        assert!(verify(&conn).unwrap());
    }

    #[test]
    fn test_verify_reports_missing_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE SensorData (id INTEGER PRIMARY KEY, timestamp DATETIME,
             bmp280_temperature REAL, bmp280_pressure REAL, htu21d_temperature REAL);",
        )
        .unwrap();

        let err = verify(&conn).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingColumn {
                column: "htu21d_humidity"
            }
        ));
    }
}

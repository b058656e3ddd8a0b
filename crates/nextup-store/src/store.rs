use crate::schema::{CHILD_TABLES, ENTITY_TABLES, VERSIONED_SCHEMAS};
use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Handle to the library database. Cloning shares the same connection.
///
/// The sync pipeline is the only writer of library tables; the selection
/// engine only reads them.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .context("Failed to enable WAL journal")?;
        info!("Opened library database at {}", path.display());
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Database connection mutex poisoned"))
    }

    /// Row count of every library and child table, keyed by table name.
    pub fn table_counts(&self) -> Result<BTreeMap<&'static str, i64>> {
        let conn = self.conn()?;
        let mut counts = BTreeMap::new();
        for table in ENTITY_TABLES.iter().chain(CHILD_TABLES.iter()) {
            let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
            counts.insert(*table, count);
        }
        Ok(counts)
    }
}

fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")?;
    let current: usize = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|v| v as usize)?;

    for schema in VERSIONED_SCHEMAS.iter().filter(|s| s.version > current) {
        debug!("Applying schema version {}", schema.version);
        conn.execute_batch(schema.up)
            .with_context(|| format!("Failed to apply schema version {}", schema.version))?;
        conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [schema.version as i64])?;
    }
    Ok(())
}

/// `?1, ?2, ...` for a dynamic `IN (...)` list.
pub(crate) fn placeholders(count: usize, offset: usize) -> String {
    (1..=count)
        .map(|i| format!("?{}", i + offset))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `INSERT ... ON CONFLICT(key) DO UPDATE` over the given columns; the key
/// column must be the first entry.
pub(crate) fn upsert_sql(table: &str, columns: &[&str]) -> String {
    let key = columns[0];
    let updates = columns[1..]
        .iter()
        .map(|c| format!("{c} = excluded.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({cols}) VALUES ({vals}) ON CONFLICT({key}) DO UPDATE SET {updates}",
        cols = columns.join(", "),
        vals = placeholders(columns.len(), 0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_applies_all_schemas() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version as usize, VERSIONED_SCHEMAS.last().unwrap().version);
    }

    #[test]
    fn test_reopen_file_does_not_reapply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.db");
        drop(Store::open(&path).unwrap());
        let store = Store::open(&path).unwrap();
        let conn = store.conn().unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows as usize, VERSIONED_SCHEMAS.len());
    }

    #[test]
    fn test_table_counts_start_empty() {
        let store = Store::open_in_memory().unwrap();
        let counts = store.table_counts().unwrap();
        assert_eq!(counts.len(), ENTITY_TABLES.len() + CHILD_TABLES.len());
        assert!(counts.values().all(|c| *c == 0));
    }

    #[test]
    fn test_upsert_sql_shape() {
        let sql = upsert_sql("shows", &["rating_key", "title"]);
        assert_eq!(
            sql,
            "INSERT INTO shows (rating_key, title) VALUES (?1, ?2) ON CONFLICT(rating_key) DO UPDATE SET title = excluded.title"
        );
    }
}

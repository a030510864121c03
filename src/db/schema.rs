use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn initialize_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS activities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp INTEGER NOT NULL,
            window_title TEXT NOT NULL,
            window_class TEXT NOT NULL,
            project_name TEXT NOT NULL,
            project_type TEXT NOT NULL,
            details TEXT NOT NULL,
            confidence REAL NOT NULL,
            screenshot_path TEXT,
            context_summary TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_activities_timestamp ON activities(timestamp);
        ",
    )
    .context("Failed to create activities table")?;

    Ok(())
}

/// Open (creating if needed) the observer database inside the data directory.
pub fn open_db(data_dir: &Path) -> Result<Connection> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    let db_path = data_dir.join("observer.db");
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    initialize_db(&conn)?;
    Ok(conn)
}

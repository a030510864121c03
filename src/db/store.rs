use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use super::models::ActivityRecord;
use super::{queries, schema};

/// Append-only activity persistence. The pipeline only ever writes new
/// records and reads back a bounded recency window.
pub trait ActivityStore {
    fn save(&self, record: &ActivityRecord) -> Result<i64>;
    fn get_recent(&self, minutes: i64) -> Result<Vec<ActivityRecord>>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        let conn = schema::open_db(data_dir)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize_db(&conn)?;
        Ok(Self { conn })
    }
}

impl ActivityStore for SqliteStore {
    fn save(&self, record: &ActivityRecord) -> Result<i64> {
        queries::insert_activity(&self.conn, record)
    }

    fn get_recent(&self, minutes: i64) -> Result<Vec<ActivityRecord>> {
        queries::get_recent_activities(&self.conn, minutes)
    }
}

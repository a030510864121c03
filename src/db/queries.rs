use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};

use super::models::{ActivityRecord, ProjectType};

/// Context never needs more than this many records, however busy the window.
const RECENT_LIMIT: i64 = 20;

pub fn insert_activity(conn: &Connection, record: &ActivityRecord) -> Result<i64> {
    conn.execute(
        "INSERT INTO activities (timestamp, window_title, window_class, project_name,
                                 project_type, details, confidence, screenshot_path, context_summary)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.timestamp,
            record.window_title,
            record.window_class,
            record.project_name,
            record.project_type.as_str(),
            record.details,
            record.confidence,
            record.screenshot_path,
            record.context_summary,
        ],
    )
    .context("Failed to insert activity")?;
    Ok(conn.last_insert_rowid())
}

/// Activities from the last `minutes`, newest first, capped at 20.
pub fn get_recent_activities(conn: &Connection, minutes: i64) -> Result<Vec<ActivityRecord>> {
    let cutoff = chrono::Utc::now().timestamp_millis() - minutes * 60_000;

    let mut stmt = conn.prepare(
        "SELECT id, timestamp, window_title, window_class, project_name,
                project_type, details, confidence, screenshot_path, context_summary
         FROM activities
         WHERE timestamp > ?1
         ORDER BY timestamp DESC
         LIMIT ?2",
    )?;

    let results = stmt
        .query_map(params![cutoff, RECENT_LIMIT], activity_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to collect recent activities")?;

    Ok(results)
}

fn activity_from_row(row: &Row) -> rusqlite::Result<ActivityRecord> {
    let type_str: String = row.get(5)?;
    let project_type = type_str.parse::<ProjectType>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, e.into())
    })?;

    Ok(ActivityRecord {
        id: Some(row.get(0)?),
        timestamp: row.get(1)?,
        window_title: row.get(2)?,
        window_class: row.get(3)?,
        project_name: row.get(4)?,
        project_type,
        details: row.get(6)?,
        confidence: row.get(7)?,
        screenshot_path: row.get(8)?,
        context_summary: row.get(9)?,
    })
}
